//! Buildconf - layered build configuration for C++ projects.
//!
//! This library provides the core functionality for buildconf, including:
//! - Loading JSON/TOML configuration fragments
//! - Deep merging of fragments with per-key provenance and override warnings
//! - Typed build settings and dotted-path queries over the merged config
//! - Version constraint parsing and evaluation for toolchain gating
//! - Persisted fragment selection
//!
//! # Example
//!
//! ```no_run
//! use buildconf_cli::config::{FragmentOrder, MergePolicy, TracingSink, load_merged_config};
//! use buildconf_cli::version::{VersionTuple, satisfies};
//! use std::path::Path;
//!
//! let merged = load_merged_config(
//!     Path::new("scripts"),
//!     &["config-base.json", "config-ci.json"],
//!     FragmentOrder::SortedByName,
//!     MergePolicy::default(),
//!     &mut TracingSink,
//! )
//! .unwrap();
//!
//! if let Some(owner) = merged.provenance.owner_of("expected-versions.cmake") {
//!     println!("cmake constraint set in {owner}");
//! }
//!
//! let cmake: VersionTuple = "3.28.1".parse().unwrap();
//! assert!(satisfies(&cmake, ">=3.25.0,<4.0.0").unwrap());
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod selection;
pub mod version;

pub use error::{BuildconfError, Result};
