//! Configuration loading and merging for buildconf.
//!
//! This module handles:
//! - JSON/TOML fragment parsing
//! - Deep merging of fragments with provenance tracking
//! - Typed build settings and dotted-path queries over the merged tree

pub mod cascade;
pub mod merge;
pub mod parser;
pub mod query;
pub mod settings;
pub mod types;

pub use cascade::{
	FragmentOrder, fragment_paths, load_merged_config, merge_fragments, resolve_fragment_path,
};
pub use merge::{
	ConfigMerger, DEFAULT_BASE_SOURCE, MergePolicy, MergedConfig, NullSink, OverrideSink,
	OverrideWarning, TracingSink, merge,
};
pub use parser::{load_fragment, parse_fragment_str};
pub use query::{query, render_queries};
pub use settings::{BuildSettings, CppBuildSystem, expand_home};
pub use types::{ConfigTree, ConfigValue, Fragment, Provenance, ProvenanceMap, Scalar};
