//! Tool version handling for buildconf.
//!
//! This module handles:
//! - Version tuples and their lexicographic ordering
//! - Parsing version constraint strings such as `>=1.2.3,<2.0.0`
//! - Evaluating a discovered version against a constraint

pub mod constraint;
pub mod tuple;

pub use constraint::{Clause, Comparator, Constraint, satisfies};
pub use tuple::VersionTuple;
