use crate::config::merge::{ConfigMerger, MergePolicy, MergedConfig, OverrideSink};
use crate::config::parser::load_fragment;
use crate::error::{BuildconfError, Result};
use std::path::{Path, PathBuf};

/// Order in which fragments are folded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentOrder {
	/// Sorted by file name, so the result does not depend on argument order.
	SortedByName,
	/// Exactly as given.
	AsGiven,
}

/// Resolve a fragment name against the config directory.
///
/// Absolute paths are returned unchanged.
pub fn resolve_fragment_path(config_dir: &Path, name: &str) -> PathBuf {
	let path = Path::new(name);
	if path.is_absolute() {
		path.to_path_buf()
	} else {
		config_dir.join(path)
	}
}

/// Resolve and order fragment names into the paths to load.
pub fn fragment_paths<S: AsRef<str>>(
	config_dir: &Path,
	names: &[S],
	order: FragmentOrder,
) -> Vec<PathBuf> {
	let mut paths: Vec<PathBuf> = names
		.iter()
		.map(|name| resolve_fragment_path(config_dir, name.as_ref()))
		.collect();

	if order == FragmentOrder::SortedByName {
		paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()).then_with(|| a.cmp(b)));
	}

	paths
}

/// Load every fragment and fold it into one configuration.
///
/// Fragments are loaded and merged one at a time, in the order of `paths`.
pub fn merge_fragments(
	paths: &[PathBuf],
	policy: MergePolicy,
	sink: &mut dyn OverrideSink,
) -> Result<MergedConfig> {
	let mut merger = ConfigMerger::new(policy);
	for path in paths {
		let fragment = load_fragment(path)?;
		merger.apply(fragment, sink)?;
	}
	Ok(merger.finish())
}

/// Convenience function to resolve, load, and merge fragments from a config directory.
pub fn load_merged_config<S: AsRef<str>>(
	config_dir: &Path,
	names: &[S],
	order: FragmentOrder,
	policy: MergePolicy,
	sink: &mut dyn OverrideSink,
) -> Result<MergedConfig> {
	if names.is_empty() {
		return Err(BuildconfError::NoFragments {
			dir: config_dir.to_path_buf(),
		});
	}

	let paths = fragment_paths(config_dir, names, order);
	merge_fragments(&paths, policy, sink)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::merge::{NullSink, OverrideWarning};
	use serde_json::json;
	use std::fs;

	fn write(dir: &Path, name: &str, content: &str) {
		fs::write(dir.join(name), content).unwrap();
	}

	#[test]
	fn test_resolve_relative_and_absolute() {
		let dir = Path::new("/repo/scripts");
		assert_eq!(
			resolve_fragment_path(dir, "config-base.json"),
			PathBuf::from("/repo/scripts/config-base.json")
		);
		#[cfg(unix)]
		assert_eq!(
			resolve_fragment_path(dir, "/etc/config-ci.json"),
			PathBuf::from("/etc/config-ci.json")
		);
	}

	#[test]
	fn test_sorted_order_uses_file_names() {
		let dir = Path::new("scripts");
		let paths = fragment_paths(
			dir,
			&["config-z.json", "config-base.json", "config-m.json"],
			FragmentOrder::SortedByName,
		);
		let names: Vec<_> = paths
			.iter()
			.map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
			.collect();
		assert_eq!(names, vec!["config-base.json", "config-m.json", "config-z.json"]);
	}

	#[test]
	fn test_as_given_order_is_kept() {
		let dir = Path::new("scripts");
		let paths = fragment_paths(dir, &["b.json", "a.json"], FragmentOrder::AsGiven);
		assert_eq!(paths, vec![dir.join("b.json"), dir.join("a.json")]);
	}

	#[test]
	fn test_load_merged_config_from_directory() {
		let temp_dir = tempfile::tempdir().unwrap();
		write(
			temp_dir.path(),
			"config-base.json",
			r#"{"vendor": "base", "definitions": {"A": "1"}}"#,
		);
		write(temp_dir.path(), "config-dev.json", r#"{"vendor": "dev"}"#);
		write(temp_dir.path(), "config-x.json", r#"{"vendor": "x", "definitions": {"B": "2"}}"#);

		let mut warnings: Vec<OverrideWarning> = Vec::new();
		let merged = load_merged_config(
			temp_dir.path(),
			&["config-x.json", "config-dev.json", "config-base.json"],
			FragmentOrder::SortedByName,
			MergePolicy::default(),
			&mut warnings,
		)
		.unwrap();

		assert_eq!(
			merged.tree.to_json(),
			json!({"vendor": "x", "definitions": {"A": "1", "B": "2"}})
		);
		assert_eq!(
			merged.fragments,
			vec!["config-base.json", "config-dev.json", "config-x.json"]
		);
		assert_eq!(merged.provenance.owner_of("vendor"), Some("config-x.json"));

		// base -> dev is silent, dev -> x warns
		assert_eq!(warnings.len(), 1);
		assert_eq!(warnings[0].previous_source, "config-dev.json");
	}

	#[test]
	fn test_no_fragments_is_an_error() {
		let names: [&str; 0] = [];
		let result = load_merged_config(
			Path::new("scripts"),
			&names,
			FragmentOrder::SortedByName,
			MergePolicy::default(),
			&mut NullSink,
		);
		assert!(matches!(result, Err(BuildconfError::NoFragments { .. })));
	}

	#[test]
	fn test_missing_fragment_aborts() {
		let temp_dir = tempfile::tempdir().unwrap();
		write(temp_dir.path(), "config-base.json", "{}");
		let result = load_merged_config(
			temp_dir.path(),
			&["config-base.json", "config-missing.json"],
			FragmentOrder::SortedByName,
			MergePolicy::default(),
			&mut NullSink,
		);
		assert!(matches!(result, Err(BuildconfError::FragmentNotFound { .. })));
	}
}
