use crate::config::types::{ConfigTree, Fragment};
use crate::error::{BuildconfError, Result};
use serde_json::Value;
use std::path::Path;

/// Load a fragment from the given path.
///
/// The fragment identifier is the file name, which is what provenance
/// records and what the base source is compared against.
pub fn load_fragment(path: &Path) -> Result<Fragment> {
	if !path.exists() {
		return Err(BuildconfError::FragmentNotFound {
			path: path.to_path_buf(),
		});
	}

	tracing::info!("Loading config \"{}\"", path.display());

	let content = std::fs::read_to_string(path).map_err(|source| BuildconfError::FragmentReadError {
		path: path.to_path_buf(),
		source,
	})?;

	let tree = parse_fragment_str(&content, path)?;
	let id = path
		.file_name()
		.map(|name| name.to_string_lossy().into_owned())
		.unwrap_or_else(|| path.display().to_string());

	Ok(Fragment::new(id, tree))
}

/// Parse a fragment from a string (useful for testing).
///
/// The format is chosen by the extension of `path`.
pub fn parse_fragment_str(content: &str, path: &Path) -> Result<ConfigTree> {
	let extension = path
		.extension()
		.and_then(|ext| ext.to_str())
		.map(str::to_ascii_lowercase);

	let document: Value = match extension.as_deref() {
		Some("json") => {
			serde_json::from_str(content).map_err(|source| BuildconfError::FragmentParseError {
				path: path.to_path_buf(),
				source,
			})?
		}
		Some("toml") => toml::from_str(content).map_err(|source| BuildconfError::FragmentTomlError {
			path: path.to_path_buf(),
			source,
		})?,
		_ => {
			return Err(BuildconfError::UnsupportedFragmentFormat {
				path: path.to_path_buf(),
			});
		}
	};

	match document {
		Value::Object(map) => Ok(ConfigTree::from_json_map(map)),
		_ => Err(BuildconfError::NotAMapping {
			path: path.to_path_buf(),
		}),
	}
}
