use crate::config::types::{ConfigTree, ConfigValue};

/// Look up a value by dotted path, e.g. `expected-versions.cmake`.
///
/// Returns `None` when a segment is missing or the path runs through a leaf.
pub fn query<'a>(tree: &'a ConfigTree, path: &str) -> Option<&'a ConfigValue> {
	let mut segments = path.split('.');
	let first = segments.next()?;
	let mut node = tree.get(first)?;

	for segment in segments {
		match node {
			ConfigValue::Nested(subtree) => node = subtree.get(segment)?,
			ConfigValue::Scalar(_) => return None,
		}
	}

	Some(node)
}

/// Render query results on one line, separated by `|`.
///
/// A path that cannot be resolved renders as `[<path>-unknown]`.
pub fn render_queries<S: AsRef<str>>(tree: &ConfigTree, queries: &[S]) -> String {
	queries
		.iter()
		.map(|q| {
			let q = q.as_ref();
			match query(tree, q) {
				Some(value) => value.to_string(),
				None => format!("[{q}-unknown]"),
			}
		})
		.collect::<Vec<_>>()
		.join("|")
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::types::Scalar;
	use serde_json::{Value, json};

	fn sample() -> ConfigTree {
		match json!({
			"target-system": "windows",
			"vcpkg-debug": true,
			"expected-versions": {"cmake": ">=3.25.0"},
			"definitions": {"OPT": {"LEVEL": 2}}
		}) {
			Value::Object(map) => ConfigTree::from_json_map(map),
			_ => unreachable!(),
		}
	}

	#[test]
	fn test_query_top_level() {
		let tree = sample();
		assert_eq!(
			query(&tree, "target-system"),
			Some(&ConfigValue::Scalar(Scalar::String("windows".to_string())))
		);
	}

	#[test]
	fn test_query_nested() {
		let tree = sample();
		assert_eq!(
			query(&tree, "definitions.OPT.LEVEL"),
			Some(&ConfigValue::Scalar(Scalar::Number(2.into())))
		);
	}

	#[test]
	fn test_query_missing_or_through_leaf() {
		let tree = sample();
		assert!(query(&tree, "nope").is_none());
		assert!(query(&tree, "expected-versions.ninja").is_none());
		assert!(query(&tree, "target-system.more").is_none());
		assert!(query(&tree, "").is_none());
	}

	#[test]
	fn test_render_queries_joins_with_pipe() {
		let tree = sample();
		let line = render_queries(
			&tree,
			&["target-system", "expected-versions.cmake", "missing.key", "vcpkg-debug"],
		);
		assert_eq!(line, "windows|>=3.25.0|[missing.key-unknown]|true");
	}

	#[test]
	fn test_render_subtree_as_json() {
		let tree = sample();
		assert_eq!(render_queries(&tree, &["definitions"]), r#"{"OPT":{"LEVEL":2}}"#);
	}
}
