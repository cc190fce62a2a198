use indexmap::IndexMap;
use serde_json::{Map, Number, Value};
use std::fmt;

/// A leaf value in the configuration tree.
///
/// `Null` and `List` are carried as opaque leaves: they are never merged
/// element-wise, a later fragment replaces them whole.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
	Null,
	Bool(bool),
	Number(Number),
	String(String),
	List(Vec<Value>),
}

impl Scalar {
	/// Convert back into a JSON value.
	pub fn to_json(&self) -> Value {
		match self {
			Scalar::Null => Value::Null,
			Scalar::Bool(b) => Value::Bool(*b),
			Scalar::Number(n) => Value::Number(n.clone()),
			Scalar::String(s) => Value::String(s.clone()),
			Scalar::List(items) => Value::Array(items.clone()),
		}
	}
}

/// Strings display raw, everything else as compact JSON.
impl fmt::Display for Scalar {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Scalar::String(s) => f.write_str(s),
			other => write!(f, "{}", other.to_json()),
		}
	}
}

/// A configuration value: either a leaf or a nested mapping.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
	Scalar(Scalar),
	Nested(ConfigTree),
}

impl ConfigValue {
	/// Convert a parsed JSON value, mapping objects to nested trees.
	pub fn from_json(value: Value) -> Self {
		match value {
			Value::Object(map) => ConfigValue::Nested(ConfigTree::from_json_map(map)),
			Value::Null => ConfigValue::Scalar(Scalar::Null),
			Value::Bool(b) => ConfigValue::Scalar(Scalar::Bool(b)),
			Value::Number(n) => ConfigValue::Scalar(Scalar::Number(n)),
			Value::String(s) => ConfigValue::Scalar(Scalar::String(s)),
			Value::Array(items) => ConfigValue::Scalar(Scalar::List(items)),
		}
	}

	pub fn to_json(&self) -> Value {
		match self {
			ConfigValue::Scalar(scalar) => scalar.to_json(),
			ConfigValue::Nested(tree) => tree.to_json(),
		}
	}
}

impl fmt::Display for ConfigValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ConfigValue::Scalar(scalar) => fmt::Display::fmt(scalar, f),
			ConfigValue::Nested(tree) => write!(f, "{}", tree.to_json()),
		}
	}
}

impl From<Scalar> for ConfigValue {
	fn from(scalar: Scalar) -> Self {
		ConfigValue::Scalar(scalar)
	}
}

impl From<ConfigTree> for ConfigValue {
	fn from(tree: ConfigTree) -> Self {
		ConfigValue::Nested(tree)
	}
}

/// A mapping from keys to configuration values.
///
/// Insertion order is kept so the merged configuration displays in the
/// order its keys were first introduced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigTree {
	entries: IndexMap<String, ConfigValue>,
}

impl ConfigTree {
	pub fn new() -> Self {
		Self::default()
	}

	/// Build a tree from a JSON object.
	pub fn from_json_map(map: Map<String, Value>) -> Self {
		let entries = map
			.into_iter()
			.map(|(key, value)| (key, ConfigValue::from_json(value)))
			.collect();
		ConfigTree { entries }
	}

	pub fn to_json(&self) -> Value {
		let map: Map<String, Value> = self
			.entries
			.iter()
			.map(|(key, value)| (key.clone(), value.to_json()))
			.collect();
		Value::Object(map)
	}

	pub fn get(&self, key: &str) -> Option<&ConfigValue> {
		self.entries.get(key)
	}

	pub fn get_mut(&mut self, key: &str) -> Option<&mut ConfigValue> {
		self.entries.get_mut(key)
	}

	pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ConfigValue>) {
		self.entries.insert(key.into(), value.into());
	}

	pub fn contains_key(&self, key: &str) -> bool {
		self.entries.contains_key(key)
	}

	pub fn iter(&self) -> impl Iterator<Item = (&String, &ConfigValue)> {
		self.entries.iter()
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Visit every leaf with its key path, depth first in display order.
	pub fn leaves(&self) -> Vec<(Vec<&str>, &Scalar)> {
		let mut out = Vec::new();
		collect_leaves(self, &mut Vec::new(), &mut out);
		out
	}
}

fn collect_leaves<'a>(
	tree: &'a ConfigTree,
	path: &mut Vec<&'a str>,
	out: &mut Vec<(Vec<&'a str>, &'a Scalar)>,
) {
	for (key, value) in &tree.entries {
		path.push(key);
		match value {
			ConfigValue::Scalar(scalar) => out.push((path.clone(), scalar)),
			ConfigValue::Nested(subtree) => collect_leaves(subtree, path, out),
		}
		path.pop();
	}
}

impl IntoIterator for ConfigTree {
	type Item = (String, ConfigValue);
	type IntoIter = indexmap::map::IntoIter<String, ConfigValue>;

	fn into_iter(self) -> Self::IntoIter {
		self.entries.into_iter()
	}
}

/// Which fragment last set a key, mirroring the shape of the config tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Provenance {
	Owner(String),
	Nested(ProvenanceMap),
}

/// Per-key provenance for one level of the config tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProvenanceMap {
	entries: IndexMap<String, Provenance>,
}

impl ProvenanceMap {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn get(&self, key: &str) -> Option<&Provenance> {
		self.entries.get(key)
	}

	pub(crate) fn entry_or_nested(&mut self, key: String) -> &mut Provenance {
		self.entries
			.entry(key)
			.or_insert_with(|| Provenance::Nested(ProvenanceMap::new()))
	}

	pub(crate) fn set_owner(&mut self, key: String, source_id: &str) {
		self.entries
			.insert(key, Provenance::Owner(source_id.to_string()));
	}

	/// Look up the owning fragment of the leaf at a dotted path.
	pub fn owner_of(&self, path: &str) -> Option<&str> {
		let mut level = self;
		let mut segments = path.split('.').peekable();
		while let Some(segment) = segments.next() {
			match (level.entries.get(segment)?, segments.peek()) {
				(Provenance::Owner(owner), None) => return Some(owner),
				(Provenance::Nested(nested), Some(_)) => level = nested,
				_ => return None,
			}
		}
		None
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

/// A named unit of configuration, applied in caller-determined order.
#[derive(Debug, Clone)]
pub struct Fragment {
	/// Identifier recorded in provenance (the fragment's file name).
	pub id: String,

	/// The parsed fragment contents.
	pub tree: ConfigTree,
}

impl Fragment {
	pub fn new(id: impl Into<String>, tree: ConfigTree) -> Self {
		Fragment {
			id: id.into(),
			tree,
		}
	}
}
