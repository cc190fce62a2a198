use crate::config::types::{ConfigTree, ConfigValue, Fragment, Provenance, ProvenanceMap, Scalar};
use crate::error::{BuildconfError, Result};

/// Identifier of the base fragment used when none is configured.
pub const DEFAULT_BASE_SOURCE: &str = "config-base.json";

/// Per-run merge settings.
#[derive(Debug, Clone)]
pub struct MergePolicy {
	/// Fragment whose values may be overridden without a warning.
	pub base_source: String,
}

impl MergePolicy {
	pub fn new(base_source: impl Into<String>) -> Self {
		MergePolicy {
			base_source: base_source.into(),
		}
	}
}

impl Default for MergePolicy {
	fn default() -> Self {
		MergePolicy::new(DEFAULT_BASE_SOURCE)
	}
}

/// A leaf previously set by a non-base fragment is being overwritten.
#[derive(Debug, Clone, PartialEq)]
pub struct OverrideWarning {
	/// Full key path, outermost first.
	pub path: Vec<String>,
	pub previous_value: Scalar,
	pub previous_source: String,
	pub new_value: Scalar,
	pub new_source: String,
}

impl OverrideWarning {
	/// The leaf key being overwritten.
	pub fn key(&self) -> &str {
		self.path.last().map(String::as_str).unwrap_or_default()
	}

	pub fn message(&self) -> String {
		format!(
			"Config \"{key}\"=\"{old}\" previously set in \"{old_src}\" will be overwritten with \"{key}\"=\"{new}\" set in \"{new_src}\"!",
			key = self.key(),
			old = self.previous_value,
			old_src = self.previous_source,
			new = self.new_value,
			new_src = self.new_source,
		)
	}
}

/// Receives override warnings produced while merging.
pub trait OverrideSink {
	fn record(&mut self, warning: OverrideWarning);
}

/// Emits each override as a `warn!` event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl OverrideSink for TracingSink {
	fn record(&mut self, warning: OverrideWarning) {
		tracing::warn!(
			key = warning.key(),
			path = %warning.path.join("."),
			previous_value = %warning.previous_value,
			previous_source = %warning.previous_source,
			new_value = %warning.new_value,
			new_source = %warning.new_source,
			"{}",
			warning.message()
		);
	}
}

/// Collects warnings in memory.
impl OverrideSink for Vec<OverrideWarning> {
	fn record(&mut self, warning: OverrideWarning) {
		self.push(warning);
	}
}

/// Drops warnings. Used where the caller only needs the merged values.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl OverrideSink for NullSink {
	fn record(&mut self, _warning: OverrideWarning) {}
}

/// Deep-merge `incoming` into `current`, recording `source_id` as the owner
/// of every leaf it sets.
///
/// Nested mappings merge key by key; leaves are always overwritten. When the
/// recorded owner of an overwritten leaf is anything other than the policy's
/// base source, an [`OverrideWarning`] is sent to `sink`.
///
/// Fails with [`BuildconfError::StructuralMismatch`] when a mapping meets a
/// leaf at the same key. On failure `current`, `provenance` and `sink` are
/// left untouched.
pub fn merge(
	current: &mut ConfigTree,
	incoming: ConfigTree,
	provenance: &mut ProvenanceMap,
	source_id: &str,
	policy: &MergePolicy,
	sink: &mut dyn OverrideSink,
) -> Result<()> {
	let mut staged_tree = current.clone();
	let mut staged_provenance = provenance.clone();
	let mut staged_warnings: Vec<OverrideWarning> = Vec::new();
	let mut path = Vec::new();
	merge_level(
		&mut staged_tree,
		incoming,
		&mut staged_provenance,
		&mut path,
		source_id,
		policy,
		&mut staged_warnings,
	)?;

	*current = staged_tree;
	*provenance = staged_provenance;
	for warning in staged_warnings {
		sink.record(warning);
	}
	Ok(())
}

fn merge_level(
	current: &mut ConfigTree,
	incoming: ConfigTree,
	provenance: &mut ProvenanceMap,
	path: &mut Vec<String>,
	source_id: &str,
	policy: &MergePolicy,
	sink: &mut dyn OverrideSink,
) -> Result<()> {
	for (key, value) in incoming {
		path.push(key.clone());
		match value {
			ConfigValue::Nested(subtree) => {
				if current.get(&key).is_none() {
					current.insert(key.clone(), ConfigTree::new());
				}
				let Some(ConfigValue::Nested(existing)) = current.get_mut(&key) else {
					return Err(mismatch(path, source_id));
				};
				let Provenance::Nested(owners) = provenance.entry_or_nested(key) else {
					return Err(mismatch(path, source_id));
				};
				merge_level(existing, subtree, owners, path, source_id, policy, sink)?;
			}
			ConfigValue::Scalar(new_value) => {
				let previous_value = match current.get(&key) {
					Some(ConfigValue::Nested(_)) => return Err(mismatch(path, source_id)),
					Some(ConfigValue::Scalar(scalar)) => scalar.clone(),
					None => Scalar::Null,
				};
				match provenance.get(&key) {
					Some(Provenance::Owner(owner)) if *owner != policy.base_source => {
						sink.record(OverrideWarning {
							path: path.clone(),
							previous_value,
							previous_source: owner.clone(),
							new_value: new_value.clone(),
							new_source: source_id.to_string(),
						});
					}
					Some(Provenance::Nested(_)) => return Err(mismatch(path, source_id)),
					_ => {}
				}
				provenance.set_owner(key.clone(), source_id);
				current.insert(key, new_value);
			}
		}
		path.pop();
	}
	Ok(())
}

fn mismatch(path: &[String], source_id: &str) -> BuildconfError {
	BuildconfError::StructuralMismatch {
		key: path.join("."),
		source_id: source_id.to_string(),
	}
}

/// Folds fragments left to right into one configuration tree.
///
/// Holds the state of a single run: the tree built so far, its provenance,
/// and the identifiers of the fragments applied, in order.
#[derive(Debug, Clone, Default)]
pub struct ConfigMerger {
	policy: MergePolicy,
	tree: ConfigTree,
	provenance: ProvenanceMap,
	applied: Vec<String>,
}

impl ConfigMerger {
	pub fn new(policy: MergePolicy) -> Self {
		ConfigMerger {
			policy,
			..Default::default()
		}
	}

	/// Merge one fragment on top of everything applied so far.
	pub fn apply(&mut self, fragment: Fragment, sink: &mut dyn OverrideSink) -> Result<()> {
		merge(
			&mut self.tree,
			fragment.tree,
			&mut self.provenance,
			&fragment.id,
			&self.policy,
			sink,
		)?;
		self.applied.push(fragment.id);
		Ok(())
	}

	pub fn tree(&self) -> &ConfigTree {
		&self.tree
	}

	pub fn provenance(&self) -> &ProvenanceMap {
		&self.provenance
	}

	pub fn applied(&self) -> &[String] {
		&self.applied
	}

	pub fn finish(self) -> MergedConfig {
		MergedConfig {
			tree: self.tree,
			provenance: self.provenance,
			fragments: self.applied,
		}
	}
}

/// Result of folding a fragment sequence.
#[derive(Debug, Clone, Default)]
pub struct MergedConfig {
	/// The effective configuration.
	pub tree: ConfigTree,

	/// Owning fragment of every leaf in `tree`.
	pub provenance: ProvenanceMap,

	/// Fragment identifiers in the order they were applied.
	pub fragments: Vec<String>,
}
