//! Fragment selection state for buildconf.
//!
//! This module handles:
//! - Discovering the selectable `config-*.json` fragments in a directory
//! - Toggling fragments on and off
//! - Persisting the selection between runs and writing the selected names out

use crate::error::{BuildconfError, Result};
use indexmap::IndexMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// File name of the persisted selection inside the config directory.
pub const STATE_FILE_NAME: &str = ".buildconf_menu.json";

/// Saved selection: fragment name to whether it is selected.
pub type SavedSelection = IndexMap<String, bool>;

/// A selectable fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentChoice {
	pub name: String,
	pub selected: bool,
}

/// The ordered list of selectable fragments and their state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
	choices: Vec<FragmentChoice>,
}

impl Selection {
	/// Build a selection from fragment names and previously saved state.
	///
	/// The first fragment is the base and always starts out selected.
	pub fn new(names: Vec<String>, saved: &SavedSelection) -> Self {
		let choices = names
			.into_iter()
			.enumerate()
			.map(|(index, name)| {
				let selected = index == 0 || saved.get(&name).copied().unwrap_or(false);
				FragmentChoice { name, selected }
			})
			.collect();
		Selection { choices }
	}

	/// Discover fragments in `config_dir` and apply the saved state found there.
	pub fn load(config_dir: &Path) -> Result<Self> {
		let names = discover_fragment_files(config_dir)?;
		let saved = load_saved(&state_path(config_dir));
		Ok(Selection::new(names, &saved))
	}

	pub fn choices(&self) -> &[FragmentChoice] {
		&self.choices
	}

	/// Flip the fragment at a 1-based index. Out-of-range indices are ignored.
	pub fn toggle(&mut self, index: usize) -> bool {
		match index.checked_sub(1).and_then(|i| self.choices.get_mut(i)) {
			Some(choice) => {
				choice.selected = !choice.selected;
				true
			}
			None => false,
		}
	}

	/// Names of the selected fragments, in order.
	pub fn selected(&self) -> Vec<String> {
		self.choices
			.iter()
			.filter(|c| c.selected)
			.map(|c| c.name.clone())
			.collect()
	}

	pub fn to_saved(&self) -> SavedSelection {
		self.choices
			.iter()
			.map(|c| (c.name.clone(), c.selected))
			.collect()
	}

	/// Numbered listing, one fragment per line.
	pub fn render(&self) -> String {
		let mut out = String::new();
		for (index, choice) in self.choices.iter().enumerate() {
			let mark = if choice.selected { "✓" } else { " " };
			let _ = writeln!(out, "{:>3}: [{mark}] {}", index + 1, choice.name);
		}
		out
	}

	/// Write the selected fragment names, one per line.
	pub fn write_results(&self, path: &Path) -> Result<()> {
		let mut content = String::new();
		for name in self.selected() {
			content.push_str(&name);
			content.push('\n');
		}
		std::fs::write(path, content).map_err(|source| BuildconfError::WriteError {
			path: path.to_path_buf(),
			source,
		})
	}

	/// Persist the selection next to the fragments.
	pub fn save(&self, config_dir: &Path) -> Result<()> {
		let path = state_path(config_dir);
		let content = serde_json::to_string_pretty(&self.to_saved())
			.map_err(|source| BuildconfError::WriteError {
				path: path.clone(),
				source: source.into(),
			})?;
		std::fs::write(&path, content).map_err(|source| BuildconfError::WriteError { path, source })
	}
}

/// Path of the persisted selection for a config directory.
pub fn state_path(config_dir: &Path) -> PathBuf {
	config_dir.join(STATE_FILE_NAME)
}

/// List `config-*.json` files in a directory, sorted by name.
pub fn discover_fragment_files(config_dir: &Path) -> Result<Vec<String>> {
	let entries = std::fs::read_dir(config_dir).map_err(|source| BuildconfError::FragmentReadError {
		path: config_dir.to_path_buf(),
		source,
	})?;

	let mut names: Vec<String> = entries
		.filter_map(|entry| entry.ok())
		.filter(|entry| entry.path().is_file())
		.filter_map(|entry| entry.file_name().into_string().ok())
		.filter(|name| name.starts_with("config-") && name.ends_with(".json"))
		.collect();
	names.sort();

	Ok(names)
}

/// Read the saved selection. A missing or unreadable file yields an empty state.
pub fn load_saved(path: &Path) -> SavedSelection {
	let content = match std::fs::read_to_string(path) {
		Ok(content) => content,
		Err(e) => {
			tracing::debug!("No saved selection at {}: {}", path.display(), e);
			return SavedSelection::new();
		}
	};

	match serde_json::from_str(&content) {
		Ok(saved) => saved,
		Err(e) => {
			tracing::debug!("Ignoring unreadable selection {}: {}", path.display(), e);
			SavedSelection::new()
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::fs;

	fn names(list: &[&str]) -> Vec<String> {
		list.iter().map(|s| s.to_string()).collect()
	}

	#[test]
	fn test_first_fragment_is_always_selected() {
		let mut saved = SavedSelection::new();
		saved.insert("config-base.json".to_string(), false);
		saved.insert("config-dev.json".to_string(), true);

		let selection = Selection::new(
			names(&["config-base.json", "config-ci.json", "config-dev.json"]),
			&saved,
		);
		assert_eq!(selection.selected(), vec!["config-base.json", "config-dev.json"]);
	}

	#[test]
	fn test_toggle_is_one_based_and_ignores_out_of_range() {
		let mut selection =
			Selection::new(names(&["config-base.json", "config-dev.json"]), &SavedSelection::new());

		assert!(selection.toggle(2));
		assert_eq!(selection.selected(), vec!["config-base.json", "config-dev.json"]);
		assert!(selection.toggle(1));
		assert_eq!(selection.selected(), vec!["config-dev.json"]);
		assert!(!selection.toggle(0));
		assert!(!selection.toggle(3));
	}

	#[test]
	fn test_render_marks_selected() {
		let selection =
			Selection::new(names(&["config-base.json", "config-dev.json"]), &SavedSelection::new());
		assert_eq!(
			selection.render(),
			"  1: [✓] config-base.json\n  2: [ ] config-dev.json\n"
		);
	}

	#[test]
	fn test_discover_only_config_json_files() {
		let temp_dir = tempfile::tempdir().unwrap();
		for name in ["config-z.json", "config-base.json", "other.json", "config-a.toml"] {
			fs::write(temp_dir.path().join(name), "{}").unwrap();
		}
		fs::create_dir(temp_dir.path().join("config-dir.json")).unwrap();

		let found = discover_fragment_files(temp_dir.path()).unwrap();
		assert_eq!(found, vec!["config-base.json", "config-z.json"]);
	}

	#[test]
	fn test_save_and_load_round_trip() {
		let temp_dir = tempfile::tempdir().unwrap();
		for name in ["config-base.json", "config-dev.json", "config-ci.json"] {
			fs::write(temp_dir.path().join(name), "{}").unwrap();
		}

		let mut selection = Selection::load(temp_dir.path()).unwrap();
		assert_eq!(selection.selected(), vec!["config-base.json"]);
		selection.toggle(3);
		selection.save(temp_dir.path()).unwrap();

		let reloaded = Selection::load(temp_dir.path()).unwrap();
		assert_eq!(reloaded.selected(), vec!["config-base.json", "config-dev.json"]);
	}

	#[test]
	fn test_unreadable_state_is_ignored() {
		let temp_dir = tempfile::tempdir().unwrap();
		let path = state_path(temp_dir.path());
		fs::write(&path, "not json").unwrap();
		assert!(load_saved(&path).is_empty());
		assert!(load_saved(&temp_dir.path().join("missing.json")).is_empty());
	}

	#[test]
	fn test_write_results() {
		let temp_dir = tempfile::tempdir().unwrap();
		let results = temp_dir.path().join("selected.txt");
		let selection = Selection::new(
			names(&["config-base.json", "config-dev.json"]),
			&SavedSelection::new(),
		);
		selection.write_results(&results).unwrap();
		assert_eq!(fs::read_to_string(&results).unwrap(), "config-base.json\n");
	}
}
