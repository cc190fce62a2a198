use crate::config::types::ConfigTree;
use crate::error::{BuildconfError, Result};
use crate::version::{Constraint, VersionTuple, satisfies};
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::PathBuf;

/// Longest buildtrees root accepted for Windows targets.
pub const MAX_WINDOWS_BUILDTREES_ROOT_LEN: usize = 5;

/// Generator used to drive the C++ build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CppBuildSystem {
	Ninja,
	Msbuild,
}

impl CppBuildSystem {
	pub fn as_str(&self) -> &'static str {
		match self {
			CppBuildSystem::Ninja => "ninja",
			CppBuildSystem::Msbuild => "msbuild",
		}
	}
}

/// Typed view of the merged configuration.
///
/// Keys not listed here are allowed and ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BuildSettings {
	/// Target CPU architecture, e.g. `x86_64`.
	pub target_architecture: String,

	/// Sub-architecture suffix (ARM `v7a` and the like); empty for most targets.
	#[serde(default)]
	pub target_sub_architecture: String,

	/// Target operating system, e.g. `linux` or `windows`.
	pub target_system: String,

	pub vendor: String,

	#[serde(default)]
	pub msvs_installer: Option<String>,

	pub cpp_build_system: CppBuildSystem,

	/// Toolset name; its prefix (`msvc`, `gcc`, `clang`) selects the default compilers.
	pub cpp_toolset: String,

	#[serde(default)]
	pub cpp_toolset_version: Option<String>,

	/// C++ runtime, e.g. `vc143` or `libstdc++`.
	pub cpp_runtime: String,

	/// Environment overrides, notably `CC` and `CXX`.
	#[serde(default)]
	pub environment: IndexMap<String, String>,

	pub vcpkg_path: String,

	pub vcpkg_buildtrees_root: String,

	pub vcpkg_assets_cache_path: String,

	#[serde(default)]
	pub vcpkg_assets_cache_readonly: bool,

	/// May contain `${target-architecture}` style placeholders.
	pub vcpkg_binary_cache_path: String,

	#[serde(default)]
	pub vcpkg_binary_cache_readonly: bool,

	#[serde(default)]
	pub vcpkg_debug: bool,

	#[serde(default)]
	pub vcpkg_overlay_ports: Option<String>,

	#[serde(default)]
	pub vcpkg_overlay_triplets: Option<String>,

	/// Extra CMake definitions, passed through verbatim.
	#[serde(default)]
	pub definitions: IndexMap<String, serde_json::Value>,

	/// Tool name to version constraint, e.g. `cmake` to `>=3.25.0,<4.0.0`.
	#[serde(default)]
	pub expected_versions: IndexMap<String, String>,

	#[serde(default)]
	pub build_path_suffix: String,

	#[serde(default)]
	pub build_log_path: Option<String>,
}

impl BuildSettings {
	/// Extract settings from a merged configuration tree.
	pub fn from_tree(tree: &ConfigTree) -> Result<Self> {
		serde_json::from_value(tree.to_json())
			.map_err(|source| BuildconfError::InvalidSettings { source })
	}

	/// Validate settings that deserialization alone cannot check.
	///
	/// Cache paths are checked after placeholder substitution and `~`
	/// expansion.
	pub fn validate(&self) -> Result<()> {
		for (name, path) in [
			("vcpkg assets cache path", self.assets_cache_path()?),
			("vcpkg binary cache path", self.binary_cache_path()?),
		] {
			let path = path.to_string_lossy();
			if path.contains([',', ';']) {
				return Err(BuildconfError::InvalidCachePath {
					name: name.to_string(),
					path: path.into_owned(),
				});
			}
		}

		if self.target_system == "windows" {
			let root = expand_home(&self.vcpkg_buildtrees_root)?;
			let root = root.to_string_lossy();
			if root.trim_end_matches('/').len() > MAX_WINDOWS_BUILDTREES_ROOT_LEN {
				return Err(BuildconfError::BuildtreesRootTooLong {
					path: root.into_owned(),
				});
			}
		}

		self.c_compiler()?;
		self.cxx_compiler()?;

		for constraint in self.expected_versions.values() {
			Constraint::parse_unchecked(constraint)?;
		}

		Ok(())
	}

	/// C compiler: `environment.CC`, or the toolset's default.
	pub fn c_compiler(&self) -> Result<String> {
		if let Some(cc) = self.environment.get("CC") {
			return Ok(cc.clone());
		}
		self.toolset_compilers().map(|(cc, _)| cc.to_string())
	}

	/// C++ compiler: `environment.CXX`, or the toolset's default.
	pub fn cxx_compiler(&self) -> Result<String> {
		if let Some(cxx) = self.environment.get("CXX") {
			return Ok(cxx.clone());
		}
		self.toolset_compilers().map(|(_, cxx)| cxx.to_string())
	}

	fn toolset_compilers(&self) -> Result<(&'static str, &'static str)> {
		let toolset = self.cpp_toolset.as_str();
		if toolset.starts_with("msvc") {
			Ok(("cl", "cl"))
		} else if toolset.starts_with("gcc") {
			Ok(("gcc", "g++"))
		} else if toolset.starts_with("clang") {
			Ok(("clang", "clang++"))
		} else {
			Err(BuildconfError::UnknownToolset {
				toolset: self.cpp_toolset.clone(),
			})
		}
	}

	/// Short architecture name used in vcpkg triplets.
	pub fn target_architecture_short(&self) -> &str {
		match self.target_architecture.as_str() {
			"x86_64" => "x64",
			other => other,
		}
	}

	/// Build triple used in build directory and toolchain file names.
	pub fn triple(&self) -> String {
		format!(
			"{}{}-{}-{}",
			self.target_architecture, self.target_sub_architecture, self.target_system, self.cpp_runtime
		)
	}

	/// vcpkg host/target triplet.
	pub fn vcpkg_triplet(&self) -> String {
		format!(
			"{}-{}-{}-{}",
			self.target_architecture_short(),
			self.target_system,
			self.vendor,
			self.cpp_runtime
		)
	}

	pub fn assets_cache_path(&self) -> Result<PathBuf> {
		expand_home(&self.vcpkg_assets_cache_path)
	}

	/// Binary cache path with target placeholders substituted.
	pub fn binary_cache_path(&self) -> Result<PathBuf> {
		let substituted = self
			.vcpkg_binary_cache_path
			.replace("${target-architecture}", &self.target_architecture)
			.replace("${target-sub-architecture}", &self.target_sub_architecture)
			.replace("${target-system}", &self.target_system)
			.replace("${vendor}", &self.vendor)
			.replace("${cpp-runtime}", &self.cpp_runtime);
		expand_home(&substituted)
	}

	/// Value for vcpkg's `X_VCPKG_ASSET_SOURCES`.
	pub fn asset_sources(&self) -> Result<String> {
		let mode = if self.vcpkg_assets_cache_readonly {
			"read;x-block-origin"
		} else {
			"readwrite"
		};
		Ok(format!(
			"clear;x-azurl,file:///{},,{mode}",
			self.assets_cache_path()?.display()
		))
	}

	/// Value for vcpkg's `VCPKG_BINARY_SOURCES`.
	pub fn binary_sources(&self) -> Result<String> {
		let mode = if self.vcpkg_binary_cache_readonly {
			"read"
		} else {
			"readwrite"
		};
		Ok(format!(
			"clear;files,{},{mode}",
			self.binary_cache_path()?.display()
		))
	}

	/// Check a discovered tool version against `expected-versions`.
	pub fn check_tool_version(&self, tool: &str, version: &VersionTuple) -> Result<bool> {
		let constraint =
			self.expected_versions
				.get(tool)
				.ok_or_else(|| BuildconfError::MissingExpectedVersion {
					tool: tool.to_string(),
				})?;
		satisfies(version, constraint)
	}
}

/// Normalise separators to `/` and expand a leading `~`.
pub fn expand_home(path: &str) -> Result<PathBuf> {
	let normalized = path.replace('\\', "/");

	if normalized == "~" {
		return dirs::home_dir().ok_or(BuildconfError::HomeDirectoryNotFound);
	}
	if let Some(rest) = normalized.strip_prefix("~/") {
		let home = dirs::home_dir().ok_or(BuildconfError::HomeDirectoryNotFound)?;
		return Ok(home.join(rest));
	}

	Ok(PathBuf::from(normalized))
}
