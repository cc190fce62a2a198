use std::path::PathBuf;

/// Library-level structured errors for buildconf.
///
/// Use `thiserror` for structured errors that library consumers can match on.
/// The CLI binary wraps these with `anyhow` for rich context chains.
#[derive(Debug, thiserror::Error)]
pub enum BuildconfError {
	#[error("Config fragment not found: {path}")]
	FragmentNotFound { path: PathBuf },

	#[error("Failed to read config fragment: {path}")]
	FragmentReadError {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to parse config fragment: {path}")]
	FragmentParseError {
		path: PathBuf,
		#[source]
		source: serde_json::Error,
	},

	#[error("Failed to parse config fragment: {path}")]
	FragmentTomlError {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},

	#[error("Unsupported config fragment format (expected .json or .toml): {path}")]
	UnsupportedFragmentFormat { path: PathBuf },

	#[error("Config fragment must contain a mapping at its root: {path}")]
	NotAMapping { path: PathBuf },

	#[error("Config \"{key}\" set in \"{source_id}\" does not match the shape of the existing value")]
	StructuralMismatch { key: String, source_id: String },

	#[error("Malformed version constraint: '{constraint}'")]
	MalformedConstraint { constraint: String },

	#[error("Invalid version: '{version}'")]
	InvalidVersion { version: String },

	#[error("Merged config does not describe valid build settings")]
	InvalidSettings {
		#[source]
		source: serde_json::Error,
	},

	#[error(
		"The {name} \"{path}\" must neither contain comma (\",\") nor semicolon (\";\") characters"
	)]
	InvalidCachePath { name: String, path: String },

	#[error("Unknown toolset \"{toolset}\" (expected an msvc, gcc or clang toolset)")]
	UnknownToolset { toolset: String },

	#[error(
		"The vcpkg buildtrees root \"{path}\" is too long; configure an exceptionally short path such as \"c:/b/\""
	)]
	BuildtreesRootTooLong { path: String },

	#[error("No expected version configured for tool: {tool}")]
	MissingExpectedVersion { tool: String },

	#[error("No config fragments found in {dir}")]
	NoFragments { dir: PathBuf },

	#[error("Failed to write file: {path}")]
	WriteError {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to resolve home directory")]
	HomeDirectoryNotFound,
}

/// Result type alias using BuildconfError.
pub type Result<T> = std::result::Result<T, BuildconfError>;
