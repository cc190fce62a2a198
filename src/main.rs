use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use buildconf_cli::config::{
	BuildSettings, DEFAULT_BASE_SOURCE, FragmentOrder, MergePolicy, MergedConfig, NullSink,
	TracingSink, load_merged_config, render_queries,
};
use buildconf_cli::logging::init_logging;
use buildconf_cli::selection::Selection;
use buildconf_cli::version::{VersionTuple, satisfies};

#[derive(Parser)]
#[command(name = "buildconf")]
#[command(
	author,
	version,
	about = "Layered build configuration merging, querying and toolchain version gating"
)]
#[command(arg_required_else_help = true)]
struct Cli {
	#[command(subcommand)]
	command: Commands,

	/// Directory that fragment names are resolved against
	#[arg(long, global = true, value_name = "DIR", default_value = "scripts")]
	config_dir: PathBuf,

	/// Fragment whose values may be overridden without a warning
	#[arg(long, global = true, value_name = "NAME", default_value = DEFAULT_BASE_SOURCE)]
	base: String,

	/// Increase log verbosity (-v info, -vv debug)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
	/// Display the merged effective configuration
	Show {
		/// Fragments to merge (defaults to the current selection)
		fragments: Vec<String>,

		/// List every setting with the fragment that set it
		#[arg(long)]
		provenance: bool,

		/// Also write the effective configuration to this file
		#[arg(long, value_name = "FILE")]
		write: Option<PathBuf>,
	},
	/// Merge fragments and check that they describe valid build settings
	Validate {
		/// Fragments to merge (defaults to the current selection)
		fragments: Vec<String>,
	},
	/// Check discovered tool versions against expected-versions
	CheckVersions {
		/// Fragments to merge (defaults to the current selection)
		fragments: Vec<String>,

		/// Discovered tool version, e.g. cmake=3.28.1
		#[arg(long = "tool", value_name = "NAME=VERSION", required = true, value_parser = parse_tool_version)]
		tools: Vec<(String, VersionTuple)>,
	},
	/// Check a single version against a constraint such as ">=1.2.0,<2.0.0"
	///
	/// Exits 0 when satisfied, 1 when not and 2 when the input is malformed.
	Satisfies {
		version: String,
		constraint: String,
	},
	/// Print dotted-path values from the merged configuration, separated by '|'
	Query {
		/// Dotted path to look up, e.g. expected-versions.cmake
		#[arg(short, long = "query", value_name = "PATH", required = true)]
		queries: Vec<String>,

		/// Fragments to merge, in the order given
		#[arg(required = true)]
		fragments: Vec<String>,
	},
	/// Manage which fragments are selected
	Select {
		#[command(subcommand)]
		action: SelectAction,
	},
}

#[derive(Subcommand)]
enum SelectAction {
	/// List selectable fragments
	List,
	/// Toggle fragments by their 1-based number
	Toggle {
		#[arg(required = true)]
		indices: Vec<usize>,
	},
	/// Write the selected fragment names to a file, one per line
	Write { results: PathBuf },
}

/// Exit code of `satisfies` for a malformed version or constraint.
const SATISFIES_INPUT_ERROR: u8 = 2;

fn parse_tool_version(s: &str) -> std::result::Result<(String, VersionTuple), String> {
	let (name, version) = s
		.split_once('=')
		.ok_or_else(|| format!("expected NAME=VERSION, got '{s}'"))?;
	if name.is_empty() {
		return Err(format!("missing tool name in '{s}'"));
	}
	let version = version.parse::<VersionTuple>().map_err(|e| e.to_string())?;
	Ok((name.to_string(), version))
}

fn main() -> ExitCode {
	match run() {
		Ok(code) => code,
		Err(e) => {
			eprintln!("error: {e:?}");
			ExitCode::FAILURE
		}
	}
}

fn run() -> Result<ExitCode> {
	let cli = Cli::parse();
	init_logging(cli.verbose);

	let policy = MergePolicy::new(cli.base.clone());

	match cli.command {
		Commands::Show {
			fragments,
			provenance,
			write,
		} => handle_show(&cli.config_dir, fragments, policy, provenance, write.as_deref()),
		Commands::Validate { fragments } => handle_validate(&cli.config_dir, fragments, policy),
		Commands::CheckVersions { fragments, tools } => {
			handle_check_versions(&cli.config_dir, fragments, policy, &tools)
		}
		Commands::Satisfies {
			version,
			constraint,
		} => handle_satisfies(&version, &constraint),
		Commands::Query { queries, fragments } => {
			handle_query(&cli.config_dir, &fragments, policy, &queries)
		}
		Commands::Select { action } => handle_select(&cli.config_dir, action),
	}
}

/// Merge the given fragments, or the current selection when none are given.
fn merge_build_config(
	config_dir: &Path,
	fragments: Vec<String>,
	policy: MergePolicy,
) -> Result<MergedConfig> {
	let fragments = if fragments.is_empty() {
		Selection::load(config_dir)
			.context("Failed to read fragment selection")?
			.selected()
	} else {
		fragments
	};

	load_merged_config(
		config_dir,
		&fragments,
		FragmentOrder::SortedByName,
		policy,
		&mut TracingSink,
	)
	.context("Failed to merge configuration")
}

fn handle_show(
	config_dir: &Path,
	fragments: Vec<String>,
	policy: MergePolicy,
	show_provenance: bool,
	write: Option<&Path>,
) -> Result<ExitCode> {
	let merged = merge_build_config(config_dir, fragments, policy)?;
	let rendered = serde_json::to_string_pretty(&merged.tree.to_json())?;

	println!("Using config:");
	println!("{}", rendered);

	if show_provenance {
		println!();
		println!("Provenance (in merge order: {}):", merged.fragments.join(", "));
		for (path, value) in merged.tree.leaves() {
			let dotted = path.join(".");
			let owner = merged.provenance.owner_of(&dotted).unwrap_or("?");
			println!("  {} = {}  # {}", dotted, value, owner);
		}
	}

	if let Some(path) = write {
		std::fs::write(path, format!("{rendered}\n"))
			.with_context(|| format!("Failed to write {}", path.display()))?;
		println!("Effective config written to \"{}\".", path.display());
	}

	Ok(ExitCode::SUCCESS)
}

fn handle_validate(
	config_dir: &Path,
	fragments: Vec<String>,
	policy: MergePolicy,
) -> Result<ExitCode> {
	let merged = merge_build_config(config_dir, fragments, policy)?;

	let settings = match BuildSettings::from_tree(&merged.tree).and_then(|s| {
		s.validate()?;
		Ok(s)
	}) {
		Ok(settings) => settings,
		Err(e) => {
			eprintln!("Configuration error: {:#}", anyhow::Error::from(e));
			return Ok(ExitCode::FAILURE);
		}
	};

	println!("Configuration is valid:");
	for fragment in &merged.fragments {
		println!("  {}", fragment);
	}
	println!();
	println!("triple: {}", settings.triple());
	println!("vcpkg triplet: {}", settings.vcpkg_triplet());
	println!("build system: {}", settings.cpp_build_system.as_str());
	println!("C compiler: {}", settings.c_compiler()?);
	println!("C++ compiler: {}", settings.cxx_compiler()?);
	println!("vcpkg asset sources: {}", settings.asset_sources()?);
	println!("vcpkg binary sources: {}", settings.binary_sources()?);

	Ok(ExitCode::SUCCESS)
}

fn handle_check_versions(
	config_dir: &Path,
	fragments: Vec<String>,
	policy: MergePolicy,
	tools: &[(String, VersionTuple)],
) -> Result<ExitCode> {
	let merged = merge_build_config(config_dir, fragments, policy)?;
	let settings = BuildSettings::from_tree(&merged.tree).context("Invalid build settings")?;

	let mut all_ok = true;
	for (tool, version) in tools {
		print!("Checking version of {}... ", tool);
		if settings.check_tool_version(tool, version)? {
			println!("OK (found version {})", version);
		} else {
			all_ok = false;
			println!(
				"Error: Expected {} version {}, but found version {}.",
				tool,
				settings
					.expected_versions
					.get(tool)
					.map(String::as_str)
					.unwrap_or_default(),
				version
			);
		}
	}

	Ok(if all_ok {
		ExitCode::SUCCESS
	} else {
		ExitCode::FAILURE
	})
}

fn handle_satisfies(version: &str, constraint: &str) -> Result<ExitCode> {
	let result = version
		.parse::<VersionTuple>()
		.and_then(|version| satisfies(&version, constraint));

	match result {
		Ok(ok) => {
			println!("{}", ok);
			Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
		}
		Err(e) => {
			eprintln!("error: {e}");
			Ok(ExitCode::from(SATISFIES_INPUT_ERROR))
		}
	}
}

fn handle_query(
	config_dir: &Path,
	fragments: &[String],
	policy: MergePolicy,
	queries: &[String],
) -> Result<ExitCode> {
	// Queries feed other scripts; override warnings would only be noise there.
	let merged = load_merged_config(
		config_dir,
		fragments,
		FragmentOrder::AsGiven,
		policy,
		&mut NullSink,
	)
	.context("Failed to merge configuration")?;

	println!("{}", render_queries(&merged.tree, queries));
	Ok(ExitCode::SUCCESS)
}

fn handle_select(config_dir: &Path, action: SelectAction) -> Result<ExitCode> {
	let mut selection = Selection::load(config_dir)
		.with_context(|| format!("Failed to list fragments in {}", config_dir.display()))?;

	if selection.choices().is_empty() {
		println!("No configuration fragments found.");
		return Ok(ExitCode::SUCCESS);
	}

	match action {
		SelectAction::List => {
			print!("{}", selection.render());
		}
		SelectAction::Toggle { indices } => {
			for index in indices {
				if !selection.toggle(index) {
					tracing::warn!("No fragment with number {}", index);
				}
			}
			save_selection(&selection, config_dir);
			print!("{}", selection.render());
		}
		SelectAction::Write { results } => {
			selection
				.write_results(&results)
				.with_context(|| format!("Failed to write {}", results.display()))?;
			save_selection(&selection, config_dir);
		}
	}

	Ok(ExitCode::SUCCESS)
}

/// Saving the selection is best effort.
fn save_selection(selection: &Selection, config_dir: &Path) {
	if let Err(e) = selection.save(config_dir) {
		tracing::warn!("Could not save fragment selection: {}", e);
	}
}
