mod cmd;
mod logging;
mod output;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use cadb_lib::config::{BuildConfig, Config, IncludeRules, Override, parse_overrides};
use cadb_lib::consts::DEFAULT_CONFIG_PATH;
use cadb_lib::database::HashDatabase;
use cadb_lib::log::{Action, LogSink, TracingSink};
use cadb_lib::source::SourceSet;
use cadb_lib::util::paths::normalize;

use cmd::{cmd_build, cmd_clean, cmd_deps, cmd_graph, cmd_stats};
use output::{format_duration, print_error};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ActionArg {
  /// Compile new and changed sources, then link
  Build,
  /// Remove object files and the link output
  Clean,
  /// List include dependencies and the files using them
  Deps,
  /// Write the dependency graph as a DOT file
  Graph,
  /// Show size, line and dependency statistics
  Stats,
}

impl From<ActionArg> for Action {
  fn from(arg: ActionArg) -> Self {
    match arg {
      ActionArg::Build => Action::Build,
      ActionArg::Clean => Action::Clean,
      ActionArg::Deps => Action::Deps,
      ActionArg::Graph => Action::Graph,
      ActionArg::Stats => Action::Stats,
    }
  }
}

/// cadb - incremental build orchestrator for C and C++ projects
#[derive(Parser)]
#[command(name = "cadb")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Actions to run in order, comma-separated (e.g. clean,build)
  #[arg(value_enum, value_delimiter = ',', required = true)]
  actions: Vec<ActionArg>,

  /// Name of the build configuration to use
  #[arg(long)]
  build: String,

  /// Restrict build, clean, deps and graph to a single source file
  #[arg(long)]
  source_file: Option<PathBuf>,

  /// Configuration overrides as `path.to.key=value`, comma-separated; may be repeated
  #[arg(long)]
  config_data: Vec<String>,

  /// Path to the configuration file
  #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
  config_file: PathBuf,

  /// Output results as JSON
  #[arg(long)]
  json: bool,
}

fn main() -> ExitCode {
  let cli = Cli::parse();

  match run(&cli) {
    Ok(true) => ExitCode::SUCCESS,
    Ok(false) => ExitCode::FAILURE,
    Err(e) => {
      print_error(&format!("{:#}", e));
      ExitCode::FAILURE
    }
  }
}

/// Load the configuration, set up logging and run every requested action.
///
/// Returns `Ok(false)` when an action failed but later ones still ran.
fn run(cli: &Cli) -> Result<bool> {
  let mut overrides: Vec<Override> = Vec::new();
  for data in &cli.config_data {
    overrides.extend(parse_overrides(data).with_context(|| format!("Invalid --config-data '{}'", data))?);
  }

  let config = Config::load_with_overrides(&cli.config_file, &overrides)
    .with_context(|| format!("Failed to load configuration {}", cli.config_file.display()))?;
  let build = config.build(&cli.build)?;

  let dispatch = logging::dispatch(&build.options.logging)?;
  tracing::dispatcher::with_default(&dispatch, || run_actions(cli, &config.includes, build))
}

fn run_actions(cli: &Cli, includes: &IncludeRules, build: &BuildConfig) -> Result<bool> {
  let log = TracingSink::current();

  let mut database = HashDatabase::load(&build.paths.database);
  let sources = SourceSet::discover(&build.layout(), includes, &database).context("Failed to scan sources")?;
  let requested = cli.source_file.as_deref().map(absolute_source).transpose()?;
  let requested = requested.as_deref();

  let runtime = tokio::runtime::Builder::new_current_thread()
    .enable_all()
    .build()
    .context("Failed to create async runtime")?;

  let mut success = true;
  for &arg in &cli.actions {
    let action = Action::from(arg);
    let start = Instant::now();

    let result = match arg {
      ActionArg::Build => cmd_build(&runtime, build, &sources, &mut database, requested, cli.json, &log),
      ActionArg::Clean => cmd_clean(build, &sources, requested, cli.json, &log).map(|()| true),
      ActionArg::Deps => cmd_deps(build, &sources, requested, cli.json, &log).map(|()| true),
      ActionArg::Graph => cmd_graph(build, &sources, requested, cli.json, &log).map(|()| true),
      ActionArg::Stats => cmd_stats(build, &sources, cli.json).map(|()| true),
    };

    match result {
      Ok(ok) => success &= ok,
      Err(e) => {
        log.error(action, format!("{:#}", e));
        success = false;
      }
    }

    log.info(
      action,
      format!("Action completed in [{}]", format_duration(start.elapsed())),
    );
  }

  Ok(success)
}

/// Absolute, normalized form of a `--source-file` argument.
///
/// Symlinks are not followed, matching how discovered source paths are built.
fn absolute_source(path: &Path) -> Result<PathBuf> {
  if path.is_absolute() {
    return Ok(normalize(path));
  }
  let cwd = std::env::current_dir().context("Failed to read the current directory")?;
  Ok(normalize(&cwd.join(path)))
}
