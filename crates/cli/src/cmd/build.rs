//! Implementation of the `cadb build` action.
//!
//! Compiles new or changed implementation files (and the direct includers of
//! changed headers), then links everything unless a single file was requested.

use std::path::Path;

use anyhow::{Context, Result};
use tokio::runtime::Runtime;

use cadb_lib::config::BuildConfig;
use cadb_lib::database::HashDatabase;
use cadb_lib::execute::{ExecuteConfig, build};
use cadb_lib::log::LogSink;
use cadb_lib::source::SourceSet;
use cadb_lib::util::paths::display_relative;

use crate::output::{print_error, print_json, print_stat, print_success, print_warning};

/// Execute the build action. Returns whether every planned file compiled.
pub fn cmd_build(
  runtime: &Runtime,
  config: &BuildConfig,
  sources: &SourceSet,
  database: &mut HashDatabase,
  requested: Option<&Path>,
  json: bool,
  log: &dyn LogSink,
) -> Result<bool> {
  let exec = ExecuteConfig::for_build(config);
  let outcome = runtime
    .block_on(build(config, sources, database, requested, &exec, log))
    .context("Build failed")?;

  if json {
    print_json(&outcome)?;
    return Ok(outcome.is_success());
  }

  let root = &config.paths.sources;
  if outcome.is_success() {
    print_success(&format!("Compiled {} of {} planned files", outcome.compiled.len(), outcome.planned.len()));
  } else {
    print_error(&format!(
      "{} of {} planned files failed to compile",
      outcome.failed.len(),
      outcome.planned.len()
    ));
    for failure in &outcome.failed {
      print_stat(&display_relative(&failure.source, root), &failure.message);
    }
    for skipped in &outcome.skipped {
      print_warning(&format!("Skipped {}", display_relative(skipped, root)));
    }
  }

  if let Some(output) = &outcome.linked {
    print_stat("Output", &output.display().to_string());
  }

  Ok(outcome.is_success())
}
