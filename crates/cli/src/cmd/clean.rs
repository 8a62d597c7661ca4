//! Implementation of the `cadb clean` action.

use std::path::Path;

use anyhow::{Context, Result};

use cadb_lib::config::BuildConfig;
use cadb_lib::execute::clean;
use cadb_lib::log::LogSink;
use cadb_lib::source::SourceSet;

use crate::output::{print_info, print_json, print_success};

pub fn cmd_clean(
  config: &BuildConfig,
  sources: &SourceSet,
  requested: Option<&Path>,
  json: bool,
  log: &dyn LogSink,
) -> Result<()> {
  let report = clean(config, sources, requested, log).context("Clean failed")?;

  if json {
    return print_json(&report);
  }

  if report.is_empty() {
    print_info("Nothing to clean");
  } else {
    let output = if report.removed_output.is_some() { " and the output file" } else { "" };
    print_success(&format!("Removed {} object files{}", report.removed_objects.len(), output));
  }

  Ok(())
}
