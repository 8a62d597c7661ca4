//! Implementation of the `cadb deps` action.
//!
//! Lists every include target together with the files that include it.

use std::path::Path;

use anyhow::Result;

use cadb_lib::config::BuildConfig;
use cadb_lib::deps::DependencyIndex;
use cadb_lib::log::{Action, LogSink};
use cadb_lib::report::dependency_rows;
use cadb_lib::source::SourceSet;

use crate::output::{print_info, print_json, print_table};

pub fn cmd_deps(
  config: &BuildConfig,
  sources: &SourceSet,
  requested: Option<&Path>,
  json: bool,
  log: &dyn LogSink,
) -> Result<()> {
  let index = DependencyIndex::build(sources, requested);
  let rows = dependency_rows(&index, &config.paths.sources);
  log.debug(Action::Deps, format!("found [{}] dependencies", rows.len()));

  if json {
    return print_json(&rows);
  }

  if rows.is_empty() {
    print_info("No dependencies found");
    return Ok(());
  }

  let table: Vec<Vec<String>> = rows
    .iter()
    .map(|row| vec![row.name.clone(), row.kind.as_str().to_string(), row.used_by.join("\n")])
    .collect();
  print_table(&["Dependency", "Type", "Used By"], &table);

  Ok(())
}
