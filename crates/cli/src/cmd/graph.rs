//! Implementation of the `cadb graph` action.

use std::path::Path;

use anyhow::{Context, Result};

use cadb_lib::config::BuildConfig;
use cadb_lib::deps::DependencyIndex;
use cadb_lib::log::{Action, LogSink};
use cadb_lib::report::{DependencyGraph, graph_path, write_graph};
use cadb_lib::source::SourceSet;

use crate::output::{print_json, print_stat, print_success};

/// Write the dependency graph of the whole set, or of `requested`, as a DOT file.
pub fn cmd_graph(
  config: &BuildConfig,
  sources: &SourceSet,
  requested: Option<&Path>,
  json: bool,
  log: &dyn LogSink,
) -> Result<()> {
  let index = DependencyIndex::build(sources, requested);
  let graph = DependencyGraph::from_index(&index, &config.paths.sources);
  let path = graph_path(&config.paths.graphs_dir(), &config.paths.sources, requested);

  write_graph(&path, &graph).with_context(|| format!("Failed to write graph {}", path.display()))?;
  log.info(Action::Graph, format!("Graph file generated: [{}]", path.display()));

  if json {
    let summary = serde_json::json!({
      "path": path,
      "nodes": graph.node_count(),
      "edges": graph.edge_count(),
    });
    return print_json(&summary);
  }

  print_success(&format!("Graph written to {}", path.display()));
  print_stat("Nodes", &graph.node_count().to_string());
  print_stat("Edges", &graph.edge_count().to_string());

  Ok(())
}
