//! Reporting over a discovered source set.
//!
//! These produce data only; rendering belongs to the caller.
//! - `deps`: dependency table rows (what includes what)
//! - `graph`: dependency graph in Graphviz DOT format
//! - `stats`: size, line and dependency statistics

pub mod deps;
pub mod graph;
pub mod stats;

pub use deps::{DependencyKind, DependencyRow, dependency_rows};
pub use graph::{DependencyGraph, graph_path, write_graph};
pub use stats::{Extremes, RankedEntry, SourceStats};

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
  #[error("failed to create directory {path}: {source}")]
  CreateDir {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to write {path}: {source}")]
  Write {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}
