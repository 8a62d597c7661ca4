//! Dependency graph export.
//!
//! Nodes are files and external include names; an edge `a -> b` means `b`
//! includes `a`. The graph is written as Graphviz DOT text.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;

use super::ReportError;
use crate::consts::GRAPH_NAME;
use crate::deps::DependencyIndex;
use crate::util::paths::display_relative;

pub struct DependencyGraph {
  graph: DiGraph<String, ()>,
  nodes: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
  /// Build the graph from an index. File names are `~`-relative to `sources_root`.
  pub fn from_index(index: &DependencyIndex<'_>, sources_root: &Path) -> Self {
    let mut graph = Self {
      graph: DiGraph::new(),
      nodes: HashMap::new(),
    };

    for (dependency, records) in &index.internal {
      let from = display_relative(dependency, sources_root);
      for record in records {
        graph.add_edge(&from, &display_relative(&record.path, sources_root));
      }
    }

    for (dependency, records) in &index.external {
      for record in records {
        graph.add_edge(dependency, &display_relative(&record.path, sources_root));
      }
    }

    graph
  }

  fn node(&mut self, name: &str) -> NodeIndex {
    if let Some(idx) = self.nodes.get(name) {
      return *idx;
    }
    let idx = self.graph.add_node(name.to_string());
    self.nodes.insert(name.to_string(), idx);
    idx
  }

  fn add_edge(&mut self, from: &str, to: &str) {
    let from = self.node(from);
    let to = self.node(to);
    self.graph.update_edge(from, to, ());
  }

  pub fn node_count(&self) -> usize {
    self.graph.node_count()
  }

  pub fn edge_count(&self) -> usize {
    self.graph.edge_count()
  }

  /// Edges as `(dependency, dependent)` name pairs, sorted.
  pub fn edges(&self) -> Vec<(&str, &str)> {
    let mut edges: Vec<(&str, &str)> = self
      .graph
      .edge_references()
      .map(|e| (self.graph[e.source()].as_str(), self.graph[e.target()].as_str()))
      .collect();
    edges.sort();
    edges
  }

  /// Render as a DOT digraph with nodes and edges in sorted order.
  pub fn render_dot(&self) -> String {
    let mut names: Vec<&str> = self.graph.node_weights().map(String::as_str).collect();
    names.sort();

    let mut out = String::new();
    let _ = writeln!(out, "digraph {} {{", GRAPH_NAME);
    for name in names {
      let _ = writeln!(out, "  \"{}\";", escape(name));
    }
    for (from, to) in self.edges() {
      let _ = writeln!(out, "  \"{}\" -> \"{}\";", escape(from), escape(to));
    }
    out.push_str("}\n");
    out
  }
}

fn escape(name: &str) -> String {
  name.replace('\\', "\\\\").replace('"', "\\\"")
}

/// `deps_graph_full.dot`, or `deps_graph_<path_with_underscores>.dot` for a
/// single requested file, inside `graphs_dir`.
pub fn graph_path(graphs_dir: &Path, sources_root: &Path, requested: Option<&Path>) -> PathBuf {
  let suffix = match requested {
    None => "full".to_string(),
    Some(path) => {
      let relative = path.strip_prefix(sources_root).unwrap_or(path);
      relative
        .components()
        .filter_map(|c| match c {
          std::path::Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
          _ => None,
        })
        .collect::<Vec<_>>()
        .join("_")
    }
  };
  graphs_dir.join(format!("{}_{}.dot", GRAPH_NAME, suffix))
}

/// Write the rendered graph to `path`, creating its directory.
pub fn write_graph(path: &Path, graph: &DependencyGraph) -> Result<(), ReportError> {
  if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
    fs::create_dir_all(parent).map_err(|source| ReportError::CreateDir {
      path: parent.to_path_buf(),
      source,
    })?;
  }
  fs::write(path, graph.render_dot()).map_err(|source| ReportError::Write {
    path: path.to_path_buf(),
    source,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::source::{SourceKind, SourceRecord, SourceSet};
  use crate::util::hash::hash_bytes;
  use tempfile::TempDir;

  fn record(path: &str, internal: &[&str], external: &[&str]) -> SourceRecord {
    SourceRecord {
      path: PathBuf::from(path),
      kind: SourceKind::Implementation,
      hash: hash_bytes(b""),
      size: 0,
      line_count: 0,
      internal_dependencies: internal.iter().map(PathBuf::from).collect(),
      external_dependencies: external.iter().map(|s| s.to_string()).collect(),
      object_path: None,
      changed: false,
    }
  }

  fn sources() -> SourceSet {
    SourceSet::from_records([
      record("/s/main.cpp", &["/s/a.h", "/s/a.h"], &["vector"]),
      record("/s/a.h", &["/s/b.h"], &[]),
    ])
  }

  #[test]
  fn edges_point_from_dependency_to_dependent() {
    let sources = sources();
    let index = DependencyIndex::build(&sources, None);
    let graph = DependencyGraph::from_index(&index, Path::new("/s"));

    assert_eq!(graph.node_count(), 4);
    assert_eq!(
      graph.edges(),
      [("vector", "~/main.cpp"), ("~/a.h", "~/main.cpp"), ("~/b.h", "~/a.h")]
    );
  }

  #[test]
  fn dot_output_is_sorted_and_escaped() {
    let sources = SourceSet::from_records([record("/s/x.cpp", &[], &["we\"ird"])]);
    let index = DependencyIndex::build(&sources, None);
    let dot = DependencyGraph::from_index(&index, Path::new("/s")).render_dot();

    assert_eq!(
      dot,
      "digraph deps_graph {\n  \"we\\\"ird\";\n  \"~/x.cpp\";\n  \"we\\\"ird\" -> \"~/x.cpp\";\n}\n"
    );
  }

  #[test]
  fn graph_file_names() {
    let graphs = Path::new("/b/graphs");
    let root = Path::new("/s");
    assert_eq!(graph_path(graphs, root, None), PathBuf::from("/b/graphs/deps_graph_full.dot"));
    assert_eq!(
      graph_path(graphs, root, Some(Path::new("/s/core/main.cpp"))),
      PathBuf::from("/b/graphs/deps_graph_core_main.cpp.dot")
    );
  }

  #[test]
  fn write_creates_directory() {
    let temp = TempDir::new().unwrap();
    let sources = sources();
    let index = DependencyIndex::build(&sources, None);
    let graph = DependencyGraph::from_index(&index, Path::new("/s"));
    let path = graph_path(&temp.path().join("graphs"), Path::new("/s"), None);

    write_graph(&path, &graph).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), graph.render_dot());
  }
}
