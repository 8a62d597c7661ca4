//! Dependency table rows.

use std::path::Path;

use serde::Serialize;

use crate::deps::DependencyIndex;
use crate::source::SourceRecord;
use crate::util::paths::display_relative;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyKind {
  Internal,
  External,
}

impl DependencyKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      DependencyKind::Internal => "Internal",
      DependencyKind::External => "External",
    }
  }
}

/// One dependency and the files that include it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyRow {
  pub name: String,
  pub kind: DependencyKind,
  /// Including files, sorted, each listed once.
  pub used_by: Vec<String>,
}

fn users(records: &[&SourceRecord], sources_root: &Path) -> Vec<String> {
  let mut names: Vec<String> = records
    .iter()
    .map(|r| display_relative(&r.path, sources_root))
    .collect();
  names.sort();
  names.dedup();
  names
}

/// Internal dependencies first, then external ones, each sorted by name.
///
/// Paths below `sources_root` are shown as `~/relative/path`.
pub fn dependency_rows(index: &DependencyIndex<'_>, sources_root: &Path) -> Vec<DependencyRow> {
  let internal = index.internal.iter().map(|(path, records)| DependencyRow {
    name: display_relative(path, sources_root),
    kind: DependencyKind::Internal,
    used_by: users(records, sources_root),
  });

  let external = index.external.iter().map(|(name, records)| DependencyRow {
    name: name.clone(),
    kind: DependencyKind::External,
    used_by: users(records, sources_root),
  });

  internal.chain(external).collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::source::{SourceKind, SourceSet};
  use crate::util::hash::hash_bytes;
  use std::path::PathBuf;

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

  #[test]
  fn rows_are_grouped_and_relative() {
    let sources = SourceSet::from_records([
      record("/p/src/z.cpp", &["/p/src/inc/a.h"], &["vector", "vector"]),
      record("/p/src/b.cpp", &["/p/src/inc/a.h", "/usr/include/x.h"], &["map", "vector"]),
    ]);
    let index = DependencyIndex::build(&sources, None);
    let rows = dependency_rows(&index, Path::new("/p/src"));

    let summary: Vec<(&str, DependencyKind, Vec<String>)> = rows
      .iter()
      .map(|r| (r.name.as_str(), r.kind, r.used_by.clone()))
      .collect();

    assert_eq!(
      summary,
      [
        (
          "~/inc/a.h",
          DependencyKind::Internal,
          vec!["~/b.cpp".to_string(), "~/z.cpp".to_string()]
        ),
        ("/usr/include/x.h", DependencyKind::Internal, vec!["~/b.cpp".to_string()]),
        ("map", DependencyKind::External, vec!["~/b.cpp".to_string()]),
        (
          "vector",
          DependencyKind::External,
          vec!["~/b.cpp".to_string(), "~/z.cpp".to_string()]
        ),
      ]
    );
  }
}
