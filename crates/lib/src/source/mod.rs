//! Source discovery and the per-file source model.
//!
//! A [`SourceSet`] is built once per invocation: the scanner lists every
//! header and implementation file below the sources root, and each file is
//! loaded into an immutable [`SourceRecord`] carrying its hash, its includes
//! and, for implementation files, the artifact path it compiles to.

mod directives;
mod record;
mod scan;

pub use directives::{DirectiveScan, Include, classify, include_token, scan_includes};
pub use record::{SourceRecord, object_path_for};
pub use scan::scan_sources;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::config::IncludeRules;
use crate::database::HashDatabase;
use crate::util::hash::HashError;

/// Role of a source file in the build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
  Header,
  Implementation,
}

impl SourceKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      SourceKind::Header => "header",
      SourceKind::Implementation => "implementation",
    }
  }
}

impl std::fmt::Display for SourceKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Where sources are found and where their artifacts go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLayout {
  pub sources_root: PathBuf,
  pub build_root: PathBuf,
  /// Excluded paths; relative entries are below `sources_root`.
  pub excludes: Vec<PathBuf>,
  pub header_extensions: Vec<String>,
  pub implementation_extensions: Vec<String>,
  /// Artifact extension, without the dot.
  pub object_extension: String,
}

#[derive(Debug, Error)]
pub enum SourceError {
  #[error("failed to walk source directory {path}: {source}")]
  Walk {
    path: PathBuf,
    #[source]
    source: walkdir::Error,
  },

  #[error("failed to read source file {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error(transparent)]
  Hash(#[from] HashError),

  #[error("source file {path} is outside the sources root {root}")]
  OutsideSourcesRoot { path: PathBuf, root: PathBuf },
}

/// All discovered source records, keyed and ordered by path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceSet {
  records: BTreeMap<PathBuf, SourceRecord>,
}

impl SourceSet {
  /// Scan `layout` and load a record for every discovered file.
  pub fn discover(layout: &SourceLayout, rules: &IncludeRules, database: &HashDatabase) -> Result<Self, SourceError> {
    let files = scan_sources(layout)?;
    debug!(root = %layout.sources_root.display(), files = files.len(), "discovered source files");

    let records = files
      .into_iter()
      .map(|(path, kind)| SourceRecord::load(&path, kind, rules, layout, database))
      .collect::<Result<Vec<_>, _>>()?;

    Ok(Self::from_records(records))
  }

  pub fn from_records(records: impl IntoIterator<Item = SourceRecord>) -> Self {
    Self {
      records: records.into_iter().map(|r| (r.path.clone(), r)).collect(),
    }
  }

  pub fn get(&self, path: &Path) -> Option<&SourceRecord> {
    self.records.get(path)
  }

  pub fn contains(&self, path: &Path) -> bool {
    self.records.contains_key(path)
  }

  /// Records in path order.
  pub fn iter(&self) -> impl Iterator<Item = &SourceRecord> {
    self.records.values()
  }

  pub fn headers(&self) -> impl Iterator<Item = &SourceRecord> {
    self.iter().filter(|r| r.kind == SourceKind::Header)
  }

  pub fn implementations(&self) -> impl Iterator<Item = &SourceRecord> {
    self.iter().filter(|r| r.kind == SourceKind::Implementation)
  }

  pub fn len(&self) -> usize {
    self.records.len()
  }

  pub fn is_empty(&self) -> bool {
    self.records.is_empty()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::util::hash::hash_file;
  use crate::util::testutil::write_file;
  use tempfile::TempDir;

  fn layout(root: &Path) -> SourceLayout {
    SourceLayout {
      sources_root: root.join("src"),
      build_root: root.join("build"),
      excludes: vec![],
      header_extensions: vec!["h".to_string()],
      implementation_extensions: vec!["cpp".to_string()],
      object_extension: "o".to_string(),
    }
  }

  #[test]
  fn discover_loads_every_file_in_order() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write_file(root, "src/b.cpp", "#include \"a.h\"\n");
    write_file(root, "src/a.h", "#include <string>\n");
    write_file(root, "src/notes.txt", "ignored");

    let set = SourceSet::discover(&layout(root), &IncludeRules::default(), &HashDatabase::new()).unwrap();

    let paths: Vec<_> = set.iter().map(|r| r.path.clone()).collect();
    assert_eq!(paths, [root.join("src/a.h"), root.join("src/b.cpp")]);
    assert_eq!(set.headers().count(), 1);
    assert_eq!(set.implementations().count(), 1);
    assert!(set.iter().all(|r| r.changed));
  }

  #[test]
  fn discover_marks_unchanged_files() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    let main = write_file(root, "src/main.cpp", "int main() {}\n");
    let util = write_file(root, "src/util.h", "#pragma once\n");

    let mut db = HashDatabase::new();
    db.insert(&main, &hash_file(&main).unwrap());

    let set = SourceSet::discover(&layout(root), &IncludeRules::default(), &db).unwrap();
    assert!(!set.get(&main).unwrap().changed);
    assert!(set.get(&util).unwrap().changed);
  }

  #[test]
  fn missing_root_is_empty() {
    let temp = TempDir::new().unwrap();
    let set = SourceSet::discover(&layout(temp.path()), &IncludeRules::default(), &HashDatabase::new()).unwrap();
    assert!(set.is_empty());
  }
}
