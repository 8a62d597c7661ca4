//! Reverse dependency index.
//!
//! Maps each include target to the records that declare it, once per
//! declaration: a file that includes the same target twice appears twice, so
//! the list length is the target's use count. The index is derived from a
//! [`SourceSet`] on demand and never persisted.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::source::{SourceRecord, SourceSet};

#[derive(Debug, Clone, Default)]
pub struct DependencyIndex<'a> {
  /// Internal include path -> one entry per declaring include, in set order.
  pub internal: BTreeMap<PathBuf, Vec<&'a SourceRecord>>,
  /// External include name -> one entry per declaring include, in set order.
  pub external: BTreeMap<String, Vec<&'a SourceRecord>>,
}

impl<'a> DependencyIndex<'a> {
  /// Build the index over the whole set, or over the `requested` record only.
  ///
  /// A requested path that is not in the set yields an empty index.
  pub fn build(sources: &'a SourceSet, requested: Option<&Path>) -> Self {
    let mut index = Self::default();

    let records: Vec<&SourceRecord> = match requested {
      Some(path) => sources.get(path).into_iter().collect(),
      None => sources.iter().collect(),
    };

    for record in records {
      for dependency in &record.internal_dependencies {
        index.internal.entry(dependency.clone()).or_default().push(record);
      }
      for dependency in &record.external_dependencies {
        index.external.entry(dependency.clone()).or_default().push(record);
      }
    }

    index
  }

  pub fn is_empty(&self) -> bool {
    self.internal.is_empty() && self.external.is_empty()
  }

  /// Records that include `path` directly.
  pub fn dependents_of(&self, path: &Path) -> &[&'a SourceRecord] {
    self.internal.get(path).map(Vec::as_slice).unwrap_or_default()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::source::SourceKind;
  use crate::util::hash::hash_bytes;

  fn record(path: &str, internal: &[&str], external: &[&str]) -> SourceRecord {
    let kind = if path.ends_with(".h") {
      SourceKind::Header
    } else {
      SourceKind::Implementation
    };
    SourceRecord {
      path: PathBuf::from(path),
      kind,
      hash: hash_bytes(path.as_bytes()),
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
      record("/src/b.cpp", &["/src/a.h"], &["vector", "vector"]),
      record("/src/a.cpp", &["/src/a.h", "/src/missing.h"], &["vector"]),
      record("/src/a.h", &[], &["string"]),
    ])
  }

  fn paths(records: &[&SourceRecord]) -> Vec<PathBuf> {
    records.iter().map(|r| r.path.clone()).collect()
  }

  #[test]
  fn full_index_maps_dependencies_to_dependents() {
    let sources = sources();
    let index = DependencyIndex::build(&sources, None);

    assert_eq!(
      paths(index.dependents_of(Path::new("/src/a.h"))),
      [PathBuf::from("/src/a.cpp"), PathBuf::from("/src/b.cpp")]
    );
    // b.cpp includes <vector> twice and is listed for each include.
    assert_eq!(
      paths(&index.external["vector"]),
      [PathBuf::from("/src/a.cpp"), PathBuf::from("/src/b.cpp"), PathBuf::from("/src/b.cpp")]
    );
    assert_eq!(paths(&index.external["string"]), [PathBuf::from("/src/a.h")]);
    // Dependencies outside the set are still indexed.
    assert!(index.internal.contains_key(Path::new("/src/missing.h")));

    let keys: Vec<_> = index.external.keys().cloned().collect();
    assert_eq!(keys, ["string", "vector"]);
  }

  #[test]
  fn requested_index_covers_one_record() {
    let sources = sources();
    let index = DependencyIndex::build(&sources, Some(Path::new("/src/b.cpp")));

    assert_eq!(index.internal.len(), 1);
    assert_eq!(index.external.len(), 1);
    assert_eq!(paths(&index.external["vector"]), [PathBuf::from("/src/b.cpp"), PathBuf::from("/src/b.cpp")]);
  }

  #[test]
  fn unknown_requested_path_is_empty() {
    let sources = sources();
    let index = DependencyIndex::build(&sources, Some(Path::new("/src/nope.cpp")));
    assert!(index.is_empty());
    assert!(index.dependents_of(Path::new("/src/a.h")).is_empty());
  }
}
