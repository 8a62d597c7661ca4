//! The per-file source model.

use std::fs;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::directives::scan_includes;
use super::{SourceError, SourceKind, SourceLayout};
use crate::config::IncludeRules;
use crate::database::HashDatabase;
use crate::util::hash::{ContentHash, hash_file};
use crate::util::paths::rebase;

/// One discovered source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceRecord {
  /// Absolute, normalized path; unique within a build.
  pub path: PathBuf,
  pub kind: SourceKind,
  pub hash: ContentHash,
  pub size: u64,
  pub line_count: usize,
  /// Project-relative includes in declaration order, resolved to absolute paths.
  pub internal_dependencies: Vec<PathBuf>,
  /// Library includes in declaration order, as written.
  pub external_dependencies: Vec<String>,
  /// Artifact path; only implementation files have one.
  pub object_path: Option<PathBuf>,
  /// The database has no entry for `path`, or a different hash.
  pub changed: bool,
}

impl SourceRecord {
  /// Hash, read and classify the file at `path`.
  pub fn load(
    path: &Path,
    kind: SourceKind,
    rules: &IncludeRules,
    layout: &SourceLayout,
    database: &HashDatabase,
  ) -> Result<Self, SourceError> {
    let hash = hash_file(path)?;

    let read_error = |source| SourceError::Read {
      path: path.to_path_buf(),
      source,
    };
    let file = fs::File::open(path).map_err(read_error)?;
    let size = file.metadata().map_err(read_error)?.len();

    let parent = path.parent().unwrap_or(Path::new(""));
    let scan = scan_includes(BufReader::new(file), parent, rules).map_err(read_error)?;

    let object_path = match kind {
      SourceKind::Implementation => Some(object_path_for(path, layout)?),
      SourceKind::Header => None,
    };

    let changed = database.is_changed(path, &hash);

    Ok(Self {
      path: path.to_path_buf(),
      kind,
      hash,
      size,
      line_count: scan.line_count,
      internal_dependencies: scan.internal,
      external_dependencies: scan.external,
      object_path,
      changed,
    })
  }

  pub fn is_implementation(&self) -> bool {
    self.kind == SourceKind::Implementation
  }

  pub fn dependency_count(&self) -> usize {
    self.internal_dependencies.len() + self.external_dependencies.len()
  }
}

/// Artifact path of an implementation file: the same relative location below
/// the build root, with the object extension.
pub fn object_path_for(path: &Path, layout: &SourceLayout) -> Result<PathBuf, SourceError> {
  let rebased =
    rebase(path, &layout.sources_root, &layout.build_root).ok_or_else(|| SourceError::OutsideSourcesRoot {
      path: path.to_path_buf(),
      root: layout.sources_root.clone(),
    })?;
  Ok(rebased.with_extension(&layout.object_extension))
}
