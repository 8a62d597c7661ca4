//! Source file discovery.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use super::{SourceError, SourceKind, SourceLayout};
use crate::util::paths::resolve;

/// Classify `path` by its extension.
///
/// An extension listed for both kinds makes the file an implementation.
fn kind_of(path: &Path, headers: &[&str], implementations: &[&str]) -> Option<SourceKind> {
  let extension = path.extension().and_then(OsStr::to_str)?;
  if implementations.contains(&extension) {
    Some(SourceKind::Implementation)
  } else if headers.contains(&extension) {
    Some(SourceKind::Header)
  } else {
    None
  }
}

fn trim_dots(extensions: &[String]) -> Vec<&str> {
  extensions.iter().map(|e| e.trim_start_matches('.')).collect()
}

/// List every header and implementation file below the sources root.
///
/// Excluded paths are pruned from the walk; a file is excluded when its path
/// starts with an exclusion component-wise. The result is sorted by path.
pub fn scan_sources(layout: &SourceLayout) -> Result<Vec<(PathBuf, SourceKind)>, SourceError> {
  let root = &layout.sources_root;
  if !root.exists() {
    debug!(root = %root.display(), "sources root does not exist");
    return Ok(Vec::new());
  }

  let excludes: Vec<PathBuf> = layout.excludes.iter().map(|e| resolve(root, e)).collect();
  let headers = trim_dots(&layout.header_extensions);
  let implementations = trim_dots(&layout.implementation_extensions);

  let walker = WalkDir::new(root)
    .sort_by_file_name()
    .into_iter()
    .filter_entry(|e| !excludes.iter().any(|excluded| e.path().starts_with(excluded)));

  let mut files = Vec::new();
  for entry in walker {
    let entry = entry.map_err(|source| SourceError::Walk {
      path: root.clone(),
      source,
    })?;
    if !entry.file_type().is_file() {
      continue;
    }
    if let Some(kind) = kind_of(entry.path(), &headers, &implementations) {
      files.push((entry.into_path(), kind));
    }
  }

  files.sort_by(|a, b| a.0.cmp(&b.0));
  Ok(files)
}
