//! Source set statistics.

use std::path::Path;

use serde::Serialize;

use crate::deps::DependencyIndex;
use crate::source::{SourceKind, SourceRecord, SourceSet};
use crate::util::paths::display_relative;

/// A named value in a ranking: a file with its size, or a dependency with its use count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedEntry {
  pub name: String,
  pub value: u64,
}

/// Top and bottom of a ranking. `largest` is in descending order, `smallest`
/// in ascending order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Extremes {
  pub largest: Vec<RankedEntry>,
  pub smallest: Vec<RankedEntry>,
}

impl Extremes {
  /// Rank `entries` by value. Ties keep their input order.
  fn from_entries(mut entries: Vec<RankedEntry>, limit: usize) -> Self {
    entries.sort_by_key(|e| e.value);
    let smallest = entries.iter().take(limit).cloned().collect();
    let largest = entries.iter().rev().take(limit).cloned().collect();
    Self { largest, smallest }
  }

  /// Number of table rows needed to show both sides.
  pub fn rows(&self) -> usize {
    self.largest.len().max(self.smallest.len())
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceStats {
  pub total_lines: u64,
  pub total_files: usize,
  pub total_bytes: u64,
  pub mean_lines: f64,
  pub mean_bytes: f64,
  pub header_files: usize,
  pub implementation_files: usize,
  pub internal_dependencies: usize,
  pub external_dependencies: usize,
  pub header_sizes: Extremes,
  pub implementation_sizes: Extremes,
  pub header_dependencies: Extremes,
  pub implementation_dependencies: Extremes,
  pub internal_by_use: Extremes,
  pub external_by_use: Extremes,
}

impl SourceStats {
  /// Gather statistics over the whole set, keeping `limit` entries per ranking.
  pub fn collect(sources: &SourceSet, sources_root: &Path, limit: usize) -> Self {
    let index = DependencyIndex::build(sources, None);

    let total_lines: u64 = sources.iter().map(|r| r.line_count as u64).sum();
    let total_bytes: u64 = sources.iter().map(|r| r.size).sum();
    let total_files = sources.len();

    let (mean_lines, mean_bytes) = if total_files == 0 {
      (0.0, 0.0)
    } else {
      (
        total_lines as f64 / total_files as f64,
        total_bytes as f64 / total_files as f64,
      )
    };

    let by_kind = |kind: SourceKind, value: fn(&SourceRecord) -> u64| {
      let entries = sources
        .iter()
        .filter(|r| r.kind == kind)
        .map(|r| RankedEntry {
          name: display_relative(&r.path, sources_root),
          value: value(r),
        })
        .collect();
      Extremes::from_entries(entries, limit)
    };

    fn size(r: &SourceRecord) -> u64 {
      r.size
    }
    fn dependencies(r: &SourceRecord) -> u64 {
      r.dependency_count() as u64
    }

    let internal_by_use = index
      .internal
      .iter()
      .map(|(path, users)| RankedEntry {
        name: display_relative(path, sources_root),
        value: users.len() as u64,
      })
      .collect();

    let external_by_use = index
      .external
      .iter()
      .map(|(name, users)| RankedEntry {
        name: name.clone(),
        value: users.len() as u64,
      })
      .collect();

    Self {
      total_lines,
      total_files,
      total_bytes,
      mean_lines,
      mean_bytes,
      header_files: sources.headers().count(),
      implementation_files: sources.implementations().count(),
      internal_dependencies: index.internal.len(),
      external_dependencies: index.external.len(),
      header_sizes: by_kind(SourceKind::Header, size),
      implementation_sizes: by_kind(SourceKind::Implementation, size),
      header_dependencies: by_kind(SourceKind::Header, dependencies),
      implementation_dependencies: by_kind(SourceKind::Implementation, dependencies),
      internal_by_use: Extremes::from_entries(internal_by_use, limit),
      external_by_use: Extremes::from_entries(external_by_use, limit),
    }
  }
}
