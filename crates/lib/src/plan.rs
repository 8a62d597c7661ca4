//! Rebuild planning.
//!
//! Decides which implementation files must be compiled this run. A file is
//! selected when its content changed, when its artifact is missing, or when a
//! header it includes *directly* changed. Propagation stops after that one
//! hop: a header reached only through another, unchanged header does not
//! trigger a rebuild.

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::source::{SourceKind, SourceRecord, SourceSet};
use crate::util::hash::ContentHash;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanError {
  #[error("cannot build {path} on its own: {kind} files are not compiled")]
  UnsupportedTarget { path: PathBuf, kind: SourceKind },

  #[error("requested file {0} is not a known source file")]
  UnknownTarget(PathBuf),
}

/// Why a file was selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "dependency", rename_all = "snake_case")]
pub enum RebuildReason {
  /// Explicitly requested single-file build.
  Requested,
  /// Content differs from the database.
  Changed,
  /// No artifact at the object path.
  MissingArtifact,
  /// The named direct include changed.
  DependencyChanged(PathBuf),
}

impl std::fmt::Display for RebuildReason {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      RebuildReason::Requested => f.write_str("requested"),
      RebuildReason::Changed => f.write_str("changed"),
      RebuildReason::MissingArtifact => f.write_str("missing artifact"),
      RebuildReason::DependencyChanged(dep) => write!(f, "dependency changed: {}", dep.display()),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedCompile<'a> {
  pub record: &'a SourceRecord,
  pub reason: RebuildReason,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebuildPlan<'a> {
  /// The requested file, for single-file builds.
  pub target: Option<PathBuf>,
  /// Files to compile, in set order.
  pub items: Vec<PlannedCompile<'a>>,
  /// Current header hashes to record in the database.
  pub header_hashes: Vec<(PathBuf, ContentHash)>,
}

impl RebuildPlan<'_> {
  pub fn is_single_file(&self) -> bool {
    self.target.is_some()
  }

  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }
}

/// Resolve a requested path to its implementation record.
pub fn select_target<'a>(sources: &'a SourceSet, requested: &Path) -> Result<&'a SourceRecord, PlanError> {
  let record = sources
    .get(requested)
    .ok_or_else(|| PlanError::UnknownTarget(requested.to_path_buf()))?;

  if record.kind != SourceKind::Implementation {
    return Err(PlanError::UnsupportedTarget {
      path: requested.to_path_buf(),
      kind: record.kind,
    });
  }

  Ok(record)
}

/// Plan a build, checking artifacts on the filesystem.
pub fn plan_rebuild<'a>(sources: &'a SourceSet, requested: Option<&Path>) -> Result<RebuildPlan<'a>, PlanError> {
  plan_rebuild_with(sources, requested, |path| path.is_file())
}

/// Plan a build with a custom artifact existence check.
pub fn plan_rebuild_with<'a, F>(
  sources: &'a SourceSet,
  requested: Option<&Path>,
  artifact_exists: F,
) -> Result<RebuildPlan<'a>, PlanError>
where
  F: Fn(&Path) -> bool,
{
  if let Some(requested) = requested {
    let record = select_target(sources, requested)?;
    return Ok(RebuildPlan {
      target: Some(record.path.clone()),
      items: vec![PlannedCompile {
        record,
        reason: RebuildReason::Requested,
      }],
      header_hashes: Vec::new(),
    });
  }

  let mut items = Vec::new();
  let mut header_hashes = Vec::new();

  for record in sources.iter() {
    match record.kind {
      SourceKind::Header => header_hashes.push((record.path.clone(), record.hash.clone())),
      SourceKind::Implementation => {
        if let Some(reason) = rebuild_reason(record, sources, &artifact_exists) {
          items.push(PlannedCompile { record, reason });
        }
      }
    }
  }

  Ok(RebuildPlan {
    target: None,
    items,
    header_hashes,
  })
}

fn rebuild_reason<F>(record: &SourceRecord, sources: &SourceSet, artifact_exists: &F) -> Option<RebuildReason>
where
  F: Fn(&Path) -> bool,
{
  if record.changed {
    return Some(RebuildReason::Changed);
  }

  let has_artifact = record.object_path.as_deref().is_some_and(artifact_exists);
  if !has_artifact {
    return Some(RebuildReason::MissingArtifact);
  }

  record
    .internal_dependencies
    .iter()
    .find(|dep| sources.get(dep).is_some_and(|d| d.changed))
    .map(|dep| RebuildReason::DependencyChanged(dep.clone()))
}
