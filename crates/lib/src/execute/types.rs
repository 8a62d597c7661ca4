//! Types for build execution.
//!
//! This module defines the error type, the outcome of a build and the
//! execution settings shared by the compile, link and clean stages.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::config::{BuildConfig, Stage};
use crate::database::DatabaseError;
use crate::plan::PlanError;

/// Point in the build where a hook list runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum HookStage {
  PreCompile,
  PostCompile,
  PreLink,
  PostLink,
}

impl HookStage {
  pub fn as_str(&self) -> &'static str {
    match self {
      HookStage::PreCompile => "pre-compile",
      HookStage::PostCompile => "post-compile",
      HookStage::PreLink => "pre-link",
      HookStage::PostLink => "post-link",
    }
  }

  /// The configured commands for this stage.
  pub fn commands(self, config: &BuildConfig) -> &[String] {
    match self {
      HookStage::PreCompile => config.pre.for_stage(Stage::Compile),
      HookStage::PostCompile => config.post.for_stage(Stage::Compile),
      HookStage::PreLink => config.pre.for_stage(Stage::Link),
      HookStage::PostLink => config.post.for_stage(Stage::Link),
    }
  }
}

impl std::fmt::Display for HookStage {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Errors that abort a build or clean action.
///
/// A failed compilation is not an error: it is reported in [`BuildOutcome`].
#[derive(Debug, Error)]
pub enum ExecuteError {
  /// A hook command exited with a non-zero status.
  #[error("{stage} command failed with exit code {code:?}: {command}")]
  HookFailed {
    stage: HookStage,
    command: String,
    code: Option<i32>,
  },

  /// The linker exited with a non-zero status.
  #[error("linking {output} failed with exit code {code:?}")]
  LinkFailed { output: PathBuf, code: Option<i32> },

  /// Removing or preparing an artifact failed.
  #[error("failed to update artifact {path}: {source}")]
  Artifact {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error(transparent)]
  Plan(#[from] PlanError),

  #[error(transparent)]
  Database(#[from] DatabaseError),

  /// I/O error while running an external command.
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

/// A compilation that did not produce its artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompileFailure {
  pub source: PathBuf,
  /// Compiler exit code; `None` when it was killed by a signal or never ran.
  pub code: Option<i32>,
  pub message: String,
}

/// What a build action did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildOutcome {
  /// Files selected by the planner, in plan order.
  pub planned: Vec<PathBuf>,
  /// Files compiled successfully, in completion order.
  pub compiled: Vec<PathBuf>,
  pub failed: Vec<CompileFailure>,
  /// Planned files never compiled because sequential mode stopped early.
  pub skipped: Vec<PathBuf>,
  /// Link output, when the link stage ran.
  pub linked: Option<PathBuf>,
}

impl BuildOutcome {
  pub fn is_success(&self) -> bool {
    self.failed.is_empty() && self.skipped.is_empty()
  }
}

/// What a clean action removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanReport {
  pub removed_objects: Vec<PathBuf>,
  pub removed_output: Option<PathBuf>,
}

impl CleanReport {
  pub fn is_empty(&self) -> bool {
    self.removed_objects.is_empty() && self.removed_output.is_none()
  }
}

/// Settings for running a build.
#[derive(Debug, Clone)]
pub struct ExecuteConfig {
  /// Compile planned files concurrently.
  pub parallel: bool,

  /// Maximum number of concurrent compilations.
  pub parallelism: usize,

  /// Shell used to run command lines.
  /// If None, uses /bin/sh (Unix) or powershell.exe (Windows).
  pub shell: Option<String>,
}

impl ExecuteConfig {
  pub fn for_build(config: &BuildConfig) -> Self {
    Self {
      parallel: config.options.parallel,
      ..Self::default()
    }
  }
}

impl Default for ExecuteConfig {
  fn default() -> Self {
    Self {
      parallel: false,
      parallelism: num_cpus(),
      shell: None,
    }
  }
}

/// Get the number of CPUs for default parallelism.
fn num_cpus() -> usize {
  std::thread::available_parallelism().map(|p| p.get()).unwrap_or(4)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn outcome_success_when_empty() {
    assert!(BuildOutcome::default().is_success());
  }

  #[test]
  fn outcome_fails_with_failures_or_skips() {
    let mut outcome = BuildOutcome::default();
    outcome.skipped.push(PathBuf::from("/s/b.cpp"));
    assert!(!outcome.is_success());

    let outcome = BuildOutcome {
      failed: vec![CompileFailure {
        source: PathBuf::from("/s/a.cpp"),
        code: Some(1),
        message: String::new(),
      }],
      ..BuildOutcome::default()
    };
    assert!(!outcome.is_success());
  }

  #[test]
  fn default_parallelism_is_positive() {
    let config = ExecuteConfig::default();
    assert!(config.parallelism >= 1);
    assert!(!config.parallel);
  }

  #[test]
  fn hook_stage_names() {
    assert_eq!(HookStage::PreCompile.to_string(), "pre-compile");
    assert_eq!(HookStage::PostLink.as_str(), "post-link");
  }
}
