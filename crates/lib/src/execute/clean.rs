//! Artifact removal.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::types::{CleanReport, ExecuteError};
use crate::config::BuildConfig;
use crate::log::{Action, LogSink};
use crate::plan::select_target;
use crate::source::SourceSet;

/// Remove `path` if it is a file. Returns whether something was removed.
fn remove_if_present(path: &Path) -> Result<bool, ExecuteError> {
  match fs::remove_file(path) {
    Ok(()) => Ok(true),
    Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
    Err(source) => Err(ExecuteError::Artifact {
      path: path.to_path_buf(),
      source,
    }),
  }
}

/// Remove compiled artifacts and the link output.
///
/// With `requested`, only that implementation file's artifact is removed
/// (plus the link output). Running it twice is harmless.
pub fn clean(
  config: &BuildConfig,
  sources: &SourceSet,
  requested: Option<&Path>,
  log: &dyn LogSink,
) -> Result<CleanReport, ExecuteError> {
  let objects: Vec<PathBuf> = match requested {
    Some(path) => select_target(sources, path)?.object_path.iter().cloned().collect(),
    None => sources
      .implementations()
      .filter_map(|r| r.object_path.clone())
      .collect(),
  };

  let mut report = CleanReport::default();

  for object in objects {
    if remove_if_present(&object)? {
      log.info(Action::Clean, format!("... removed object file [{}]", object.display()));
      report.removed_objects.push(object);
    }
  }

  if report.removed_objects.is_empty() {
    log.info(Action::Clean, "No object files found".to_string());
  } else {
    log.info(
      Action::Clean,
      format!("Removed [{}] object files", report.removed_objects.len()),
    );
  }

  let output = &config.linker.output.name;
  if remove_if_present(output)? {
    log.info(Action::Clean, format!("Removed output file [{}]", output.display()));
    report.removed_output = Some(output.clone());
  } else {
    log.info(Action::Clean, "No output file found".to_string());
  }

  Ok(report)
}
