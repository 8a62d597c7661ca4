//! The link stage.

use std::path::PathBuf;

use super::cmd::{link_command, run_command};
use super::hooks::log_output;
use super::types::ExecuteError;
use crate::config::LinkerConfig;
use crate::log::{Action, LogSink};
use crate::source::SourceSet;

/// Link every implementation artifact of `sources` into the configured output.
pub async fn link(
  sources: &SourceSet,
  linker: &LinkerConfig,
  shell: Option<&str>,
  log: &dyn LogSink,
) -> Result<PathBuf, ExecuteError> {
  let output_path = linker.output.name.clone();

  if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
    std::fs::create_dir_all(parent).map_err(|source| ExecuteError::Artifact {
      path: parent.to_path_buf(),
      source,
    })?;
  }

  let objects = sources.implementations().filter_map(|r| r.object_path.as_deref());
  let command = link_command(linker, objects);

  log.info(Action::Build, format!("... linking [{}] ...", output_path.display()));
  let output = run_command(&command, shell).await?;
  log_output(log, &output_path.display().to_string(), &output);

  if !output.success() {
    log.error(
      Action::Build,
      format!(
        "... linking failed with exit code {:?} for file [{}]",
        output.code,
        output_path.display()
      ),
    );
    return Err(ExecuteError::LinkFailed {
      output: output_path,
      code: output.code,
    });
  }

  log.info(
    Action::Build,
    format!("... linking completed successfully for file [{}]", output_path.display()),
  );
  Ok(output_path)
}
