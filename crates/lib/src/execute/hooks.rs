//! Pre/post stage hooks.

use super::cmd::{CommandOutput, run_command};
use super::types::{ExecuteError, HookStage};
use crate::log::{Action, LogSink};

/// Forward a command's captured output to the log, tagged with `label`.
pub(crate) fn log_output(log: &dyn LogSink, label: &str, output: &CommandOutput) {
  if !output.stdout.is_empty() {
    log.info(Action::Build, format!("[{}]: {}", label, output.stdout));
  }
  if !output.stderr.is_empty() {
    log.error(Action::Build, format!("[{}]: {}", label, output.stderr));
  }
}

/// Run `commands` in order. The first non-zero exit aborts the list.
pub async fn run_hooks(
  stage: HookStage,
  commands: &[String],
  shell: Option<&str>,
  log: &dyn LogSink,
) -> Result<(), ExecuteError> {
  if commands.is_empty() {
    log.info(Action::Build, format!("No {} commands defined", stage));
    return Ok(());
  }

  log.info(Action::Build, format!("Running [{}] {} command(s) ...", commands.len(), stage));

  for command in commands {
    let output = run_command(command, shell).await?;
    log_output(log, command, &output);

    if !output.success() {
      log.error(
        Action::Build,
        format!("... {} command failed with exit code {:?}: [{}]", stage, output.code, command),
      );
      return Err(ExecuteError::HookFailed {
        stage,
        command: command.clone(),
        code: output.code,
      });
    }

    log.info(Action::Build, format!("... command completed successfully: [{}]", command));
  }

  Ok(())
}
