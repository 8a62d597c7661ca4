//! External command execution.
//!
//! Compiler, linker and hook invocations are plain command lines run through
//! the platform shell, so users can write them exactly as they would in a
//! terminal (quoting, `&&`, redirections). Commands inherit the caller's
//! environment and working directory.

use std::io;
use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use crate::config::{CompilerConfig, LinkerConfig};

/// Exit status and captured output of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
  /// Exit code; `None` if the process was terminated by a signal.
  pub code: Option<i32>,
  pub stdout: String,
  pub stderr: String,
}

impl CommandOutput {
  pub fn success(&self) -> bool {
    self.code == Some(0)
  }
}

/// Run `cmd` through the shell and wait for it to finish.
///
/// There is no timeout and the child is never killed: a hung compiler blocks
/// its stage.
pub async fn run_command(cmd: &str, shell: Option<&str>) -> io::Result<CommandOutput> {
  let (shell_cmd, shell_args) = get_shell(shell);

  debug!(cmd = %cmd, shell = %shell_cmd, "spawning process");

  let output = Command::new(&shell_cmd)
    .args(&shell_args)
    .arg(cmd)
    .stdin(Stdio::null())
    .output()
    .await?;

  let result = CommandOutput {
    code: output.status.code(),
    stdout: String::from_utf8_lossy(&output.stdout).trim_end().to_string(),
    stderr: String::from_utf8_lossy(&output.stderr).trim_end().to_string(),
  };

  debug!(cmd = %cmd, code = ?result.code, "process exited");
  Ok(result)
}

/// `{compiler} -o "{object}" {options...} "{source}"`
pub fn compile_command(compiler: &CompilerConfig, source: &Path, object: &Path) -> String {
  let mut parts = vec![compiler.path.clone(), "-o".to_string(), quote(object)];
  parts.extend(compiler.options.iter().cloned());
  parts.push(quote(source));
  parts.join(" ")
}

/// `{linker} -o "{output}" "{object}"... {options...}`
pub fn link_command<'a>(linker: &LinkerConfig, objects: impl IntoIterator<Item = &'a Path>) -> String {
  let mut parts = vec![linker.path.clone(), "-o".to_string(), quote(&linker.output.name)];
  parts.extend(objects.into_iter().map(quote));
  parts.extend(linker.options.iter().cloned());
  parts.join(" ")
}

fn quote(path: &Path) -> String {
  format!("\"{}\"", path.display())
}

/// Get the shell command and argument for the current platform.
///
/// An explicit shell gets the flag matching its family; otherwise `/bin/sh -c`
/// on Unix and PowerShell on Windows.
fn get_shell(override_shell: Option<&str>) -> (String, Vec<String>) {
  if let Some(shell) = override_shell {
    let args = if shell.contains("powershell") || shell.contains("pwsh") {
      vec!["-NoProfile".to_string(), "-Command".to_string()]
    } else if shell.contains("cmd") {
      vec!["/C".to_string()]
    } else {
      vec!["-c".to_string()]
    };
    return (shell.to_string(), args);
  }

  #[cfg(unix)]
  {
    ("/bin/sh".to_string(), vec!["-c".to_string()])
  }

  #[cfg(windows)]
  {
    (
      "powershell.exe".to_string(),
      vec![
        "-NoProfile".to_string(),
        "-ExecutionPolicy".to_string(),
        "Bypass".to_string(),
        "-Command".to_string(),
      ],
    )
  }
}
