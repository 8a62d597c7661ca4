//! Test utilities for cadb-lib.
//!
//! Helpers that lay out a small source tree and install fake toolchain
//! scripts. The fake compiler copies its input to the `-o` path and fails when
//! the source contains `COMPILE_ERROR`; every invocation is appended to
//! `compile.log` next to the script so tests can count compilations.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{BuildConfig, CompilerConfig, Hooks, LinkerConfig, LinkerOutput, PathsConfig};
use crate::config::{BuildOptions, LoggingConfig};

/// Marker that makes the fake compiler exit with status 1.
pub const COMPILE_ERROR_MARKER: &str = "COMPILE_ERROR";

/// Write `content` to `root/relative`, creating parent directories.
pub fn write_file(root: &Path, relative: &str, content: &str) -> PathBuf {
  let path = root.join(relative);
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent).unwrap();
  }
  fs::write(&path, content).unwrap();
  path
}

#[cfg(unix)]
fn write_script(path: &Path, body: &str) {
  use std::os::unix::fs::PermissionsExt;

  fs::write(path, format!("#!/bin/sh\n{}", body)).unwrap();
  fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
}

/// Install a fake compiler in `dir` and return its path.
///
/// Invoked as `cc -o OBJECT [options...] SOURCE`.
#[cfg(unix)]
pub fn fake_compiler(dir: &Path) -> PathBuf {
  fs::create_dir_all(dir).unwrap();
  let path = dir.join("cc.sh");
  let log = dir.join("compile.log");
  let body = format!(
    r#"out="$2"
for src; do :; done
echo "$src" >> "{log}"
if grep -q {marker} "$src"; then
  echo "error: cannot compile $src" >&2
  exit 1
fi
echo "compiled $src"
cp "$src" "$out"
"#,
    log = log.display(),
    marker = COMPILE_ERROR_MARKER,
  );
  write_script(&path, &body);
  path
}

/// Install a fake linker in `dir` and return its path.
///
/// Invoked as `ld -o OUTPUT OBJECTS...`; concatenates the objects into the output.
#[cfg(unix)]
pub fn fake_linker(dir: &Path) -> PathBuf {
  fs::create_dir_all(dir).unwrap();
  let path = dir.join("ld.sh");
  let body = r#"out="$2"
shift 2
cat "$@" > "$out"
"#;
  write_script(&path, body);
  path
}

/// Lines of `compile.log` written by the fake compiler in `dir`.
pub fn compiled_sources(dir: &Path) -> Vec<PathBuf> {
  fs::read_to_string(dir.join("compile.log"))
    .map(|log| log.lines().map(PathBuf::from).collect())
    .unwrap_or_default()
}

/// A build configuration rooted in `root` with `src/`, `build/` and `tools/`.
pub fn build_config(root: &Path, compiler: &Path, linker: &Path) -> BuildConfig {
  BuildConfig {
    paths: PathsConfig {
      sources: root.join("src"),
      build: root.join("build"),
      excludes: vec![],
      database: root.join("build").join("files.db"),
      graphs: None,
    },
    header_file_extensions: vec!["h".to_string()],
    implementation_file_extensions: vec!["cpp".to_string()],
    object_extension: "o".to_string(),
    compiler: CompilerConfig {
      path: compiler.display().to_string(),
      options: vec![],
    },
    linker: LinkerConfig {
      path: linker.display().to_string(),
      options: vec![],
      output: LinkerOutput {
        name: root.join("build").join("app"),
      },
    },
    pre: Hooks::default(),
    post: Hooks::default(),
    options: BuildOptions {
      parallel: false,
      logging: LoggingConfig::default(),
    },
  }
}

/// Returns the shell command line for a script that always fails.
#[cfg(unix)]
pub fn failing_command() -> &'static str {
  "echo 'hook failed' >&2; exit 3"
}

#[cfg(windows)]
pub fn failing_command() -> &'static str {
  "Write-Error 'hook failed'; exit 3"
}
