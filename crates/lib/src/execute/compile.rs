//! The compile stage.
//!
//! Each planned file becomes a [`CompileJob`] that owns everything it needs,
//! so parallel jobs share no state. Results flow back to the controller,
//! which folds them into a [`CompileLedger`] one at a time: only the
//! controller ever touches the hash database.

use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, warn};

use super::cmd::{CommandOutput, compile_command, run_command};
use super::hooks::log_output;
use super::types::{CompileFailure, ExecuteConfig};
use crate::config::CompilerConfig;
use crate::database::HashDatabase;
use crate::log::{Action, LogSink};
use crate::util::hash::ContentHash;

/// One compilation: source, artifact and the hash to record on success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileJob {
  pub source: PathBuf,
  pub object: PathBuf,
  pub hash: ContentHash,
}

#[derive(Debug)]
pub struct CompileResult {
  pub job: CompileJob,
  pub output: io::Result<CommandOutput>,
}

impl CompileResult {
  pub fn success(&self) -> bool {
    matches!(&self.output, Ok(output) if output.success())
  }
}

/// Accumulates compile results and the database updates they confirm.
pub struct CompileLedger<'a> {
  database: &'a mut HashDatabase,
  log: &'a dyn LogSink,
  pub compiled: Vec<PathBuf>,
  pub failed: Vec<CompileFailure>,
  pub skipped: Vec<PathBuf>,
}

impl<'a> CompileLedger<'a> {
  pub fn new(database: &'a mut HashDatabase, log: &'a dyn LogSink) -> Self {
    Self {
      database,
      log,
      compiled: Vec::new(),
      failed: Vec::new(),
      skipped: Vec::new(),
    }
  }

  /// Fold one result in. Returns whether it succeeded.
  pub fn record(&mut self, result: CompileResult) -> bool {
    let CompileResult { job, output } = result;
    let label = job.source.display().to_string();

    match output {
      Ok(output) => {
        log_output(self.log, &label, &output);
        if output.success() {
          self
            .log
            .info(Action::Build, format!("... compilation completed successfully for file [{}]", label));
          self.database.insert(&job.source, &job.hash);
          self.compiled.push(job.source);
          true
        } else {
          let message = format!("compilation failed with exit code {:?}", output.code);
          self.log.error(Action::Build, format!("... {} for file [{}]", message, label));
          self.failed.push(CompileFailure {
            source: job.source,
            code: output.code,
            message: if output.stderr.is_empty() { message } else { output.stderr },
          });
          false
        }
      }
      Err(e) => {
        self.fail(job.source, None, format!("failed to run compiler: {}", e));
        false
      }
    }
  }

  /// Record a failure that produced no command output.
  pub fn fail(&mut self, source: PathBuf, code: Option<i32>, message: String) {
    self
      .log
      .error(Action::Build, format!("... {} for file [{}]", message, source.display()));
    self.failed.push(CompileFailure { source, code, message });
  }

  pub fn has_failures(&self) -> bool {
    !self.failed.is_empty()
  }
}

async fn remove_stale(object: &Path) -> io::Result<()> {
  match tokio::fs::remove_file(object).await {
    Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
    _ => Ok(()),
  }
}

async fn prepare_and_compile(job: &CompileJob, compiler: &CompilerConfig, shell: Option<&str>) -> io::Result<CommandOutput> {
  remove_stale(&job.object).await?;
  if let Some(parent) = job.object.parent() {
    tokio::fs::create_dir_all(parent).await?;
  }
  run_command(&compile_command(compiler, &job.source, &job.object), shell).await
}

/// Remove the stale artifact, create its directory and run the compiler.
pub async fn compile_one(job: CompileJob, compiler: &CompilerConfig, shell: Option<&str>) -> CompileResult {
  debug!(source = %job.source.display(), object = %job.object.display(), "compiling");
  let output = prepare_and_compile(&job, compiler, shell).await;
  CompileResult { job, output }
}

/// Compile one job at a time, stopping at the first failure.
///
/// Jobs left after a failure are skipped and their artifacts removed.
pub async fn compile_sequential(
  jobs: Vec<CompileJob>,
  compiler: &CompilerConfig,
  config: &ExecuteConfig,
  ledger: &mut CompileLedger<'_>,
) {
  let mut jobs = jobs.into_iter();

  for job in jobs.by_ref() {
    let result = compile_one(job, compiler, config.shell.as_deref()).await;
    if !ledger.record(result) {
      break;
    }
  }

  // Skipped files lose their artifacts so the next run rebuilds them.
  for job in jobs {
    if let Err(e) = remove_stale(&job.object).await {
      warn!(object = %job.object.display(), error = %e, "failed to remove artifact of skipped file");
    }
    ledger.skipped.push(job.source);
  }
}

/// Compile every job concurrently, at most `config.parallelism` at a time.
///
/// Every job runs to completion whatever happens to the others.
pub async fn compile_parallel(
  jobs: Vec<CompileJob>,
  compiler: &CompilerConfig,
  config: &ExecuteConfig,
  ledger: &mut CompileLedger<'_>,
) {
  let semaphore = Arc::new(Semaphore::new(config.parallelism.max(1)));
  let mut pending: BTreeSet<PathBuf> = jobs.iter().map(|job| job.source.clone()).collect();
  let mut join_set = JoinSet::new();

  for job in jobs {
    let compiler = compiler.clone();
    let shell = config.shell.clone();
    let semaphore = semaphore.clone();

    join_set.spawn(async move {
      // The semaphore is never closed, so acquiring cannot fail.
      let _permit = semaphore.acquire_owned().await;
      compile_one(job, &compiler, shell.as_deref()).await
    });
  }

  while let Some(joined) = join_set.join_next().await {
    match joined {
      Ok(result) => {
        pending.remove(&result.job.source);
        ledger.record(result);
      }
      Err(e) => {
        error!(error = %e, "compile task panicked");
      }
    }
  }

  // Jobs whose task died never reported back.
  for source in pending {
    ledger.fail(source, None, "compile task did not complete".to_string());
  }
}
