//! Build and clean actions.
//!
//! A build runs its stages in a fixed order:
//!
//! 1. pre-compile hooks (any failure aborts)
//! 2. planning
//! 3. compilation, parallel or sequential
//! 4. saving the hash database, always, once
//! 5. post-compile hooks, then for full builds pre-link hooks, the link and
//!    post-link hooks
//!
//! A failed compilation ends the build after step 4 and is reported in the
//! returned [`BuildOutcome`]; hook, link and I/O failures are errors.

pub mod clean;
pub mod cmd;
pub mod compile;
pub mod hooks;
pub mod link;
pub mod types;

pub use clean::clean;
pub use cmd::{CommandOutput, run_command};
pub use compile::{CompileJob, CompileLedger, CompileResult};
pub use hooks::run_hooks;
pub use link::link;
pub use types::*;

use std::path::Path;

use tracing::info;

use crate::config::BuildConfig;
use crate::database::HashDatabase;
use crate::log::{Action, LogSink};
use crate::plan::plan_rebuild;
use crate::source::SourceSet;

/// Run a full or single-file build.
///
/// `database` is updated in place with every confirmed artifact and header
/// hash and written to `config.paths.database` before linking.
pub async fn build(
  config: &BuildConfig,
  sources: &SourceSet,
  database: &mut HashDatabase,
  requested: Option<&Path>,
  exec: &ExecuteConfig,
  log: &dyn LogSink,
) -> Result<BuildOutcome, ExecuteError> {
  let shell = exec.shell.as_deref();

  run_hooks(HookStage::PreCompile, HookStage::PreCompile.commands(config), shell, log).await?;

  let plan = plan_rebuild(sources, requested)?;
  for (path, hash) in &plan.header_hashes {
    database.insert(path, hash);
  }

  let mut outcome = BuildOutcome {
    planned: plan.items.iter().map(|item| item.record.path.clone()).collect(),
    ..BuildOutcome::default()
  };

  let jobs: Vec<CompileJob> = plan
    .items
    .iter()
    .filter_map(|item| {
      let record = item.record;
      log.debug(
        Action::Build,
        format!("planned [{}]: {}", record.path.display(), item.reason),
      );
      record.object_path.clone().map(|object| CompileJob {
        source: record.path.clone(),
        object,
        hash: record.hash.clone(),
      })
    })
    .collect();

  if jobs.is_empty() {
    log.info(Action::Build, "No new or updated sources found ...".to_string());
  } else {
    let mode = if exec.parallel {
      format!("parallel build with [{}] processes", exec.parallelism)
    } else {
      "sequential build".to_string()
    };
    log.info(
      Action::Build,
      format!(
        "Starting {} for [{}] out of [{}] source files ...",
        mode,
        jobs.len(),
        sources.len()
      ),
    );
  }

  {
    let mut ledger = CompileLedger::new(database, log);
    if exec.parallel {
      compile::compile_parallel(jobs, &config.compiler, exec, &mut ledger).await;
    } else {
      compile::compile_sequential(jobs, &config.compiler, exec, &mut ledger).await;
    }
    outcome.compiled = std::mem::take(&mut ledger.compiled);
    outcome.failed = std::mem::take(&mut ledger.failed);
    outcome.skipped = std::mem::take(&mut ledger.skipped);
  }

  database.save(&config.paths.database)?;
  info!(
    compiled = outcome.compiled.len(),
    failed = outcome.failed.len(),
    "compile stage settled"
  );

  if !outcome.is_success() {
    log.error(Action::Build, "... build failed.".to_string());
    return Ok(outcome);
  }

  run_hooks(HookStage::PostCompile, HookStage::PostCompile.commands(config), shell, log).await?;

  if plan.is_single_file() {
    log.info(
      Action::Build,
      "... single file compilation requested; linking skipped ...".to_string(),
    );
  } else {
    run_hooks(HookStage::PreLink, HookStage::PreLink.commands(config), shell, log).await?;
    outcome.linked = Some(link(sources, &config.linker, shell, log).await?);
    run_hooks(HookStage::PostLink, HookStage::PostLink.commands(config), shell, log).await?;
  }

  log.info(Action::Build, "... build completed.".to_string());
  Ok(outcome)
}

#[cfg(all(test, unix))]
mod tests {
  use super::*;
  use crate::config::IncludeRules;
  use crate::log::MemorySink;
  use crate::util::hash::hash_bytes;
  use crate::util::testutil::{
    COMPILE_ERROR_MARKER, build_config, compiled_sources, failing_command, fake_compiler, fake_linker, write_file,
  };
  use std::path::PathBuf;
  use tempfile::TempDir;

  struct Project {
    _temp: TempDir,
    root: PathBuf,
    config: BuildConfig,
  }

  impl Project {
    fn new() -> Self {
      let temp = TempDir::new().unwrap();
      let root = temp.path().to_path_buf();
      let tools = root.join("tools");
      let config = build_config(&root, &fake_compiler(&tools), &fake_linker(&tools));
      Self {
        _temp: temp,
        root,
        config,
      }
    }

    fn write(&self, relative: &str, content: &str) -> PathBuf {
      write_file(&self.root, relative, content)
    }

    fn compiled(&self) -> Vec<PathBuf> {
      compiled_sources(&self.root.join("tools"))
    }

    fn database(&self) -> HashDatabase {
      HashDatabase::load(&self.config.paths.database)
    }

    async fn build(&self, requested: Option<&Path>, exec: &ExecuteConfig) -> (Result<BuildOutcome, ExecuteError>, MemorySink) {
      let mut database = self.database();
      let sources = SourceSet::discover(&self.config.layout(), &IncludeRules::default(), &database).unwrap();
      let log = MemorySink::new();
      let result = build(&self.config, &sources, &mut database, requested, exec, &log).await;
      (result, log)
    }
  }

  fn sequential() -> ExecuteConfig {
    ExecuteConfig::default()
  }

  fn parallel() -> ExecuteConfig {
    ExecuteConfig {
      parallel: true,
      parallelism: 4,
      shell: None,
    }
  }

  #[tokio::test]
  async fn full_build_compiles_links_and_records_hashes() {
    let project = Project::new();
    let a = project.write("src/a.cpp", "#include \"a.h\"\nA\n");
    let b = project.write("src/b.cpp", "B\n");
    let h = project.write("src/a.h", "H\n");

    let (result, log) = project.build(None, &sequential()).await;
    let outcome = result.unwrap();

    assert!(outcome.is_success());
    assert_eq!(outcome.planned, [a.clone(), b.clone()]);
    assert_eq!(outcome.linked, Some(project.root.join("build/app")));
    assert_eq!(
      std::fs::read_to_string(project.root.join("build/app")).unwrap(),
      "#include \"a.h\"\nA\nB\n"
    );
    assert!(log.contains("build completed"));

    let db = project.database();
    assert_eq!(db.get(&a), Some(hash_bytes(b"#include \"a.h\"\nA\n").as_str()));
    assert_eq!(db.get(&b), Some(hash_bytes(b"B\n").as_str()));
    assert_eq!(db.get(&h), Some(hash_bytes(b"H\n").as_str()));
  }

  #[tokio::test]
  async fn second_build_compiles_nothing_but_relinks() {
    let project = Project::new();
    project.write("src/a.cpp", "A\n");

    project.build(None, &sequential()).await.0.unwrap();
    assert_eq!(project.compiled().len(), 1);

    let (result, log) = project.build(None, &sequential()).await;
    let outcome = result.unwrap();
    assert!(outcome.planned.is_empty());
    assert!(outcome.linked.is_some());
    assert_eq!(project.compiled().len(), 1);
    assert!(log.contains("No new or updated sources found"));
  }

  #[tokio::test]
  async fn changed_header_rebuilds_direct_includers_only() {
    let project = Project::new();
    let a = project.write("src/a.cpp", "#include \"a.h\"\n");
    project.write("src/b.cpp", "B\n");
    project.write("src/a.h", "v1\n");

    project.build(None, &sequential()).await.0.unwrap();
    project.write("src/a.h", "v2\n");

    let outcome = project.build(None, &sequential()).await.0.unwrap();
    assert_eq!(outcome.planned, [a.clone()]);
    assert_eq!(outcome.compiled, [a]);
    assert_eq!(
      project.database().get(&project.root.join("src/a.h")),
      Some(hash_bytes(b"v2\n").as_str())
    );
  }

  #[tokio::test]
  async fn deleted_artifact_is_rebuilt() {
    let project = Project::new();
    let a = project.write("src/a.cpp", "A\n");
    project.build(None, &sequential()).await.0.unwrap();

    std::fs::remove_file(project.root.join("build/a.o")).unwrap();
    let outcome = project.build(None, &sequential()).await.0.unwrap();
    assert_eq!(outcome.compiled, [a]);
  }

  #[tokio::test]
  async fn sequential_failure_skips_rest_and_link() {
    let project = Project::new();
    let a = project.write("src/a.cpp", COMPILE_ERROR_MARKER);
    let b = project.write("src/b.cpp", "B\n");

    let (result, log) = project.build(None, &sequential()).await;
    let outcome = result.unwrap();

    assert!(!outcome.is_success());
    assert_eq!(outcome.failed[0].source, a);
    assert_eq!(outcome.skipped, [b]);
    assert_eq!(outcome.linked, None);
    assert!(!project.root.join("build/app").exists());
    assert!(log.contains("build failed"));
    // The database is still written.
    assert!(project.config.paths.database.is_file());
  }

  #[tokio::test]
  async fn skipped_includer_is_rebuilt_after_header_change() {
    let project = Project::new();
    project.write("src/a.h", "v1\n");
    let a = project.write("src/a.cpp", "#include \"a.h\"\nA\n");
    let b = project.write("src/b.cpp", "#include \"a.h\"\nB\n");
    project.build(None, &sequential()).await.0.unwrap();

    project.write("src/a.h", "v2\n");
    project.write("src/a.cpp", &format!("#include \"a.h\"\n{}\n", COMPILE_ERROR_MARKER));
    let outcome = project.build(None, &sequential()).await.0.unwrap();
    assert_eq!(outcome.failed[0].source, a);
    assert_eq!(outcome.skipped, [b.clone()]);
    assert!(!project.root.join("build/b.o").exists());

    project.write("src/a.cpp", "#include \"a.h\"\nA\n");
    let outcome = project.build(None, &sequential()).await.0.unwrap();
    assert_eq!(outcome.planned, [a.clone(), b.clone()]);
    assert_eq!(outcome.compiled, [a, b]);
    assert!(outcome.linked.is_some());
  }

  #[tokio::test]
  async fn parallel_failure_records_only_successes() {
    let project = Project::new();
    let a = project.write("src/a.cpp", "A\n");
    let b = project.write("src/b.cpp", COMPILE_ERROR_MARKER);
    let c = project.write("src/c.cpp", "C\n");

    let outcome = project.build(None, &parallel()).await.0.unwrap();
    assert_eq!(outcome.failed.len(), 1);
    assert!(outcome.skipped.is_empty());
    assert_eq!(outcome.linked, None);
    assert_eq!(project.compiled().len(), 3);

    let db = project.database();
    assert!(db.get(&a).is_some());
    assert!(db.get(&c).is_some());
    assert_eq!(db.get(&b), None);
  }

  #[tokio::test]
  async fn single_file_build_skips_link() {
    let project = Project::new();
    let a = project.write("src/a.cpp", "A\n");
    project.write("src/b.cpp", "B\n");

    let (result, log) = project.build(Some(&a), &sequential()).await;
    let outcome = result.unwrap();

    assert_eq!(outcome.compiled, [a.clone()]);
    assert_eq!(outcome.linked, None);
    assert!(log.contains("linking skipped"));
    assert!(project.root.join("build/a.o").is_file());
    assert!(!project.root.join("build/b.o").exists());
    assert_eq!(project.database().len(), 1);
  }

  #[tokio::test]
  async fn single_file_header_is_rejected() {
    let project = Project::new();
    let h = project.write("src/a.h", "H\n");
    let err = project.build(Some(&h), &sequential()).await.0.unwrap_err();
    assert!(matches!(err, ExecuteError::Plan(_)));
  }

  #[tokio::test]
  async fn pre_compile_hook_failure_aborts_before_compiling() {
    let mut project = Project::new();
    project.write("src/a.cpp", "A\n");
    project.config.pre.compile = vec![failing_command().to_string()];

    let err = project.build(None, &sequential()).await.0.unwrap_err();
    assert!(matches!(
      err,
      ExecuteError::HookFailed {
        stage: HookStage::PreCompile,
        ..
      }
    ));
    assert!(project.compiled().is_empty());
    assert!(!project.config.paths.database.exists());
  }

  #[tokio::test]
  async fn hooks_run_in_stage_order() {
    let mut project = Project::new();
    project.write("src/a.cpp", "A\n");
    let trace = project.root.join("hooks.log");
    let append = |name: &str| format!("echo {} >> \"{}\"", name, trace.display());
    project.config.pre.compile = vec![append("pre-compile")];
    project.config.post.compile = vec![append("post-compile")];
    project.config.pre.link = vec![append("pre-link")];
    project.config.post.link = vec![append("post-link")];

    project.build(None, &sequential()).await.0.unwrap();

    let lines: Vec<String> = std::fs::read_to_string(&trace)
      .unwrap()
      .lines()
      .map(str::to_string)
      .collect();
    assert_eq!(lines, ["pre-compile", "post-compile", "pre-link", "post-link"]);
  }

  #[tokio::test]
  async fn link_failure_is_an_error_after_saving_database() {
    let mut project = Project::new();
    let a = project.write("src/a.cpp", "A\n");
    project.config.linker.path = "false".to_string();

    let err = project.build(None, &sequential()).await.0.unwrap_err();
    assert!(matches!(err, ExecuteError::LinkFailed { .. }));
    assert!(project.database().get(&a).is_some());
  }
}
