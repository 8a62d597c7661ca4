//! Typed configuration structures.
//!
//! The on-disk format is JSON with camelCase keys:
//!
//! ```json
//! {
//!   "includes": {
//!     "internal": { "start": "\"", "end": "\"" },
//!     "external": { "start": "<", "end": ">" }
//!   },
//!   "builds": {
//!     "dev": {
//!       "paths": { "sources": "src", "build": "build", "database": "build/files.db" },
//!       "headerFileExtensions": ["h", "hpp"],
//!       "implementationFileExtensions": ["cpp"],
//!       "compiler": { "path": "g++", "options": ["-c", "-Wall"] },
//!       "linker": { "path": "g++", "options": [], "output": { "name": "build/app" } },
//!       "pre": { "compile": [], "link": [] },
//!       "post": { "compile": [], "link": [] },
//!       "options": { "parallel": true, "logging": { "level": "info", "target": "console" } }
//!     }
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{DEFAULT_DIRECTIVE_MARKER, DEFAULT_GRAPHS_DIR, DEFAULT_INCLUDE_KEYWORD, DEFAULT_OBJECT_EXTENSION};

/// Errors that can occur while loading or adjusting configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
  /// Failed to read the configuration file.
  #[error("failed to read config file {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  /// The configuration file is not valid JSON or does not match the schema.
  #[error("failed to parse config file {path}: {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },

  /// The configuration no longer matches the schema after an override.
  #[error("invalid value for config override '{path}': {source}")]
  InvalidOverrideValue {
    path: String,
    #[source]
    source: serde_json::Error,
  },

  /// An override string is not of the form `a.b.c=value`.
  #[error("invalid config override '{0}': expected <path>=<value>")]
  InvalidOverride(String),

  /// An override path walks through a value that is not an object.
  #[error("config override path '{0}' does not address a config section")]
  OverridePath(String),

  /// Serializing the configuration for an override failed.
  #[error("failed to serialize config: {0}")]
  Serialize(#[source] serde_json::Error),

  /// The requested build name is not defined.
  #[error("unknown build configuration: {0}")]
  UnknownBuild(String),

  /// A required option is missing or empty.
  #[error("missing required option: {0}")]
  MissingOption(String),
}

/// Root configuration object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
  /// How include directives are recognized and classified.
  #[serde(default)]
  pub includes: IncludeRules,

  /// Named build configurations.
  pub builds: BTreeMap<String, BuildConfig>,
}

/// Include directive scanning rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncludeRules {
  /// Marker a directive line starts with.
  #[serde(default = "default_directive")]
  pub directive: String,

  /// Keyword following the marker for include directives.
  #[serde(default = "default_keyword")]
  pub keyword: String,

  /// Delimiters of project-relative includes.
  #[serde(default = "Delimiters::quotes")]
  pub internal: Delimiters,

  /// Delimiters of library/system includes.
  #[serde(default = "Delimiters::angle_brackets")]
  pub external: Delimiters,
}

impl Default for IncludeRules {
  fn default() -> Self {
    Self {
      directive: default_directive(),
      keyword: default_keyword(),
      internal: Delimiters::quotes(),
      external: Delimiters::angle_brackets(),
    }
  }
}

fn default_directive() -> String {
  DEFAULT_DIRECTIVE_MARKER.to_string()
}

fn default_keyword() -> String {
  DEFAULT_INCLUDE_KEYWORD.to_string()
}

/// Start and end markers around an include token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delimiters {
  pub start: String,
  pub end: String,
}

impl Delimiters {
  pub fn new(start: &str, end: &str) -> Self {
    Self {
      start: start.to_string(),
      end: end.to_string(),
    }
  }

  pub fn quotes() -> Self {
    Self::new("\"", "\"")
  }

  pub fn angle_brackets() -> Self {
    Self::new("<", ">")
  }
}

/// One named build configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildConfig {
  pub paths: PathsConfig,

  pub header_file_extensions: Vec<String>,

  pub implementation_file_extensions: Vec<String>,

  /// Extension of compiled artifacts, without the dot.
  #[serde(default = "default_object_extension")]
  pub object_extension: String,

  pub compiler: CompilerConfig,

  pub linker: LinkerConfig,

  /// Commands run before each stage.
  #[serde(default)]
  pub pre: Hooks,

  /// Commands run after each stage.
  #[serde(default)]
  pub post: Hooks,

  #[serde(default)]
  pub options: BuildOptions,
}

fn default_object_extension() -> String {
  DEFAULT_OBJECT_EXTENSION.to_string()
}

/// Filesystem locations of a build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathsConfig {
  /// Root of the source tree.
  pub sources: PathBuf,

  /// Root of the artifact tree; mirrors the source tree.
  pub build: PathBuf,

  /// Paths excluded from discovery; relative entries are below `sources`.
  #[serde(default)]
  pub excludes: Vec<PathBuf>,

  /// Location of the hash database.
  pub database: PathBuf,

  /// Directory for generated graph files.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub graphs: Option<PathBuf>,
}

impl PathsConfig {
  /// Configured graphs directory, or `graphs/` below the build directory.
  pub fn graphs_dir(&self) -> PathBuf {
    self
      .graphs
      .clone()
      .unwrap_or_else(|| self.build.join(DEFAULT_GRAPHS_DIR))
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilerConfig {
  /// Compiler executable (may include leading arguments, e.g. `ccache g++`).
  pub path: String,

  #[serde(default)]
  pub options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkerConfig {
  pub path: String,

  #[serde(default)]
  pub options: Vec<String>,

  pub output: LinkerOutput,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkerOutput {
  /// Path of the final linked artifact.
  pub name: PathBuf,
}

/// Stage of the toolchain a hook is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
  Compile,
  Link,
}

impl Stage {
  pub fn as_str(&self) -> &'static str {
    match self {
      Stage::Compile => "compile",
      Stage::Link => "link",
    }
  }
}

impl std::fmt::Display for Stage {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// External commands keyed by stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hooks {
  #[serde(default)]
  pub compile: Vec<String>,

  #[serde(default)]
  pub link: Vec<String>,
}

impl Hooks {
  pub fn for_stage(&self, stage: Stage) -> &[String] {
    match stage {
      Stage::Compile => &self.compile,
      Stage::Link => &self.link,
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildOptions {
  /// Compile planned files concurrently instead of one at a time.
  #[serde(default)]
  pub parallel: bool,

  #[serde(default)]
  pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
  #[serde(default)]
  pub level: LogLevel,

  #[serde(default)]
  pub target: LogTarget,

  /// Log file, required when `target` is `file`.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub path: Option<PathBuf>,

  /// Append to an existing log file instead of truncating it.
  #[serde(default)]
  pub append: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
  Trace,
  Debug,
  #[default]
  Info,
  #[serde(alias = "warning")]
  Warn,
  #[serde(alias = "critical")]
  Error,
}

impl LogLevel {
  /// Directive understood by `tracing_subscriber::EnvFilter`.
  pub fn as_filter(&self) -> &'static str {
    match self {
      LogLevel::Trace => "trace",
      LogLevel::Debug => "debug",
      LogLevel::Info => "info",
      LogLevel::Warn => "warn",
      LogLevel::Error => "error",
    }
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogTarget {
  #[default]
  Console,
  File,
}
