//! Build configuration loading.
//!
//! A configuration file holds include scanning rules shared by every build and
//! one or more named builds. Loading resolves every relative path against the
//! directory the file lives in, so the tool behaves the same whatever the
//! working directory is.

mod overrides;
mod types;

pub use overrides::{Override, parse_overrides};
pub use types::*;

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::source::SourceLayout;
use crate::util::paths::resolve;

impl Config {
  /// Parse a configuration from a JSON string without resolving paths.
  pub fn from_json(content: &str, origin: &Path) -> Result<Self, ConfigError> {
    serde_json::from_str(content).map_err(|source| ConfigError::Parse {
      path: origin.to_path_buf(),
      source,
    })
  }

  /// Load a configuration file.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    Self::load_with_overrides(path, &[])
  }

  /// Load a configuration file, apply `overrides` in order, then resolve paths.
  ///
  /// Overrides are applied before path resolution so an overridden relative
  /// path is resolved like one written in the file.
  pub fn load_with_overrides(path: &Path, overrides: &[Override]) -> Result<Self, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
      path: path.to_path_buf(),
      source,
    })?;

    let mut config = Self::from_json(&content, path)?;
    for over in overrides {
      debug!(path = %over.dotted_path(), value = %over.value, "applying config override");
      config.apply_override(over)?;
    }

    let base = path
      .parent()
      .filter(|p| !p.as_os_str().is_empty())
      .unwrap_or_else(|| Path::new("."));
    let base = dunce::canonicalize(base).unwrap_or_else(|_| base.to_path_buf());
    config.resolve_paths(&base);

    Ok(config)
  }

  /// Make every path of every build absolute relative to `base`.
  pub fn resolve_paths(&mut self, base: &Path) {
    for build in self.builds.values_mut() {
      build.resolve_paths(base);
    }
  }

  /// Select and validate the named build.
  pub fn build(&self, name: &str) -> Result<&BuildConfig, ConfigError> {
    let build = self
      .builds
      .get(name)
      .ok_or_else(|| ConfigError::UnknownBuild(name.to_string()))?;
    build.validate(name)?;
    Ok(build)
  }
}

impl BuildConfig {
  fn resolve_paths(&mut self, base: &Path) {
    let paths = &mut self.paths;
    paths.sources = resolve(base, &paths.sources);
    paths.build = resolve(base, &paths.build);
    paths.database = resolve(base, &paths.database);
    // Exclusions stay relative to the sources root; the scanner resolves them.
    if let Some(graphs) = &paths.graphs {
      paths.graphs = Some(resolve(base, graphs));
    }

    self.linker.output.name = resolve(base, &self.linker.output.name);

    if let Some(log_path) = &self.options.logging.path {
      self.options.logging.path = Some(resolve(base, log_path));
    }
  }

  fn validate(&self, name: &str) -> Result<(), ConfigError> {
    let missing = |option: &str| Err(ConfigError::MissingOption(format!("builds.{}.{}", name, option)));

    if self.implementation_file_extensions.is_empty() {
      return missing("implementationFileExtensions");
    }
    if self.compiler.path.trim().is_empty() {
      return missing("compiler.path");
    }
    if self.linker.path.trim().is_empty() {
      return missing("linker.path");
    }
    if self.object_extension.trim_start_matches('.').is_empty() {
      return missing("objectExtension");
    }
    if self.options.logging.target == LogTarget::File && self.options.logging.path.is_none() {
      return missing("options.logging.path");
    }
    Ok(())
  }

  /// The directory layout used for discovery and artifact placement.
  pub fn layout(&self) -> SourceLayout {
    SourceLayout {
      sources_root: self.paths.sources.clone(),
      build_root: self.paths.build.clone(),
      excludes: self.paths.excludes.clone(),
      header_extensions: self.header_file_extensions.clone(),
      implementation_extensions: self.implementation_file_extensions.clone(),
      object_extension: self.object_extension.trim_start_matches('.').to_string(),
    }
  }
}
