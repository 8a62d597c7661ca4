//! Dotted-path configuration overrides.
//!
//! An override string looks like
//! `builds.dev.options.parallel=false,builds.dev.compiler.path="clang++"`.
//! Each value is read as a JSON literal; anything that does not parse is taken
//! as a plain string, so `compiler.path=g++` works without quoting.

use serde_json::{Map, Value};

use super::types::{Config, ConfigError};

/// A single `path=value` assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct Override {
  pub path: Vec<String>,
  pub value: Value,
}

impl Override {
  /// Parse one `a.b.c=value` assignment.
  pub fn parse(input: &str) -> Result<Self, ConfigError> {
    let (path, raw) = input
      .split_once('=')
      .ok_or_else(|| ConfigError::InvalidOverride(input.to_string()))?;

    let path: Vec<String> = path.trim().split('.').map(|s| s.trim().to_string()).collect();
    if path.iter().any(|segment| segment.is_empty()) {
      return Err(ConfigError::InvalidOverride(input.to_string()));
    }

    Ok(Self {
      path,
      value: parse_value(raw.trim()),
    })
  }

  pub fn dotted_path(&self) -> String {
    self.path.join(".")
  }
}

fn parse_value(raw: &str) -> Value {
  match raw {
    "True" => return Value::Bool(true),
    "False" => return Value::Bool(false),
    "None" => return Value::Null,
    _ => {}
  }
  serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Split a comma separated list of overrides.
///
/// Commas inside double quotes or inside a JSON array/object value do not
/// split, so `compiler.options=["-c","-O2"]` stays a single assignment.
pub fn parse_overrides(input: &str) -> Result<Vec<Override>, ConfigError> {
  let mut overrides = Vec::new();
  let mut current = String::new();
  let mut in_quotes = false;
  let mut depth = 0usize;
  let mut escaped = false;

  for ch in input.chars() {
    if escaped {
      current.push(ch);
      escaped = false;
      continue;
    }
    match ch {
      '\\' if in_quotes => {
        current.push(ch);
        escaped = true;
      }
      '"' => {
        in_quotes = !in_quotes;
        current.push(ch);
      }
      '[' | '{' if !in_quotes => {
        depth += 1;
        current.push(ch);
      }
      ']' | '}' if !in_quotes => {
        depth = depth.saturating_sub(1);
        current.push(ch);
      }
      ',' if !in_quotes && depth == 0 => {
        push_override(&mut overrides, &current)?;
        current.clear();
      }
      _ => current.push(ch),
    }
  }
  push_override(&mut overrides, &current)?;

  Ok(overrides)
}

fn push_override(overrides: &mut Vec<Override>, raw: &str) -> Result<(), ConfigError> {
  let raw = raw.trim();
  if !raw.is_empty() {
    overrides.push(Override::parse(raw)?);
  }
  Ok(())
}

impl Config {
  /// Set the value at `over.path`, creating missing intermediate sections.
  ///
  /// The configuration is round-tripped through its serde representation, so
  /// the result is validated exactly like a freshly loaded file.
  pub fn apply_override(&mut self, over: &Override) -> Result<(), ConfigError> {
    let mut tree = serde_json::to_value(&*self).map_err(ConfigError::Serialize)?;

    let (last, parents) = over
      .path
      .split_last()
      .ok_or_else(|| ConfigError::InvalidOverride(over.dotted_path()))?;

    let mut node = &mut tree;
    for key in parents {
      let map = node
        .as_object_mut()
        .ok_or_else(|| ConfigError::OverridePath(over.dotted_path()))?;
      node = map.entry(key.clone()).or_insert_with(|| Value::Object(Map::new()));
    }

    node
      .as_object_mut()
      .ok_or_else(|| ConfigError::OverridePath(over.dotted_path()))?
      .insert(last.clone(), over.value.clone());

    *self = serde_json::from_value(tree).map_err(|source| ConfigError::InvalidOverrideValue {
      path: over.dotted_path(),
      source,
    })?;

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const CONFIG: &str = r#"{
    "builds": {
      "dev": {
        "paths": { "sources": "src", "build": "build", "database": "build/files.db" },
        "headerFileExtensions": ["h"],
        "implementationFileExtensions": ["cpp"],
        "compiler": { "path": "g++", "options": ["-c"] },
        "linker": { "path": "g++", "output": { "name": "build/app" } }
      }
    }
  }"#;

  fn config() -> Config {
    serde_json::from_str(CONFIG).unwrap()
  }

  #[test]
  fn parse_splits_on_commas_outside_quotes() {
    let overrides =
      parse_overrides(r#"builds.dev.options.parallel=false,builds.dev.compiler.path="g++, patched""#).unwrap();

    assert_eq!(overrides.len(), 2);
    assert_eq!(overrides[0].path, ["builds", "dev", "options", "parallel"]);
    assert_eq!(overrides[0].value, Value::Bool(false));
    assert_eq!(overrides[1].value, Value::String("g++, patched".to_string()));
  }

  #[test]
  fn parse_keeps_arrays_together() {
    let overrides = parse_overrides(r#"builds.dev.compiler.options=["-c","-O2"]"#).unwrap();
    assert_eq!(overrides.len(), 1);
    assert_eq!(overrides[0].value, serde_json::json!(["-c", "-O2"]));
  }

  #[test]
  fn bare_words_become_strings() {
    let over = Override::parse("builds.dev.compiler.path=clang++").unwrap();
    assert_eq!(over.value, Value::String("clang++".to_string()));
  }

  #[test]
  fn python_style_booleans_are_accepted() {
    let over = Override::parse("builds.dev.options.parallel=True").unwrap();
    assert_eq!(over.value, Value::Bool(true));
  }

  #[test]
  fn missing_equals_is_rejected() {
    assert!(matches!(
      Override::parse("builds.dev.options.parallel"),
      Err(ConfigError::InvalidOverride(_))
    ));
    assert!(matches!(Override::parse("builds..x=1"), Err(ConfigError::InvalidOverride(_))));
  }

  #[test]
  fn apply_sets_nested_value() {
    let mut config = config();
    let over = Override::parse(r#"builds.dev.compiler.path="clang++""#).unwrap();
    config.apply_override(&over).unwrap();
    assert_eq!(config.builds["dev"].compiler.path, "clang++");
  }

  #[test]
  fn apply_creates_missing_sections() {
    let mut config = config();
    assert!(!config.builds["dev"].options.parallel);

    let over = Override::parse("builds.dev.options.parallel=true").unwrap();
    config.apply_override(&over).unwrap();
    assert!(config.builds["dev"].options.parallel);
  }

  #[test]
  fn apply_rejects_type_mismatch() {
    let mut config = config();
    let over = Override::parse("builds.dev.options.parallel=sometimes").unwrap();
    let err = config.apply_override(&over).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidOverrideValue { .. }));
    // Unchanged on failure.
    assert_eq!(config, self::config());
  }

  #[test]
  fn apply_rejects_path_through_scalar() {
    let mut config = config();
    let over = Override::parse("builds.dev.compiler.path.inner=1").unwrap();
    assert!(matches!(config.apply_override(&over), Err(ConfigError::OverridePath(_))));
  }
}
