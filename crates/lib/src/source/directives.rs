//! Include directive scanning.
//!
//! Only `#include` lines are understood; everything else, including other
//! preprocessor directives and conditional blocks, is ignored. The directive
//! marker, the include keyword and both delimiter pairs come from
//! [`IncludeRules`].

use std::io::{self, BufRead};
use std::path::{Component, Path, PathBuf};

use crate::config::{Delimiters, IncludeRules};
use crate::util::paths::normalize;

/// A classified include token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Include {
  /// Project-relative include, resolved to an absolute normalized path.
  Internal(PathBuf),
  /// Library or system include, kept as written between the delimiters.
  External(String),
}

/// Everything learned from reading a file's lines once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectiveScan {
  pub internal: Vec<PathBuf>,
  pub external: Vec<String>,
  pub line_count: usize,
}

/// The include token of `line`, if it is an include directive.
pub fn include_token<'a>(line: &'a str, rules: &IncludeRules) -> Option<&'a str> {
  let directive = line.strip_prefix(rules.directive.as_str())?;
  if directive.is_empty() {
    return None;
  }

  let rest = directive.strip_prefix(rules.keyword.as_str())?;
  if !rest.starts_with(char::is_whitespace) {
    return None;
  }

  let token = rest.trim();
  (!token.is_empty()).then_some(token)
}

fn strip_delimiters<'a>(token: &'a str, delimiters: &Delimiters) -> Option<&'a str> {
  if delimiters.start.is_empty() || delimiters.end.is_empty() {
    return None;
  }
  if token.len() < delimiters.start.len() + delimiters.end.len() {
    return None;
  }
  token
    .strip_prefix(delimiters.start.as_str())?
    .strip_suffix(delimiters.end.as_str())
}

/// Classify an include token found in a file living in `parent`.
///
/// External delimiters are tried first. Tokens matching neither pair, or with
/// nothing between the delimiters, yield `None`.
pub fn classify(token: &str, rules: &IncludeRules, parent: &Path) -> Option<Include> {
  if let Some(inner) = strip_delimiters(token, &rules.external) {
    let inner = inner.trim();
    return (!inner.is_empty()).then(|| Include::External(inner.to_string()));
  }

  if let Some(inner) = strip_delimiters(token, &rules.internal) {
    let inner = inner.trim();
    return (!inner.is_empty()).then(|| Include::Internal(beside(parent, inner)));
  }

  None
}

/// Resolve an internal include against the including file's directory.
///
/// The include is always taken as relative: a leading root is dropped, so
/// `"/x.h"` names `<parent>/x.h`.
fn beside(parent: &Path, include: &str) -> PathBuf {
  let mut path = parent.to_path_buf();
  path.extend(
    Path::new(include)
      .components()
      .filter(|c| !matches!(c, Component::RootDir | Component::Prefix(_))),
  );
  normalize(&path)
}

/// Read `reader` line by line and collect its includes.
///
/// Lines are decoded permissively so binary content never fails the scan.
pub fn scan_includes<R: BufRead>(mut reader: R, parent: &Path, rules: &IncludeRules) -> io::Result<DirectiveScan> {
  let mut scan = DirectiveScan::default();
  let mut buffer = Vec::new();

  loop {
    buffer.clear();
    if reader.read_until(b'\n', &mut buffer)? == 0 {
      break;
    }
    scan.line_count += 1;

    let line = String::from_utf8_lossy(&buffer);
    let line = line.trim_end_matches(['\n', '\r']);

    let Some(token) = include_token(line, rules) else {
      continue;
    };
    match classify(token, rules, parent) {
      Some(Include::Internal(path)) => scan.internal.push(path),
      Some(Include::External(name)) => scan.external.push(name),
      None => {}
    }
  }

  Ok(scan)
}
