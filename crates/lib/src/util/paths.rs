//! Lexical path helpers.
//!
//! None of these functions touch the filesystem: include paths may point at
//! files that do not exist yet, and artifact paths are derived before the
//! build directory is created.

use std::path::{Component, Path, PathBuf};

/// Collapse `.` and `..` segments and unify separators.
///
/// `..` directly below the root is dropped, `..` at the start of a relative
/// path is kept.
pub fn normalize(path: &Path) -> PathBuf {
  let mut parts: Vec<Component<'_>> = Vec::new();

  for component in path.components() {
    match component {
      Component::CurDir => {}
      Component::ParentDir => match parts.last() {
        Some(Component::Normal(_)) => {
          parts.pop();
        }
        Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
        _ => parts.push(component),
      },
      other => parts.push(other),
    }
  }

  if parts.is_empty() {
    return PathBuf::from(".");
  }

  parts.iter().collect()
}

/// Resolve `path` against `base` when it is relative, then normalize.
pub fn resolve(base: &Path, path: &Path) -> PathBuf {
  if path.is_absolute() {
    normalize(path)
  } else {
    normalize(&base.join(path))
  }
}

/// Move `path` from below `from` to the same place below `to`.
///
/// Matching is component-wise, so `/src/app` is not treated as a prefix of
/// `/src/application/main.cpp`. Returns `None` when `path` is not below `from`.
pub fn rebase(path: &Path, from: &Path, to: &Path) -> Option<PathBuf> {
  let relative = path.strip_prefix(from).ok()?;
  Some(to.join(relative))
}

/// Join the components of `path` with `/`, whatever the host separator is.
pub fn to_slash(path: &Path) -> String {
  let mut out = String::new();
  for component in path.components() {
    match component {
      Component::RootDir => out.push('/'),
      Component::Prefix(prefix) => out.push_str(&prefix.as_os_str().to_string_lossy()),
      other => {
        if !out.is_empty() && !out.ends_with('/') {
          out.push('/');
        }
        out.push_str(&other.as_os_str().to_string_lossy());
      }
    }
  }
  out
}

/// Display name for `path` relative to `root`, written as `~/relative/path`.
///
/// Paths outside `root` are returned in full.
pub fn display_relative(path: &Path, root: &Path) -> String {
  match path.strip_prefix(root) {
    Ok(relative) if relative.as_os_str().is_empty() => "~".to_string(),
    Ok(relative) => format!("~/{}", to_slash(relative)),
    Err(_) => to_slash(path),
  }
}
