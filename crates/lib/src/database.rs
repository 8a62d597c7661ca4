//! Persisted file hash database.
//!
//! The database maps absolute source paths to the content hash they had when
//! their artifact was last confirmed built. It is what makes builds
//! incremental: a file whose current hash matches its entry is unchanged.
//!
//! # Format
//!
//! ```json
//! {
//!   "/project/src/main.cpp": "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08",
//!   "/project/src/util.h": "60303ae22b998861bce3b28f33eec1be758a213c86c93c076dbe9f558c11c752"
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::util::hash::ContentHash;

/// Errors that can occur when persisting the database.
#[derive(Debug, Error)]
pub enum DatabaseError {
  #[error("failed to create database directory {path}: {source}")]
  CreateDir {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to write database {path}: {source}")]
  Write {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to serialize database: {0}")]
  Serialize(#[source] serde_json::Error),
}

/// Path to hash map with sorted keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HashDatabase {
  entries: BTreeMap<String, String>,
}

impl HashDatabase {
  pub fn new() -> Self {
    Self::default()
  }

  /// Load the database at `path`.
  ///
  /// A missing file yields an empty database. A file that cannot be read or
  /// parsed also yields an empty database, with a warning: the next build then
  /// recompiles everything, which is always safe.
  pub fn load(path: &Path) -> Self {
    let content = match fs::read_to_string(path) {
      Ok(content) => content,
      Err(e) if e.kind() == io::ErrorKind::NotFound => {
        debug!(path = %path.display(), "no hash database yet");
        return Self::new();
      }
      Err(e) => {
        warn!(path = %path.display(), error = %e, "failed to read hash database, starting empty");
        return Self::new();
      }
    };

    match serde_json::from_str(&content) {
      Ok(db) => db,
      Err(e) => {
        warn!(path = %path.display(), error = %e, "malformed hash database, starting empty");
        Self::new()
      }
    }
  }

  /// Write the database to `path` atomically, creating the parent directory.
  pub fn save(&self, path: &Path) -> Result<(), DatabaseError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
      fs::create_dir_all(parent).map_err(|source| DatabaseError::CreateDir {
        path: parent.to_path_buf(),
        source,
      })?;
    }

    let content = serde_json::to_string_pretty(self).map_err(DatabaseError::Serialize)?;

    let mut temp_name = path.as_os_str().to_owned();
    temp_name.push(".tmp");
    let temp_path = PathBuf::from(temp_name);

    let write_error = |source| DatabaseError::Write {
      path: path.to_path_buf(),
      source,
    };
    fs::write(&temp_path, content).map_err(write_error)?;
    fs::rename(&temp_path, path).map_err(write_error)?;

    debug!(path = %path.display(), entries = self.entries.len(), "saved hash database");
    Ok(())
  }

  /// Stored hash for `path`, if any.
  pub fn get(&self, path: &Path) -> Option<&str> {
    self.entries.get(&key(path)).map(String::as_str)
  }

  /// Record `hash` as the confirmed hash of `path`.
  pub fn insert(&mut self, path: &Path, hash: &ContentHash) {
    self.entries.insert(key(path), hash.0.clone());
  }

  /// True when the stored hash is absent or differs from `hash`.
  pub fn is_changed(&self, path: &Path, hash: &ContentHash) -> bool {
    self.get(path) != Some(hash.as_str())
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
    self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
  }
}

fn key(path: &Path) -> String {
  path.to_string_lossy().into_owned()
}
