//! Hashing utilities for change detection.
//!
//! This module provides:
//! - `ContentHash`: A full 64-character SHA-256 digest of a file's bytes
//! - `hash_file()`: Streamed single file hashing
//! - `hash_bytes()`: Arbitrary byte hashing
//!
//! Every hash stored in the hash database comes from `hash_file()`. Switching
//! the digest algorithm invalidates all stored entries.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::consts::HASH_READ_BUFFER_SIZE;

/// A full 64-character SHA256 hash of file content.
///
/// # Format
///
/// The hash is a lowercase hexadecimal string (64 characters).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentHash(pub String);

impl ContentHash {
  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl std::fmt::Display for ContentHash {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Error while hashing a file.
#[derive(Debug, thiserror::Error)]
#[error("failed to read file {path}: {source}")]
pub struct HashError {
  pub path: PathBuf,
  #[source]
  pub source: io::Error,
}

/// Hash a file's contents.
///
/// The file is streamed through the digest in fixed-size chunks, so memory use
/// does not depend on file size.
pub fn hash_file(path: &Path) -> Result<ContentHash, HashError> {
  let read_error = |source| HashError {
    path: path.to_path_buf(),
    source,
  };

  let mut file = fs::File::open(path).map_err(read_error)?;

  let mut hasher = Sha256::new();
  let mut buffer = vec![0u8; HASH_READ_BUFFER_SIZE];

  loop {
    let bytes_read = match file.read(&mut buffer) {
      Ok(n) => n,
      Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
      Err(e) => return Err(read_error(e)),
    };
    if bytes_read == 0 {
      break;
    }
    hasher.update(&buffer[..bytes_read]);
  }

  Ok(ContentHash(format!("{:x}", hasher.finalize())))
}

/// Hash arbitrary bytes.
///
/// Returns the full 64-character SHA256 hash.
pub fn hash_bytes(data: &[u8]) -> ContentHash {
  let mut hasher = Sha256::new();
  hasher.update(data);
  ContentHash(format!("{:x}", hasher.finalize()))
}
