//! Shared load/save helpers for a retrieval layer's pattern file.
//!
//! Mirrors the knowledge graph's atomic-write approach: a pattern file is
//! read entirely into memory, mutated, and rewritten via a temp file plus
//! rename so a crash never leaves a half-written file behind.

use crate::error::{Result, RetrievalError};
use serde::{de::DeserializeOwned, Serialize};
use std::io::Write;
use std::path::Path;

/// Load `T` from `path`, or `T::default()` if the file does not exist yet.
pub fn load_or_default<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    match std::fs::read_to_string(path) {
        Ok(contents) => serde_json::from_str(&contents).map_err(|source| RetrievalError::Malformed {
            path: path.display().to_string(),
            source,
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "pattern file missing, starting empty");
            Ok(T::default())
        }
        Err(source) => Err(RetrievalError::Io {
            path: path.display().to_string(),
            source,
        }),
    }
}

/// Atomically overwrite `path` with the pretty-printed JSON of `value`.
pub fn save<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| RetrievalError::Io {
            path: parent.display().to_string(),
            source,
        })?;
    }
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(|source| RetrievalError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let json = serde_json::to_string_pretty(value).map_err(|source| RetrievalError::Malformed {
        path: path.display().to_string(),
        source,
    })?;
    tmp.write_all(json.as_bytes()).map_err(|source| RetrievalError::Io {
        path: path.display().to_string(),
        source,
    })?;
    tmp.persist(path).map_err(|e| RetrievalError::Io {
        path: path.display().to_string(),
        source: e.error,
    })?;
    Ok(())
}
