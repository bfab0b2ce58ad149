//! Crash-safe JSON persistence shared by the lock and manifest stores.
//!
//! Both stores follow the same contract:
//!
//! - **Loading never fails.** A missing file, an unreadable file, malformed
//!   JSON, or a document with an unsupported `version` all yield a fresh,
//!   empty document. Losing this state only costs a full regeneration, so it
//!   is reported through [`StoreLoad::AbsentOrCorrupt`] and logged, never
//!   raised.
//! - **Saving is atomic.** Contents are written to a temporary file in the
//!   same directory, flushed, then renamed over the target. A reader sees
//!   either the previous complete document or the new one, and a crash
//!   before the rename leaves the previous document intact.
//!
//! Generators write their artifacts through [`write_atomic`] as well.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result of loading a persisted store document.
#[derive(Debug)]
pub enum StoreLoad<T> {
    Loaded(T),
    /// Missing, unreadable, malformed, or from an unsupported version.
    AbsentOrCorrupt { reason: String },
}

impl<T> StoreLoad<T> {
    pub fn is_loaded(&self) -> bool {
        matches!(self, StoreLoad::Loaded(_))
    }

    /// The loaded document, or `fresh()` when there was nothing usable.
    pub fn or_fresh(self, fresh: impl FnOnce() -> T) -> T {
        match self {
            StoreLoad::Loaded(document) => document,
            StoreLoad::AbsentOrCorrupt { .. } => fresh(),
        }
    }
}

/// A versioned JSON document persisted with the store contract.
pub trait StoreDocument: Serialize + DeserializeOwned {
    /// Human-readable name used in log lines.
    const KIND: &'static str;
    /// Format version this build reads and writes.
    const VERSION: &'static str;

    /// An empty document at [`Self::VERSION`].
    fn fresh() -> Self;

    /// The version tag stored in the document.
    fn version(&self) -> &str;

    fn load(path: &Path) -> StoreLoad<Self> {
        match read_json::<Self>(path) {
            StoreLoad::Loaded(document) if document.version() != Self::VERSION => {
                let reason = format!(
                    "unsupported {} version {:?} (expected {:?})",
                    Self::KIND,
                    document.version(),
                    Self::VERSION
                );
                tracing::warn!(path = %path.display(), "{reason}; starting fresh");
                StoreLoad::AbsentOrCorrupt { reason }
            }
            other => other,
        }
    }

    fn load_or_fresh(path: &Path) -> Self {
        Self::load(path).or_fresh(Self::fresh)
    }

    fn save(&self, path: &Path) -> Result<(), StoreError> {
        write_json_atomic(path, self)
    }
}

/// Read and parse a JSON document, classifying every failure as
/// [`StoreLoad::AbsentOrCorrupt`].
pub fn read_json<T: DeserializeOwned>(path: &Path) -> StoreLoad<T> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no store file; starting fresh");
            return StoreLoad::AbsentOrCorrupt {
                reason: "not found".to_string(),
            };
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "unreadable store file; starting fresh");
            return StoreLoad::AbsentOrCorrupt {
                reason: e.to_string(),
            };
        }
    };
    match serde_json::from_str(&content) {
        Ok(document) => StoreLoad::Loaded(document),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "corrupt store file; starting fresh");
            StoreLoad::AbsentOrCorrupt {
                reason: e.to_string(),
            }
        }
    }
}

/// Serialize as pretty JSON and replace `path` atomically.
pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StoreError> {
    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');
    write_atomic(path, json.as_bytes())?;
    Ok(())
}

/// Replace `path` with `contents` via a sibling temp file and rename.
///
/// Parent directories are created on demand.
pub fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    let staged = stage(path, contents)?;
    staged.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Write `contents` to a temp file next to `path` without touching `path`.
///
/// Dropping the returned handle without persisting deletes the temp file.
fn stage(path: &Path, contents: &[u8]) -> io::Result<NamedTempFile> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let mut staged = tempfile::Builder::new()
        .prefix(".virgil-")
        .suffix(".tmp")
        .tempfile_in(parent)?;
    staged.write_all(contents)?;
    staged.as_file().sync_all()?;
    Ok(staged)
}
