//! The lock store: last-known fingerprint per output id.
//!
//! The lock drives staleness. An output is regenerated when it has no entry
//! or when its stored fingerprint differs from the current one; on success
//! the entry is overwritten with the new fingerprint, a UTC timestamp, and
//! the generator that produced it.
//!
//! Entries are never removed automatically. An id dropped from the
//! specification leaves an orphan entry behind, which is harmless.
//!
//! ```json
//! {
//!   "version": "0.1",
//!   "entries": {
//!     "robots": {
//!       "hash": "sha256:…",
//!       "generatedAt": "2026-10-19T08:30:00.000Z",
//!       "generator": "robots",
//!       "generatorVersion": "0.1.0"
//!     }
//!   }
//! }
//! ```
//!
//! Entries are kept in a `BTreeMap` so the file diffs cleanly.

use crate::hash::Fingerprint;
use crate::store::StoreDocument;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const LOCK_VERSION: &str = "0.1";

/// Generation record for a single output id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockEntry {
    pub hash: Fingerprint,
    /// RFC 3339 UTC timestamp with millisecond precision.
    pub generated_at: String,
    pub generator: String,
    pub generator_version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lock {
    pub version: String,
    #[serde(default)]
    pub entries: BTreeMap<String, LockEntry>,
}

impl Lock {
    pub fn empty() -> Self {
        Self {
            version: LOCK_VERSION.to_string(),
            entries: BTreeMap::new(),
        }
    }

    pub fn entry(&self, id: &str) -> Option<&LockEntry> {
        self.entries.get(id)
    }

    /// True when `id` was never generated or its fingerprint changed.
    pub fn needs_regeneration(&self, id: &str, current: &Fingerprint) -> bool {
        self.entries
            .get(id)
            .is_none_or(|entry| entry.hash != *current)
    }

    /// Record a successful generation. In-memory only; call
    /// [`save`](StoreDocument::save) to persist.
    pub fn update_entry(
        &mut self,
        id: &str,
        hash: Fingerprint,
        generator: &str,
        generator_version: &str,
    ) {
        self.entries.insert(
            id.to_string(),
            LockEntry {
                hash,
                generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
                generator: generator.to_string(),
                generator_version: generator_version.to_string(),
            },
        );
    }
}

impl StoreDocument for Lock {
    const KIND: &'static str = "lock";
    const VERSION: &'static str = LOCK_VERSION;

    fn fresh() -> Self {
        Self::empty()
    }

    fn version(&self) -> &str {
        &self.version
    }
}
