//! Content fingerprints for output declarations.
//!
//! A fingerprint decides whether an output is stale. It is a SHA-256 digest
//! over everything that can change the artifact a generator produces:
//!
//! 1. The declaration as written in the specification, serialized in
//!    canonical form (object keys sorted at every level, arrays kept in
//!    order).
//! 2. The raw bytes of the declaration's template, when it has one.
//! 3. The generator name and version.
//!
//! Fingerprints render as `sha256:<lowercase hex>`. The same prefix is used
//! by [`hash_file`], which fingerprints raw file bytes independently of any
//! declaration.
//!
//! ## Canonical form
//!
//! [`canonical_json`] writes object keys in sorted order explicitly rather
//! than trusting the iteration order of whatever map the value came from, so
//! two declarations that differ only in key order hash identically. Array
//! order is meaningful (sitemap pages, robots rules) and is preserved.
//!
//! ## Scope
//!
//! Fingerprints are declaration-scoped. Global `brand`/`product` context is
//! not part of the input, so editing it does not force every output to
//! regenerate.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Version of the built-in generators. Bump this to invalidate every
/// lock entry when generator output changes.
pub const GENERATOR_VERSION: &str = "0.1.0";

const ALGORITHM: &str = "sha256";

/// Separator between the parts of the hash input.
const SEPARATOR: &[u8] = b"\n";

#[derive(Error, Debug)]
pub enum HashError {
    #[error("cannot read {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A `sha256:<hex>` content fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    fn from_hasher(hasher: Sha256) -> Self {
        Self(format!("{}:{:x}", ALGORITHM, hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The hex digest without the algorithm tag.
    pub fn hex(&self) -> &str {
        self.0
            .split_once(':')
            .map(|(_, hex)| hex)
            .unwrap_or(&self.0)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fingerprint a declaration for a given generator.
///
/// `template_path`, when given, must exist: its bytes are part of the hash
/// input and a missing template is reported as [`HashError::Filesystem`]
/// rather than silently hashed as empty.
pub fn compute_fingerprint<T: Serialize + ?Sized>(
    declaration: &T,
    generator_name: &str,
    generator_version: &str,
    template_path: Option<&Path>,
) -> Result<Fingerprint, HashError> {
    let value = serde_json::to_value(declaration)?;

    let mut hasher = Sha256::new();
    hasher.update(canonical_json(&value).as_bytes());

    if let Some(path) = template_path {
        let template = fs::read(path).map_err(|source| HashError::Filesystem {
            path: path.to_path_buf(),
            source,
        })?;
        hasher.update(SEPARATOR);
        hasher.update(&template);
    }

    hasher.update(SEPARATOR);
    hasher.update(generator_name.as_bytes());
    hasher.update(SEPARATOR);
    hasher.update(generator_version.as_bytes());

    Ok(Fingerprint::from_hasher(hasher))
}

/// Fingerprint the raw bytes of a file.
pub fn hash_file(path: &Path) -> Result<Fingerprint, HashError> {
    let bytes = fs::read(path).map_err(|source| HashError::Filesystem {
        path: path.to_path_buf(),
        source,
    })?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(Fingerprint::from_hasher(hasher))
}

/// Serialize a JSON value with object keys sorted at every nesting level.
///
/// Output is compact (no whitespace). Strings and numbers use their
/// standard JSON text.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));

            out.push('{');
            for (i, (key, item)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::from(key.as_str()).to_string());
                out.push(':');
                write_canonical(item, out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}
