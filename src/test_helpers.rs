//! Shared test utilities for the virgil test suite.
//!
//! Provides project fixtures, declaration builders, and store readers so
//! orchestrator tests read as scenarios rather than setup.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = project_with(&[robots_decl("robots"), sitemap_decl("sitemap")]);
//! let result = run_with_backend(&options(tmp.path()), &MockBackend::new(), None).unwrap();
//!
//! assert_eq!(read_lock(tmp.path()).entries.len(), 2);
//! assert_eq!(read_manifest(tmp.path()).get(Category::Robots, "robots"), Some("/robots.txt"));
//! ```

use serde_json::{Value, json};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

use crate::config::{PathsConfig, ProjectConfig};
use crate::lock::Lock;
use crate::manifest::Manifest;
use crate::paths::ProjectPaths;
use crate::run::RunOptions;
use crate::store::StoreDocument;

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/project/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/project");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Empty temp project whose specification declares `outputs`.
pub fn project_with(outputs: &[Value]) -> TempDir {
    let tmp = TempDir::new().unwrap();
    write_spec(tmp.path(), outputs);
    tmp
}

/// Write (or overwrite) the specification at the default location.
pub fn write_spec(root: &Path, outputs: &[Value]) {
    let spec = json!({
        "brand": { "name": "Acme", "logo": "logo.svg", "color": "#ff6600" },
        "product": { "name": "Rocket", "logo": "rocket.svg", "version": "2.1.0" },
        "outputs": outputs,
    });
    fs::write(
        root.join(&PathsConfig::default().spec),
        serde_json::to_string_pretty(&spec).unwrap(),
    )
    .unwrap();
}

/// Run options for `root` with stock config.
pub fn options(root: &Path) -> RunOptions {
    RunOptions::new(root, ProjectConfig::default())
}

// =========================================================================
// Declaration builders
// =========================================================================

pub fn robots_decl(id: &str) -> Value {
    json!({
        "type": "robots",
        "id": id,
        "rules": [{ "userAgent": "*", "disallow": ["/admin"] }],
        "sitemap": "https://x.com/sitemap.xml",
    })
}

pub fn sitemap_decl(id: &str) -> Value {
    json!({
        "type": "sitemap",
        "id": id,
        "baseUrl": "https://x.com",
        "pages": [{ "path": "/" }, { "path": "/docs", "priority": 0.8 }],
    })
}

pub fn og_decl(id: &str, title: &str) -> Value {
    json!({
        "type": "og-image",
        "id": id,
        "page": { "title": title, "url": format!("https://x.com/{id}") },
    })
}

// =========================================================================
// Store readers
// =========================================================================

fn project_paths(root: &Path) -> ProjectPaths {
    ProjectPaths::new(root, &PathsConfig::default())
}

/// Load the lock, panicking if it is missing or unreadable.
pub fn read_lock(root: &Path) -> Lock {
    let path = project_paths(root).lock;
    let content = fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("lock not readable at {}: {e}", path.display()));
    serde_json::from_str(&content).unwrap()
}

/// Load the manifest, panicking if it is missing or unreadable.
pub fn read_manifest(root: &Path) -> Manifest {
    let path = project_paths(root).manifest;
    let content = fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("manifest not readable at {}: {e}", path.display()));
    serde_json::from_str(&content).unwrap()
}

/// True when neither store file exists.
pub fn stores_absent(root: &Path) -> bool {
    let paths = project_paths(root);
    !paths.lock.exists() && !paths.manifest.exists()
}

/// Save a lock document directly, bypassing the orchestrator.
pub fn save_lock(root: &Path, lock: &Lock) {
    lock.save(&project_paths(root).lock).unwrap();
}
