//! Resolve well-known project files against the project root.

use crate::config::PathsConfig;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPaths {
    pub root: PathBuf,
    pub spec: PathBuf,
    pub lock: PathBuf,
    pub manifest: PathBuf,
    /// Default artifact directory.
    pub output: PathBuf,
}

impl ProjectPaths {
    pub fn new(root: &Path, config: &PathsConfig) -> Self {
        Self {
            root: root.to_path_buf(),
            spec: root.join(&config.spec),
            lock: root.join(&config.lock),
            manifest: root.join(&config.manifest),
            output: root.join(&config.output),
        }
    }

    /// Resolve a root-relative path such as a template reference.
    pub fn resolve(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.root.join(relative)
    }
}
