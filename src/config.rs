//! Project configuration module.
//!
//! Handles loading and validating the optional `virgil.toml` at the project
//! root. Every key has a default, so a project without the file builds with
//! stock settings.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [paths]
//! spec = "virgil.spec.json"         # Specification, relative to the root
//! lock = "virgil.lock.json"         # Lock store, relative to the root
//! manifest = "virgil.manifest.json" # Manifest store, relative to the root
//! output = "public"                 # Artifact directory, relative to the root
//!
//! [og_image]
//! width = 1200                      # Viewport and PNG width in pixels
//! height = 630                      # Viewport and PNG height in pixels
//! timeout_secs = 30                 # Upper bound for each browser call
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse. Override just the values you want:
//!
//! ```toml
//! [paths]
//! output = "dist"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Name of the config file within the project root.
pub const CONFIG_FILENAME: &str = "virgil.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Project configuration loaded from `virgil.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    /// Locations of the specification, stores, and artifact directory.
    pub paths: PathsConfig,
    /// Headless browser rendering settings for og-image outputs.
    pub og_image: OgImageConfig,
}

impl ProjectConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let paths = [
            ("paths.spec", &self.paths.spec),
            ("paths.lock", &self.paths.lock),
            ("paths.manifest", &self.paths.manifest),
            ("paths.output", &self.paths.output),
        ];
        for (key, value) in paths {
            if value.trim().is_empty() {
                return Err(ConfigError::Validation(format!("{key} must not be empty")));
            }
        }
        if self.paths.lock == self.paths.manifest {
            return Err(ConfigError::Validation(
                "paths.lock and paths.manifest must differ".into(),
            ));
        }
        if self.og_image.width == 0 || self.og_image.height == 0 {
            return Err(ConfigError::Validation(
                "og_image.width and og_image.height must be non-zero".into(),
            ));
        }
        if self.og_image.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "og_image.timeout_secs must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

/// File locations, all relative to the project root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    pub spec: String,
    pub lock: String,
    pub manifest: String,
    pub output: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            spec: "virgil.spec.json".to_string(),
            lock: "virgil.lock.json".to_string(),
            manifest: "virgil.manifest.json".to_string(),
            output: "public".to_string(),
        }
    }
}

/// og-image rendering settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OgImageConfig {
    pub width: u32,
    pub height: u32,
    /// Bound on each headless browser call. A hung render becomes an error
    /// for that output instead of stalling the run.
    pub timeout_secs: u64,
}

impl Default for OgImageConfig {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 630,
            timeout_secs: 30,
        }
    }
}

/// Load config from `virgil.toml` in the given directory.
///
/// Returns stock defaults when the file does not exist. Rejects unknown
/// keys and validates the result.
pub fn load_config(root: &Path) -> Result<ProjectConfig, ConfigError> {
    let config_path = root.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(ProjectConfig::default());
    }
    let content = fs::read_to_string(&config_path)?;
    let config: ProjectConfig = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `virgil.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Virgil Configuration
# ====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# File locations (relative to the project root)
# ---------------------------------------------------------------------------
[paths]
# Declarative list of outputs to build.
spec = "virgil.spec.json"

# Last-known fingerprint per output. Commit it to skip unchanged outputs in CI.
lock = "virgil.lock.json"

# Public path of every generated artifact, grouped by category.
manifest = "virgil.manifest.json"

# Directory that receives og/, sitemap.xml and robots.txt.
output = "public"

# ---------------------------------------------------------------------------
# Social preview images
# ---------------------------------------------------------------------------
[og_image]
# Rendered card size in pixels. 1200x630 is the common Open Graph size.
width = 1200
height = 630

# Upper bound in seconds for each headless browser call.
timeout_secs = 30
"##
}
