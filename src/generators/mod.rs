//! Artifact generators.
//!
//! | Output type | Module | Artifact |
//! |---|---|---|
//! | `og-image` | [`og_image`] | `og/<id>.<hash>.png`, rendered in headless Chrome |
//! | `sitemap` | [`sitemap`] | `sitemap.xml` |
//! | `robots` | [`robots`] | `robots.txt` |
//!
//! The orchestrator only sees the [`Backend`] trait: one method per output
//! type, each taking a type-specific context and a destination path. Every
//! generator creates its own parent directories, writes through
//! [`write_atomic`](crate::store::write_atomic), and is idempotent (same
//! inputs reproduce the same file at the same path).
//!
//! The production implementation is [`StandardBackend`]. Tests use the
//! recording `MockBackend` in [`tests`].

pub mod og_image;
pub mod robots;
pub mod sitemap;

use crate::config::OgImageConfig;
use crate::hash::GENERATOR_VERSION;
use crate::spec::{Brand, OgImageOutput, Product, RobotsOutput, SitemapOutput};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot read template {}: {source}", path.display())]
    Template {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("browser error: {0}")]
    Browser(String),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Everything the og-image generator needs for one card.
#[derive(Debug, Clone, Copy)]
pub struct OgImageContext<'a> {
    pub brand: &'a Brand,
    pub product: &'a Product,
    pub output: &'a OgImageOutput,
    /// Resolved template path; `None` selects the built-in card.
    pub template_path: Option<&'a Path>,
}

#[derive(Debug, Clone, Copy)]
pub struct SitemapContext<'a> {
    pub output: &'a SitemapOutput,
}

#[derive(Debug, Clone, Copy)]
pub struct RobotsContext<'a> {
    pub output: &'a RobotsOutput,
}

/// Trait for generator backends.
///
/// Every backend implements all three output types so the orchestrator is
/// backend-agnostic.
pub trait Backend {
    /// Version recorded in lock entries and mixed into fingerprints.
    fn version(&self) -> &str {
        GENERATOR_VERSION
    }

    fn og_image(&self, ctx: &OgImageContext<'_>, dest: &Path) -> Result<(), GenerateError>;

    fn sitemap(&self, ctx: &SitemapContext<'_>, dest: &Path) -> Result<(), GenerateError>;

    fn robots(&self, ctx: &RobotsContext<'_>, dest: &Path) -> Result<(), GenerateError>;
}

/// Production backend: text generators plus headless Chrome for images.
#[derive(Debug, Clone, Default)]
pub struct StandardBackend {
    og_image: OgImageConfig,
}

impl StandardBackend {
    pub fn new(og_image: OgImageConfig) -> Self {
        Self { og_image }
    }
}

impl Backend for StandardBackend {
    fn og_image(&self, ctx: &OgImageContext<'_>, dest: &Path) -> Result<(), GenerateError> {
        og_image::generate(ctx, dest, &self.og_image)
    }

    fn sitemap(&self, ctx: &SitemapContext<'_>, dest: &Path) -> Result<(), GenerateError> {
        sitemap::generate(ctx, dest)
    }

    fn robots(&self, ctx: &RobotsContext<'_>, dest: &Path) -> Result<(), GenerateError> {
        robots::generate(ctx, dest)
    }
}
