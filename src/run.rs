//! Build orchestration.
//!
//! One run walks the specification in declaration order:
//!
//! ```text
//! load spec ──▶ load lock + manifest ──▶ for each declaration:
//!                                           fingerprint
//!                                           ├─ unchanged ─▶ skip
//!                                           └─ stale ─────▶ generate ─▶ update manifest + lock
//!                                        ──▶ save manifest ──▶ save lock
//! ```
//!
//! ## Error handling
//!
//! - A specification that is missing, malformed, or has duplicate ids is
//!   fatal: the result holds a single `Fatal: <message>` error and nothing
//!   is written.
//! - Anything that goes wrong with one declaration (invalid declaration,
//!   missing template, generator failure) is recorded as `<id>: <message>`
//!   and the loop moves on. The failed declaration keeps its previous lock
//!   entry, so the next run retries it.
//! - Manifest and lock are saved once each at the end, even when some
//!   declarations failed. The manifest goes first: if the run dies between
//!   the two saves, the old lock makes the next run regenerate instead of
//!   skipping outputs whose paths were never recorded. A save failure is the
//!   only `Err` a run returns.
//!
//! Progress is reported as [`RunEvent`]s over an optional channel, in
//! declaration order. The CLI prints them; tests collect them.

use crate::config::ProjectConfig;
use crate::generators::{
    Backend, GenerateError, OgImageContext, RobotsContext, SitemapContext, StandardBackend,
    og_image,
};
use crate::hash::{Fingerprint, HashError, compute_fingerprint};
use crate::lock::Lock;
use crate::manifest::Manifest;
use crate::output;
use crate::paths::ProjectPaths;
use crate::spec::{Declaration, Output, Spec, SpecError};
use crate::store::{StoreDocument, StoreError};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::time::Instant;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RunError {
    #[error("failed to save lock {}: {source}", path.display())]
    SaveLock {
        path: PathBuf,
        #[source]
        source: StoreError,
    },
    #[error("failed to save manifest {}: {source}", path.display())]
    SaveManifest {
        path: PathBuf,
        #[source]
        source: StoreError,
    },
}

/// Failure of a single declaration. Recorded, never propagated.
#[derive(Error, Debug)]
pub enum OutputError {
    #[error(transparent)]
    Hash(#[from] HashError),
    #[error(transparent)]
    Generate(#[from] GenerateError),
    #[error("{0}")]
    Invalid(String),
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub root_dir: PathBuf,
    /// Directory that receives `og/`, `sitemap.xml` and `robots.txt`.
    pub output_dir: PathBuf,
    pub verbose: bool,
    pub config: ProjectConfig,
}

impl RunOptions {
    /// Options for `root` with the output directory taken from `config`.
    pub fn new(root: &Path, config: ProjectConfig) -> Self {
        let paths = ProjectPaths::new(root, &config.paths);
        Self {
            root_dir: paths.root,
            output_dir: paths.output,
            verbose: false,
            config,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunResult {
    pub generated: usize,
    pub skipped: usize,
    /// `Fatal: <message>` or `<id>: <message>`, in declaration order.
    pub errors: Vec<String>,
}

impl RunResult {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Progress notification, sent in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent {
    /// Specification parsed.
    Loaded { outputs: usize },
    /// Fingerprint matched the lock; nothing touched.
    Skipped { id: String },
    Generated {
        id: String,
        generator: &'static str,
        public_path: String,
    },
    Failed { id: String, message: String },
}

enum Outcome {
    Skipped,
    Generated {
        generator: &'static str,
        public_path: String,
    },
}

/// Run a build with the production backend.
///
/// With `verbose`, progress events are printed as they happen.
pub fn run(options: &RunOptions) -> Result<RunResult, RunError> {
    let backend = StandardBackend::new(options.config.og_image.clone());

    if !options.verbose {
        return run_with_backend(options, &backend, None);
    }

    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            output::print_run_event(&event);
        }
    });
    let result = run_with_backend(options, &backend, Some(tx));
    if printer.join().is_err() {
        tracing::warn!("progress printer thread panicked");
    }
    result
}

/// Run a build with a specific backend (allows testing with mock).
pub fn run_with_backend(
    options: &RunOptions,
    backend: &impl Backend,
    progress: Option<Sender<RunEvent>>,
) -> Result<RunResult, RunError> {
    let paths = ProjectPaths::new(&options.root_dir, &options.config.paths);
    let mut result = RunResult::default();

    let spec = match Spec::load(&paths.spec) {
        Ok(spec) => spec,
        Err(e) => {
            result.errors.push(format!("Fatal: {e}"));
            return Ok(result);
        }
    };
    emit(&progress, || RunEvent::Loaded {
        outputs: spec.outputs.len(),
    });

    let mut lock = Lock::load_or_fresh(&paths.lock);
    let mut manifest = Manifest::load_or_fresh(&paths.manifest);

    for declaration in &spec.outputs {
        let id = declaration.id();
        let outcome = match declaration {
            Declaration::Valid { output, source } => process_output(
                &spec,
                output,
                source,
                &paths,
                &options.output_dir,
                backend,
                &mut lock,
                &mut manifest,
            ),
            Declaration::Invalid { reason, .. } => Err(OutputError::Invalid(reason.clone())),
        };

        match outcome {
            Ok(Outcome::Skipped) => {
                result.skipped += 1;
                emit(&progress, || RunEvent::Skipped { id: id.to_string() });
            }
            Ok(Outcome::Generated {
                generator,
                public_path,
            }) => {
                result.generated += 1;
                emit(&progress, || RunEvent::Generated {
                    id: id.to_string(),
                    generator,
                    public_path,
                });
            }
            Err(e) => {
                let message = e.to_string();
                tracing::debug!(id, error = %message, "output failed");
                result.errors.push(format!("{id}: {message}"));
                emit(&progress, || RunEvent::Failed {
                    id: id.to_string(),
                    message,
                });
            }
        }
    }

    manifest
        .save(&paths.manifest)
        .map_err(|source| RunError::SaveManifest {
            path: paths.manifest.clone(),
            source,
        })?;
    lock.save(&paths.lock).map_err(|source| RunError::SaveLock {
        path: paths.lock.clone(),
        source,
    })?;

    Ok(result)
}

fn emit(progress: &Option<Sender<RunEvent>>, event: impl FnOnce() -> RunEvent) {
    if let Some(tx) = progress {
        // A dropped receiver only means nobody is listening.
        tx.send(event()).ok();
    }
}

/// Fingerprint of a declaration as written, plus its generator and template.
fn fingerprint(
    output: &Output,
    source: &Value,
    paths: &ProjectPaths,
    generator_version: &str,
) -> Result<Fingerprint, HashError> {
    let template = output.template().map(|t| paths.resolve(t));
    compute_fingerprint(
        source,
        output.generator_name(),
        generator_version,
        template.as_deref(),
    )
}

fn process_output(
    spec: &Spec,
    output: &Output,
    source: &Value,
    paths: &ProjectPaths,
    output_dir: &Path,
    backend: &impl Backend,
    lock: &mut Lock,
    manifest: &mut Manifest,
) -> Result<Outcome, OutputError> {
    let fingerprint = fingerprint(output, source, paths, backend.version())?;
    if !lock.needs_regeneration(output.id(), &fingerprint) {
        return Ok(Outcome::Skipped);
    }

    let started = Instant::now();
    let public_path = match output {
        Output::OgImage(og) => {
            let file = og_image::file_name(&og.id, &fingerprint);
            let template = og.template.as_ref().map(|t| paths.resolve(t));
            let ctx = OgImageContext {
                brand: &spec.brand,
                product: &spec.product,
                output: og,
                template_path: template.as_deref(),
            };
            backend.og_image(&ctx, &output_dir.join("og").join(&file))?;
            format!("/og/{file}")
        }
        Output::Sitemap(sitemap) => {
            backend.sitemap(
                &SitemapContext { output: sitemap },
                &output_dir.join("sitemap.xml"),
            )?;
            "/sitemap.xml".to_string()
        }
        Output::Robots(robots) => {
            backend.robots(
                &RobotsContext { output: robots },
                &output_dir.join("robots.txt"),
            )?;
            "/robots.txt".to_string()
        }
    };
    tracing::debug!(
        id = output.id(),
        generator = output.generator_name(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "generated"
    );

    manifest.update_entry(output.category(), output.id(), &public_path);
    lock.update_entry(
        output.id(),
        fingerprint,
        output.generator_name(),
        backend.version(),
    );

    Ok(Outcome::Generated {
        generator: output.generator_name(),
        public_path,
    })
}

/// Freshness of one declaration against the current lock.
#[derive(Debug, Clone, PartialEq)]
pub enum PlanStatus {
    Fresh,
    Stale,
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlanItem {
    pub id: String,
    pub status: PlanStatus,
}

/// Report what a build would do without generating or writing anything.
pub fn plan(options: &RunOptions, generator_version: &str) -> Result<Vec<PlanItem>, SpecError> {
    let paths = ProjectPaths::new(&options.root_dir, &options.config.paths);
    let spec = Spec::load(&paths.spec)?;
    let lock = Lock::load_or_fresh(&paths.lock);

    let items = spec
        .outputs
        .iter()
        .map(|declaration| {
            let status = match declaration {
                Declaration::Valid { output, source } => {
                    match fingerprint(output, source, &paths, generator_version) {
                        Ok(fp) if lock.needs_regeneration(output.id(), &fp) => PlanStatus::Stale,
                        Ok(_) => PlanStatus::Fresh,
                        Err(e) => PlanStatus::Invalid(e.to_string()),
                    }
                }
                Declaration::Invalid { reason, .. } => PlanStatus::Invalid(reason.clone()),
            };
            PlanItem {
                id: declaration.id().to_string(),
                status,
            }
        })
        .collect();

    Ok(items)
}
