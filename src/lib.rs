//! # Virgil
//!
//! An incremental build engine for site metadata artifacts: social preview
//! (Open Graph) images, `sitemap.xml`, and `robots.txt`. A project declares
//! the outputs it wants in one JSON specification; each build regenerates
//! only the declarations whose content changed since the last successful
//! build.
//!
//! # Architecture: Fingerprint, Compare, Generate
//!
//! ```text
//! virgil.spec.json ──▶ fingerprint each declaration
//!                          │
//!            virgil.lock.json says unchanged? ──▶ skip
//!                          │ no
//!                          ▼
//!                  generator ──▶ public/og/<id>.<hash>.png
//!                          │      public/sitemap.xml
//!                          │      public/robots.txt
//!                          ▼
//!          update virgil.lock.json + virgil.manifest.json
//! ```
//!
//! - The **lock** records the fingerprint each output was last built from.
//! - The **manifest** maps each output id to its public path, so templates
//!   can reference cache-busted og-image URLs.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`spec`] | Specification document: brand, product, and the tagged list of declarations |
//! | [`hash`] | Canonical JSON and SHA-256 fingerprints (`sha256:<hex>`) |
//! | [`store`] | Crash-safe JSON persistence shared by lock and manifest |
//! | [`lock`] | Per-output fingerprint record that decides what is stale |
//! | [`manifest`] | Per-category map from output id to public path |
//! | [`generators`] | The `Backend` trait and the og-image, sitemap, robots generators |
//! | [`run`] | Orchestrator: one sequential pass over the specification |
//! | [`config`] | Optional `virgil.toml`: file locations and og-image rendering settings |
//! | [`paths`] | Resolves configured file names against the project root |
//! | [`output`] | CLI output formatting for build progress, summaries, and checks |
//!
//! # Design Decisions
//!
//! ## Declaration-Scoped Fingerprints
//!
//! A fingerprint covers the declaration itself, its template file (if any),
//! the generator name, and the generator version. Brand and product details
//! are not part of it: editing the brand color does not invalidate every
//! card. Rebuild with a fresh lock to pick such changes up.
//!
//! ## Failures Stay Local
//!
//! A broken declaration never stops its siblings. Errors are collected as
//! `<id>: <message>`, the lock keeps the failed output's previous entry, and
//! the next build retries it. Only an unreadable specification aborts a run.
//!
//! ## Stores Are a Cache, Not a Source of Truth
//!
//! A missing or corrupt lock or manifest loads as empty and costs one full
//! regeneration. Saves go through a temp file and a rename, so a crash never
//! leaves a half-written store behind.
//!
//! ## Maud for Markup
//!
//! The sitemap and the built-in og-image card are rendered with
//! [Maud](https://maud.lambda.xyz/), so every interpolated value is escaped
//! at compile-time-checked call sites.

pub mod config;
pub mod generators;
pub mod hash;
pub mod lock;
pub mod manifest;
pub mod output;
pub mod paths;
pub mod run;
pub mod spec;
pub mod store;

#[cfg(test)]
pub(crate) mod test_helpers;
