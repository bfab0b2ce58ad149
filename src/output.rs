//! CLI output formatting for builds and checks.
//!
//! # Information-First Display
//!
//! Every line leads with the declaration id, the identity users wrote in
//! their specification. Generator names and public paths follow as context,
//! so the output reads as an inventory of outputs rather than of files.
//!
//! # Output Format
//!
//! ## Build (verbose progress)
//!
//! ```text
//! Loaded 4 outputs
//!     home (og-image) → /og/home.3f2a9c1b7e4d.png
//!     docs: unchanged
//!     sitemap (sitemap) → /sitemap.xml
//!     robots: FAILED
//!         IO error: permission denied
//! ```
//!
//! ## Build summary
//!
//! ```text
//! Generated 2, skipped 1, errors 1
//!
//! Errors
//!     robots: IO error: permission denied
//! ```
//!
//! ## Check
//!
//! ```text
//! home     stale
//! docs     fresh
//! icon     invalid: unknown output type: favicon
//!
//! 1 fresh, 1 stale, 1 invalid
//! ```
//!
//! # Architecture
//!
//! Each view has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::run::{PlanItem, PlanStatus, RunEvent, RunResult};

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

// ============================================================================
// Build output
// ============================================================================

/// Format a single progress event as display lines.
pub fn format_run_event(event: &RunEvent) -> Vec<String> {
    match event {
        RunEvent::Loaded { outputs } => vec![format!("Loaded {}", plural(*outputs, "output"))],
        RunEvent::Skipped { id } => vec![format!("{}{id}: unchanged", indent(1))],
        RunEvent::Generated {
            id,
            generator,
            public_path,
        } => vec![format!("{}{id} ({generator}) → {public_path}", indent(1))],
        RunEvent::Failed { id, message } => vec![
            format!("{}{id}: FAILED", indent(1)),
            format!("{}{message}", indent(2)),
        ],
    }
}

pub fn print_run_event(event: &RunEvent) {
    for line in format_run_event(event) {
        println!("{}", line);
    }
}

/// Format the end-of-build summary: counts, then every error.
pub fn format_run_summary(result: &RunResult) -> Vec<String> {
    let mut lines = vec![format!(
        "Generated {}, skipped {}, errors {}",
        result.generated,
        result.skipped,
        result.errors.len()
    )];

    if !result.errors.is_empty() {
        lines.push(String::new());
        lines.push("Errors".to_string());
        for error in &result.errors {
            lines.push(format!("{}{error}", indent(1)));
        }
    }
    lines
}

pub fn print_run_summary(result: &RunResult) {
    for line in format_run_summary(result) {
        println!("{}", line);
    }
}

// ============================================================================
// Check output
// ============================================================================

/// Format the freshness report, ids padded to a common column.
pub fn format_plan(items: &[PlanItem]) -> Vec<String> {
    if items.is_empty() {
        return vec!["No outputs declared".to_string()];
    }

    let width = items.iter().map(|item| item.id.len()).max().unwrap_or(0);
    let (mut fresh, mut stale, mut invalid) = (0, 0, 0);

    let mut lines: Vec<String> = items
        .iter()
        .map(|item| {
            let status = match &item.status {
                PlanStatus::Fresh => {
                    fresh += 1;
                    "fresh".to_string()
                }
                PlanStatus::Stale => {
                    stale += 1;
                    "stale".to_string()
                }
                PlanStatus::Invalid(reason) => {
                    invalid += 1;
                    format!("invalid: {reason}")
                }
            };
            format!("{:<width$}  {status}", item.id)
        })
        .collect();

    lines.push(String::new());
    lines.push(format!("{fresh} fresh, {stale} stale, {invalid} invalid"));
    lines
}

pub fn print_plan(items: &[PlanItem]) {
    for line in format_plan(items) {
        println!("{}", line);
    }
}
