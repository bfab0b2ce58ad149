//! `robots.txt` generation.
//!
//! Each rule becomes a `User-agent` line followed by its `Allow` and then
//! `Disallow` lines and a blank separator line. An optional `Sitemap` line
//! closes the file:
//!
//! ```text
//! User-agent: *
//! Disallow: /admin
//!
//! Sitemap: https://x.com/sitemap.xml
//! ```

use super::{GenerateError, RobotsContext};
use crate::spec::RobotsOutput;
use crate::store::write_atomic;
use std::path::Path;

pub fn render(output: &RobotsOutput) -> String {
    let mut lines = Vec::new();

    for rule in &output.rules {
        lines.push(format!("User-agent: {}", rule.user_agent));
        lines.extend(rule.allow.iter().map(|path| format!("Allow: {path}")));
        lines.extend(rule.disallow.iter().map(|path| format!("Disallow: {path}")));
        lines.push(String::new());
    }

    if let Some(sitemap) = &output.sitemap {
        lines.push(format!("Sitemap: {sitemap}"));
    }

    lines.join("\n")
}

pub fn generate(ctx: &RobotsContext<'_>, dest: &Path) -> Result<(), GenerateError> {
    write_atomic(dest, render(ctx.output).as_bytes())?;
    Ok(())
}
