//! Social preview (Open Graph) image generation.
//!
//! ## Pipeline
//!
//! 1. Build the card HTML: either the declaration's template with its
//!    `{{...}}` placeholders filled in, or the built-in maud card.
//! 2. Write the HTML to a temp file and load it in headless Chrome with the
//!    window sized to the configured viewport.
//! 3. Capture a PNG screenshot and normalize it to exactly `width x height`
//!    (the captured surface can differ by a few pixels from the window size).
//! 4. Write the PNG atomically to the destination.
//!
//! Every browser call is bounded by `og_image.timeout_secs`, so a page that
//! never finishes loading fails this output instead of stalling the run.
//!
//! ## Template placeholders
//!
//! | Placeholder | Value |
//! |---|---|
//! | `{{brand.name}}` | `brand.name` |
//! | `{{brand.color}}` | `brand.color` |
//! | `{{product.name}}` | `product.name` |
//! | `{{product.version}}` | `product.version` |
//! | `{{page.title}}` | `page.title` |
//! | `{{page.url}}` | `page.url` |
//! | `{{page.description}}` | `page.description`, empty when absent |
//!
//! Values are HTML-escaped before substitution.

use super::{GenerateError, OgImageContext};
use crate::config::OgImageConfig;
use crate::hash::Fingerprint;
use crate::store::write_atomic;
use headless_chrome::protocol::cdp::Page::CaptureScreenshotFormatOption;
use headless_chrome::{Browser, LaunchOptions};
use image::ImageFormat;
use image::imageops::FilterType;
use maud::{DOCTYPE, Markup, html};
use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;
use std::time::{Duration, Instant};

/// Number of fingerprint hex characters in the artifact file name.
const NAME_HASH_LEN: usize = 12;

/// Artifact file name: `<id>.<first 12 hex chars of fingerprint>.png`.
///
/// A changed declaration yields a new name, so CDN caches never serve a
/// stale card. The same declaration always maps to the same name.
pub fn file_name(id: &str, fingerprint: &Fingerprint) -> String {
    let hex = fingerprint.hex();
    let short = &hex[..hex.len().min(NAME_HASH_LEN)];
    format!("{id}.{short}.png")
}

/// Build the card HTML for one declaration.
pub fn render_html(ctx: &OgImageContext<'_>) -> Result<String, GenerateError> {
    match ctx.template_path {
        Some(path) => {
            let template =
                fs::read_to_string(path).map_err(|source| GenerateError::Template {
                    path: path.to_path_buf(),
                    source,
                })?;
            Ok(fill_template(&template, ctx))
        }
        None => Ok(default_card(ctx).into_string()),
    }
}

/// Substitute every placeholder with its HTML-escaped value.
pub fn fill_template(template: &str, ctx: &OgImageContext<'_>) -> String {
    let page = &ctx.output.page;
    let values = [
        ("{{brand.name}}", ctx.brand.name.as_str()),
        ("{{brand.color}}", ctx.brand.color.as_str()),
        ("{{product.name}}", ctx.product.name.as_str()),
        ("{{product.version}}", ctx.product.version.as_str()),
        ("{{page.title}}", page.title.as_str()),
        ("{{page.url}}", page.url.as_str()),
        ("{{page.description}}", page.description.as_deref().unwrap_or("")),
    ];

    values
        .iter()
        .fold(template.to_string(), |html, (placeholder, value)| {
            html.replace(placeholder, &escape(value))
        })
}

fn escape(value: &str) -> String {
    html! { (value) }.into_string()
}

fn default_card(ctx: &OgImageContext<'_>) -> Markup {
    let page = &ctx.output.page;
    let css = format!(
        "html,body{{margin:0;width:100%;height:100%}}\
         body{{display:flex;flex-direction:column;justify-content:space-between;\
         box-sizing:border-box;padding:72px 80px;background:{color};color:#fff;\
         font-family:system-ui,-apple-system,'Segoe UI',sans-serif}}\
         .brand{{font-size:28px;font-weight:600;opacity:.85}}\
         h1{{margin:0;font-size:64px;line-height:1.1}}\
         p{{margin:24px 0 0;font-size:30px;opacity:.85}}\
         footer{{display:flex;justify-content:space-between;font-size:24px;opacity:.7}}",
        color = ctx.brand.color
    );

    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                title { (page.title) }
                style { (maud::PreEscaped(css)) }
            }
            body {
                div.brand { (ctx.brand.name) }
                main {
                    h1 { (page.title) }
                    @if let Some(description) = &page.description {
                        p { (description) }
                    }
                }
                footer {
                    span { (page.url) }
                    span { (ctx.product.name) " " (ctx.product.version) }
                }
            }
        }
    }
}

/// Render the card and write it to `dest` as a PNG of the configured size.
pub fn generate(
    ctx: &OgImageContext<'_>,
    dest: &Path,
    config: &OgImageConfig,
) -> Result<(), GenerateError> {
    let html = render_html(ctx)?;

    let started = Instant::now();
    let screenshot = screenshot(&html, config)?;
    tracing::debug!(
        id = %ctx.output.id,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "captured og-image screenshot"
    );

    let png = normalize_png(&screenshot, config.width, config.height)?;
    write_atomic(dest, &png)?;
    Ok(())
}

fn browser_error(err: impl std::fmt::Display) -> GenerateError {
    GenerateError::Browser(err.to_string())
}

/// Load `html` in a fresh headless Chrome and capture the viewport as PNG.
fn screenshot(html: &str, config: &OgImageConfig) -> Result<Vec<u8>, GenerateError> {
    let timeout = Duration::from_secs(config.timeout_secs);

    let mut page = tempfile::Builder::new()
        .prefix(".virgil-og-")
        .suffix(".html")
        .tempfile()?;
    page.write_all(html.as_bytes())?;
    page.flush()?;

    let browser = Browser::new(LaunchOptions {
        window_size: Some((config.width, config.height)),
        idle_browser_timeout: timeout,
        ..Default::default()
    })
    .map_err(browser_error)?;

    let tab = browser.new_tab().map_err(browser_error)?;
    tab.set_default_timeout(timeout);
    tab.navigate_to(&format!("file://{}", page.path().display()))
        .map_err(browser_error)?
        .wait_until_navigated()
        .map_err(browser_error)?;

    tab.capture_screenshot(CaptureScreenshotFormatOption::Png, None, None, true)
        .map_err(browser_error)
}

/// Decode a PNG and re-encode it at exactly `width x height`.
pub fn normalize_png(bytes: &[u8], width: u32, height: u32) -> Result<Vec<u8>, GenerateError> {
    let img = image::load_from_memory_with_format(bytes, ImageFormat::Png)?;
    let img = if img.width() == width && img.height() == height {
        img
    } else {
        img.resize_exact(width, height, FilterType::Lanczos3)
    };

    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png)?;
    Ok(out.into_inner())
}
