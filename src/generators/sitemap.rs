//! `sitemap.xml` generation.
//!
//! One `<url>` per declared page, `loc` being `baseUrl` followed by the page
//! path. Optional page fields become `lastmod`, `changefreq` and `priority`
//! elements. Text content goes through maud, so `&` and `<` in URLs are
//! escaped.

use super::{GenerateError, SitemapContext};
use crate::spec::SitemapOutput;
use crate::store::write_atomic;
use maud::{PreEscaped, html};
use std::path::Path;

pub const SITEMAP_NAMESPACE: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

pub fn render(output: &SitemapOutput) -> String {
    let markup = html! {
        (PreEscaped(XML_DECLARATION))
        "\n"
        urlset xmlns=(SITEMAP_NAMESPACE) {
            @for page in &output.pages {
                url {
                    loc { (output.base_url) (page.path) }
                    @if let Some(lastmod) = &page.lastmod {
                        lastmod { (lastmod) }
                    }
                    @if let Some(changefreq) = page.changefreq {
                        changefreq { (changefreq.as_str()) }
                    }
                    @if let Some(priority) = page.priority {
                        priority { (priority) }
                    }
                }
            }
        }
    };
    markup.into_string()
}

pub fn generate(ctx: &SitemapContext<'_>, dest: &Path) -> Result<(), GenerateError> {
    write_atomic(dest, render(ctx.output).as_bytes())?;
    Ok(())
}
