//! The specification: what to build.
//!
//! `virgil.spec.json` declares global brand/product context and an ordered
//! list of outputs. Each output carries a unique `id` and a `type` tag that
//! selects its generator:
//!
//! ```json
//! {
//!   "brand": { "name": "Acme", "logo": "logo.svg", "color": "#ff5500" },
//!   "product": { "name": "Rocket", "logo": "rocket.svg", "version": "2.1.0" },
//!   "outputs": [
//!     { "type": "og-image", "id": "home", "page": { "title": "Home", "url": "https://acme.dev" } },
//!     { "type": "sitemap", "id": "sitemap", "baseUrl": "https://acme.dev", "pages": [{ "path": "/" }] },
//!     { "type": "robots", "id": "robots", "rules": [{ "userAgent": "*", "disallow": ["/admin"] }] }
//!   ]
//! }
//! ```
//!
//! ## Validation
//!
//! The document as a whole must parse and ids must be unique; otherwise
//! [`Spec::load`] fails and the run is aborted. Individual outputs are decoded
//! separately: an output with an unknown `type`, an unknown or malformed field,
//! or an id that is not a plain file name stem becomes a
//! [`Declaration::Invalid`] at its position, so it is reported as an error for
//! that id alone while its siblings are still built.
//!
//! A valid declaration keeps the JSON object it was decoded from. That object,
//! not the typed [`Output`], is what gets fingerprinted.

use crate::manifest::Category;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SpecError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid specification: {0}")]
    Json(#[from] serde_json::Error),
    #[error("duplicate output id: {0}")]
    DuplicateId(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brand {
    pub name: String,
    pub logo: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    pub logo: String,
    pub version: String,
}

/// A well-formed output declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Output {
    #[serde(rename = "og-image")]
    OgImage(OgImageOutput),
    #[serde(rename = "sitemap")]
    Sitemap(SitemapOutput),
    #[serde(rename = "robots")]
    Robots(RobotsOutput),
}

impl Output {
    pub const TYPES: [&'static str; 3] = ["og-image", "sitemap", "robots"];

    pub fn id(&self) -> &str {
        match self {
            Output::OgImage(o) => &o.id,
            Output::Sitemap(o) => &o.id,
            Output::Robots(o) => &o.id,
        }
    }

    /// The `type` tag, which doubles as the generator name.
    pub fn generator_name(&self) -> &'static str {
        match self {
            Output::OgImage(_) => "og-image",
            Output::Sitemap(_) => "sitemap",
            Output::Robots(_) => "robots",
        }
    }

    pub fn category(&self) -> Category {
        match self {
            Output::OgImage(_) => Category::Og,
            Output::Sitemap(_) => Category::Sitemap,
            Output::Robots(_) => Category::Robots,
        }
    }

    /// Template path relative to the project root, if the output has one.
    pub fn template(&self) -> Option<&str> {
        match self {
            Output::OgImage(o) => o.template.as_deref(),
            Output::Sitemap(_) | Output::Robots(_) => None,
        }
    }
}

/// Social preview image for one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OgImageOutput {
    pub id: String,
    pub page: OgPage,
    /// HTML template with `{{placeholder}}` slots. The built-in card is used
    /// when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OgPage {
    pub title: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
#[serde(rename_all = "camelCase")]
pub struct SitemapOutput {
    pub id: String,
    pub base_url: String,
    pub pages: Vec<SitemapPage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SitemapPage {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lastmod: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changefreq: Option<ChangeFreq>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeFreq {
    Always,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Never,
}

impl ChangeFreq {
    pub fn as_str(self) -> &'static str {
        match self {
            ChangeFreq::Always => "always",
            ChangeFreq::Hourly => "hourly",
            ChangeFreq::Daily => "daily",
            ChangeFreq::Weekly => "weekly",
            ChangeFreq::Monthly => "monthly",
            ChangeFreq::Yearly => "yearly",
            ChangeFreq::Never => "never",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RobotsOutput {
    pub id: String,
    pub rules: Vec<RobotsRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sitemap: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
#[serde(rename_all = "camelCase")]
pub struct RobotsRule {
    pub user_agent: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allow: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub disallow: Vec<String>,
}

/// One entry of `outputs`, decoded independently of its siblings.
#[derive(Debug, Clone, PartialEq)]
pub enum Declaration {
    Valid {
        output: Output,
        /// The entry exactly as written in the specification.
        source: Value,
    },
    /// Unknown `type`, unknown or malformed fields, or an id that is not a
    /// single path component. `id` falls back to `outputs[<index>]` when the
    /// entry has no string id.
    Invalid { id: String, reason: String },
}

impl Declaration {
    fn decode(index: usize, value: Value) -> Self {
        let id = value
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .unwrap_or_else(|| format!("outputs[{index}]"));

        if let Err(reason) = check_id(&id) {
            return Declaration::Invalid { id, reason };
        }

        match value.get("type") {
            Some(Value::String(kind)) if !Output::TYPES.iter().any(|t| *t == kind.as_str()) => {
                return Declaration::Invalid {
                    id,
                    reason: format!("unknown output type: {kind}"),
                };
            }
            None => {
                return Declaration::Invalid {
                    id,
                    reason: "missing output type".to_string(),
                };
            }
            _ => {}
        }

        let decoded = Output::deserialize(&value);
        match decoded {
            Ok(output) => Declaration::Valid {
                output,
                source: value,
            },
            Err(e) => Declaration::Invalid {
                id,
                reason: e.to_string(),
            },
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Declaration::Valid { output, .. } => output.id(),
            Declaration::Invalid { id, .. } => id,
        }
    }
}

/// Ids name artifacts on disk (`og/<id>.<hash>.png`), so they must stay a
/// single path component.
fn check_id(id: &str) -> Result<(), String> {
    if id.is_empty() || id == "." || id == ".." || id.contains(['/', '\\']) {
        return Err(format!("invalid output id: {id:?}"));
    }
    Ok(())
}

#[derive(Deserialize)]
struct RawSpec {
    brand: Brand,
    product: Product,
    outputs: Vec<Value>,
}

/// A parsed specification. Read-only for the duration of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct Spec {
    pub brand: Brand,
    pub product: Product,
    pub outputs: Vec<Declaration>,
}

impl Spec {
    pub fn load(path: &Path) -> Result<Self, SpecError> {
        let content = fs::read_to_string(path).map_err(|source| SpecError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, SpecError> {
        let raw: RawSpec = serde_json::from_str(content)?;
        let spec = Spec {
            brand: raw.brand,
            product: raw.product,
            outputs: raw
                .outputs
                .into_iter()
                .enumerate()
                .map(|(i, value)| Declaration::decode(i, value))
                .collect(),
        };
        spec.validate()?;
        Ok(spec)
    }

    fn validate(&self) -> Result<(), SpecError> {
        let mut seen = HashSet::new();
        for declaration in &self.outputs {
            if !seen.insert(declaration.id()) {
                return Err(SpecError::DuplicateId(declaration.id().to_string()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SPEC: &str = r##"{
        "brand": { "name": "Acme", "logo": "logo.svg", "color": "#ff5500" },
        "product": { "name": "Rocket", "logo": "rocket.svg", "version": "2.1.0" },
        "outputs": [
            {
                "type": "og-image",
                "id": "home",
                "page": { "title": "Home", "url": "https://acme.dev", "description": "Fast" },
                "template": "templates/card.html"
            },
            {
                "type": "sitemap",
                "id": "sitemap",
                "baseUrl": "https://acme.dev",
                "pages": [
                    { "path": "/" },
                    { "path": "/docs", "lastmod": "2026-01-02", "changefreq": "weekly", "priority": 0.8 }
                ]
            },
            {
                "type": "robots",
                "id": "robots",
                "rules": [{ "userAgent": "*", "allow": ["/"], "disallow": ["/admin"] }],
                "sitemap": "https://acme.dev/sitemap.xml"
            }
        ]
    }"##;

    fn valid(declaration: &Declaration) -> &Output {
        match declaration {
            Declaration::Valid { output, .. } => output,
            Declaration::Invalid { id, reason } => panic!("{id} invalid: {reason}"),
        }
    }

    #[test]
    fn parses_all_output_types_in_order() {
        let spec = Spec::from_json(SPEC).unwrap();
        assert_eq!(spec.brand.name, "Acme");
        assert_eq!(spec.product.version, "2.1.0");

        let ids: Vec<&str> = spec.outputs.iter().map(Declaration::id).collect();
        assert_eq!(ids, ["home", "sitemap", "robots"]);

        let kinds: Vec<&str> = spec
            .outputs
            .iter()
            .map(|d| valid(d).generator_name())
            .collect();
        assert_eq!(kinds, ["og-image", "sitemap", "robots"]);
    }

    #[test]
    fn parses_type_specific_fields() {
        let spec = Spec::from_json(SPEC).unwrap();

        let Output::OgImage(og) = valid(&spec.outputs[0]) else {
            panic!("expected og-image");
        };
        assert_eq!(og.page.description.as_deref(), Some("Fast"));
        assert_eq!(og.template.as_deref(), Some("templates/card.html"));

        let Output::Sitemap(sitemap) = valid(&spec.outputs[1]) else {
            panic!("expected sitemap");
        };
        assert_eq!(sitemap.base_url, "https://acme.dev");
        assert_eq!(sitemap.pages[1].changefreq, Some(ChangeFreq::Weekly));
        assert_eq!(sitemap.pages[1].priority, Some(0.8));

        let Output::Robots(robots) = valid(&spec.outputs[2]) else {
            panic!("expected robots");
        };
        assert_eq!(robots.rules[0].user_agent, "*");
        assert_eq!(robots.rules[0].disallow, ["/admin"]);
    }

    #[test]
    fn output_serializes_with_type_tag() {
        let spec = Spec::from_json(SPEC).unwrap();
        let value = serde_json::to_value(valid(&spec.outputs[2])).unwrap();
        assert_eq!(value["type"], "robots");
        assert_eq!(value["id"], "robots");
        assert_eq!(value["rules"][0]["userAgent"], "*");
    }

    #[test]
    fn template_only_for_og_image() {
        let spec = Spec::from_json(SPEC).unwrap();
        assert_eq!(valid(&spec.outputs[0]).template(), Some("templates/card.html"));
        assert_eq!(valid(&spec.outputs[1]).template(), None);
    }

    #[test]
    fn unknown_type_is_invalid_declaration() {
        let json = r##"{
            "brand": { "name": "A", "logo": "", "color": "#000" },
            "product": { "name": "P", "logo": "", "version": "1" },
            "outputs": [
                { "type": "robots", "id": "r", "rules": [] },
                { "type": "favicon", "id": "icon" }
            ]
        }"##;
        let spec = Spec::from_json(json).unwrap();
        assert!(matches!(spec.outputs[0], Declaration::Valid { .. }));
        assert_eq!(
            spec.outputs[1],
            Declaration::Invalid {
                id: "icon".into(),
                reason: "unknown output type: favicon".into()
            }
        );
    }

    #[test]
    fn malformed_fields_are_invalid_declaration() {
        let json = r##"{
            "brand": { "name": "A", "logo": "", "color": "#000" },
            "product": { "name": "P", "logo": "", "version": "1" },
            "outputs": [ { "type": "sitemap", "id": "s", "pages": [] } ]
        }"##;
        let spec = Spec::from_json(json).unwrap();
        match &spec.outputs[0] {
            Declaration::Invalid { id, reason } => {
                assert_eq!(id, "s");
                assert!(reason.contains("baseUrl"), "{reason}");
            }
            other => panic!("expected invalid, got {other:?}"),
        }
    }

    #[test]
    fn missing_id_uses_position() {
        let json = r##"{
            "brand": { "name": "A", "logo": "", "color": "#000" },
            "product": { "name": "P", "logo": "", "version": "1" },
            "outputs": [ { "type": "robots", "rules": [] } ]
        }"##;
        let spec = Spec::from_json(json).unwrap();
        assert_eq!(spec.outputs[0].id(), "outputs[0]");
        assert!(matches!(spec.outputs[0], Declaration::Invalid { .. }));
    }

    #[test]
    fn missing_type_is_invalid_declaration() {
        let json = r##"{
            "brand": { "name": "A", "logo": "", "color": "#000" },
            "product": { "name": "P", "logo": "", "version": "1" },
            "outputs": [ { "id": "r", "rules": [] } ]
        }"##;
        let spec = Spec::from_json(json).unwrap();
        assert!(matches!(&spec.outputs[0], Declaration::Invalid { reason, .. } if reason == "missing output type"));
    }

    #[test]
    fn unknown_field_is_invalid_declaration() {
        let json = r##"{
            "brand": { "name": "A", "logo": "", "color": "#000" },
            "product": { "name": "P", "logo": "", "version": "1" },
            "outputs": [
                { "type": "robots", "id": "r", "rules": [], "disalow": ["/secret"] },
                { "type": "robots", "id": "s", "rules": [{ "userAgent": "*", "disalow": ["/x"] }] }
            ]
        }"##;
        let spec = Spec::from_json(json).unwrap();
        for declaration in &spec.outputs {
            match declaration {
                Declaration::Invalid { reason, .. } => assert!(reason.contains("disalow"), "{reason}"),
                other => panic!("expected invalid, got {other:?}"),
            }
        }
    }

    #[test]
    fn id_must_be_a_single_path_component() {
        for bad in ["../x", "a/b", "a\\b", "..", ""] {
            let json = format!(
                r##"{{
                    "brand": {{ "name": "A", "logo": "", "color": "#000" }},
                    "product": {{ "name": "P", "logo": "", "version": "1" }},
                    "outputs": [ {{ "type": "robots", "id": {}, "rules": [] }} ]
                }}"##,
                serde_json::to_string(bad).unwrap()
            );
            let spec = Spec::from_json(&json).unwrap();
            assert!(
                matches!(&spec.outputs[0], Declaration::Invalid { reason, .. } if reason.starts_with("invalid output id")),
                "{bad:?} accepted"
            );
        }
    }

    #[test]
    fn valid_declaration_keeps_its_source() {
        let spec = Spec::from_json(SPEC).unwrap();
        let Declaration::Valid { source, .. } = &spec.outputs[2] else {
            panic!("expected valid");
        };
        assert_eq!(source["type"], "robots");
        assert_eq!(source["rules"][0]["allow"][0], "/");
        assert_eq!(source["sitemap"], "https://acme.dev/sitemap.xml");
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let json = r##"{
            "brand": { "name": "A", "logo": "", "color": "#000" },
            "product": { "name": "P", "logo": "", "version": "1" },
            "outputs": [
                { "type": "robots", "id": "r", "rules": [] },
                { "type": "robots", "id": "r", "rules": [] }
            ]
        }"##;
        assert!(matches!(
            Spec::from_json(json),
            Err(SpecError::DuplicateId(id)) if id == "r"
        ));
    }

    #[test]
    fn missing_top_level_field_is_error() {
        let json = r#"{ "outputs": [] }"#;
        assert!(matches!(Spec::from_json(json), Err(SpecError::Json(_))));
    }

    #[test]
    fn load_missing_file_is_read_error() {
        let tmp = TempDir::new().unwrap();
        let result = Spec::load(&tmp.path().join("virgil.spec.json"));
        assert!(matches!(result, Err(SpecError::Read { .. })));
    }

    #[test]
    fn load_reads_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("virgil.spec.json");
        fs::write(&path, SPEC).unwrap();
        assert_eq!(Spec::load(&path).unwrap().outputs.len(), 3);
    }
}
