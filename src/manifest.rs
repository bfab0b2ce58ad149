//! The manifest store: where each output was published.
//!
//! The manifest is the public record of "what was produced and where",
//! grouped by category and keyed by output id:
//!
//! ```json
//! {
//!   "version": "0.1",
//!   "og": { "home": "/og/home.3f2a9c1b04de.png" },
//!   "sitemap": { "sitemap": "/sitemap.xml" },
//!   "robots": { "robots": "/robots.txt" }
//! }
//! ```
//!
//! It carries no staleness logic. Entries are written whenever an output is
//! (re)generated and left alone when an output is skipped, since the file on
//! disk is unchanged in that case.

use crate::store::StoreDocument;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub const MANIFEST_VERSION: &str = "0.1";

/// Output category, one per manifest section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Og,
    Sitemap,
    Robots,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Og, Category::Sitemap, Category::Robots];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Og => "og",
            Category::Sitemap => "sitemap",
            Category::Robots => "robots",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub version: String,
    #[serde(default)]
    pub og: BTreeMap<String, String>,
    #[serde(default)]
    pub sitemap: BTreeMap<String, String>,
    #[serde(default)]
    pub robots: BTreeMap<String, String>,
}

impl Manifest {
    pub fn empty() -> Self {
        Self {
            version: MANIFEST_VERSION.to_string(),
            og: BTreeMap::new(),
            sitemap: BTreeMap::new(),
            robots: BTreeMap::new(),
        }
    }

    pub fn entries(&self, category: Category) -> &BTreeMap<String, String> {
        match category {
            Category::Og => &self.og,
            Category::Sitemap => &self.sitemap,
            Category::Robots => &self.robots,
        }
    }

    fn entries_mut(&mut self, category: Category) -> &mut BTreeMap<String, String> {
        match category {
            Category::Og => &mut self.og,
            Category::Sitemap => &mut self.sitemap,
            Category::Robots => &mut self.robots,
        }
    }

    pub fn get(&self, category: Category, id: &str) -> Option<&str> {
        self.entries(category).get(id).map(String::as_str)
    }

    /// Set the public path for `id`, replacing any previous value.
    pub fn update_entry(&mut self, category: Category, id: &str, public_path: &str) {
        self.entries_mut(category)
            .insert(id.to_string(), public_path.to_string());
    }

    pub fn len(&self) -> usize {
        Category::ALL.iter().map(|c| self.entries(*c).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl StoreDocument for Manifest {
    const KIND: &'static str = "manifest";
    const VERSION: &'static str = MANIFEST_VERSION;

    fn fresh() -> Self {
        Self::empty()
    }

    fn version(&self) -> &str {
        &self.version
    }
}
