//! Shared types used across the stackprobe pipeline.
//!
//! This module defines the closed set of technology categories the report
//! tracks and the per-URL record the fingerprint client produces.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Technology categories tracked in the enrichment report.
///
/// The fingerprinting API reports far more categories than these; anything
/// whose normalized key is not listed here is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TechCategory {
    /// Blogging platforms (`WordPress`, Ghost)
    BlogCms,
    /// Shop systems (Shopify, Magento)
    EcommerceCms,
    /// Server-side languages (PHP, Ruby)
    ProgrammingLanguage,
    /// Database engines (`MySQL`, `PostgreSQL`)
    Database,
    /// Content delivery networks (Cloudflare, Fastly)
    Cdn,
    /// HTTP servers (Apache, nginx)
    WebServer,
    /// Landing page builders (Unbounce, Instapage)
    LandingPageBuilderCms,
    /// Host operating systems (Ubuntu, Windows Server)
    OperatingSystem,
    /// Application frameworks (Laravel, Django)
    WebFramework,
}

impl TechCategory {
    /// All categories in report column order.
    pub const ALL: [Self; 9] = [
        Self::BlogCms,
        Self::EcommerceCms,
        Self::ProgrammingLanguage,
        Self::Database,
        Self::Cdn,
        Self::WebServer,
        Self::LandingPageBuilderCms,
        Self::OperatingSystem,
        Self::WebFramework,
    ];

    /// Canonical key produced by [`TechCategory::normalize`].
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::BlogCms => "blog_cms",
            Self::EcommerceCms => "ecommerce_cms",
            Self::ProgrammingLanguage => "programming_language",
            Self::Database => "database",
            Self::Cdn => "cdn",
            Self::WebServer => "web_server",
            Self::LandingPageBuilderCms => "landing_page_builder_cms",
            Self::OperatingSystem => "operating_system",
            Self::WebFramework => "web_framework",
        }
    }

    /// Column header used for this category in the output report.
    #[must_use]
    pub fn column(self) -> &'static str {
        match self {
            Self::BlogCms => "Blog_CMS",
            Self::EcommerceCms => "E-commerce_CMS",
            Self::ProgrammingLanguage => "Programming_Language",
            Self::Database => "Database",
            Self::Cdn => "CDN",
            Self::WebServer => "Web_Server",
            Self::LandingPageBuilderCms => "Landing_Page_Builder_CMS",
            Self::OperatingSystem => "Operating_System",
            Self::WebFramework => "Web_Framework",
        }
    }

    /// Canonicalize raw API category labels into a lookup key.
    ///
    /// Labels are joined with underscores, lowercased, stripped of hyphens,
    /// and spaces become underscores: `["E-commerce", "CMS"]` becomes
    /// `ecommerce_cms`.
    #[must_use]
    pub fn normalize<S: AsRef<str>>(labels: &[S]) -> String {
        labels
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join("_")
            .to_lowercase()
            .replace('-', "")
            .replace(' ', "_")
    }

    /// Look up a category by its canonical key.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|category| category.key() == key)
    }

    /// Route raw API labels to a category, or `None` when untracked.
    #[must_use]
    pub fn from_labels<S: AsRef<str>>(labels: &[S]) -> Option<Self> {
        Self::from_key(&Self::normalize(labels))
    }
}

impl fmt::Display for TechCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Technology fingerprint for a single queried URL.
///
/// A record is created fresh for every fetch. Technology lists keep the
/// order in which the API reported them and are never deduplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechnologyRecord {
    url: String,
    /// Reference link returned by the API. `None` when the query never
    /// completed or the payload carried no `request` field.
    pub lookup_link: Option<String>,
    /// Blog CMS technologies
    pub blog_cms: Vec<String>,
    /// E-commerce CMS technologies
    pub ecommerce_cms: Vec<String>,
    /// Programming languages
    pub programming_language: Vec<String>,
    /// Databases
    pub database: Vec<String>,
    /// CDNs
    pub cdn: Vec<String>,
    /// Web servers
    pub web_server: Vec<String>,
    /// Landing page builder CMS technologies
    pub landing_page_builder_cms: Vec<String>,
    /// Operating systems
    pub operating_system: Vec<String>,
    /// Web frameworks
    pub web_framework: Vec<String>,
    /// Outcome of the lookup: `"<code> - <msg>"`, `"Error: ..."` or `"Parse error: ..."`
    pub status_note: String,
}

impl TechnologyRecord {
    /// Create an empty record for `url`.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Create a record for a lookup that failed before any payload was read.
    #[must_use]
    pub fn failed(url: impl Into<String>, status_note: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status_note: status_note.into(),
            ..Self::default()
        }
    }

    /// The URL this record describes.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Technologies recorded under `category`.
    #[must_use]
    pub fn technologies(&self, category: TechCategory) -> &[String] {
        match category {
            TechCategory::BlogCms => &self.blog_cms,
            TechCategory::EcommerceCms => &self.ecommerce_cms,
            TechCategory::ProgrammingLanguage => &self.programming_language,
            TechCategory::Database => &self.database,
            TechCategory::Cdn => &self.cdn,
            TechCategory::WebServer => &self.web_server,
            TechCategory::LandingPageBuilderCms => &self.landing_page_builder_cms,
            TechCategory::OperatingSystem => &self.operating_system,
            TechCategory::WebFramework => &self.web_framework,
        }
    }

    fn technologies_mut(&mut self, category: TechCategory) -> &mut Vec<String> {
        match category {
            TechCategory::BlogCms => &mut self.blog_cms,
            TechCategory::EcommerceCms => &mut self.ecommerce_cms,
            TechCategory::ProgrammingLanguage => &mut self.programming_language,
            TechCategory::Database => &mut self.database,
            TechCategory::Cdn => &mut self.cdn,
            TechCategory::WebServer => &mut self.web_server,
            TechCategory::LandingPageBuilderCms => &mut self.landing_page_builder_cms,
            TechCategory::OperatingSystem => &mut self.operating_system,
            TechCategory::WebFramework => &mut self.web_framework,
        }
    }

    /// Append a technology to `category`, after any already recorded.
    pub fn push(&mut self, category: TechCategory, technology: impl Into<String>) {
        self.technologies_mut(category).push(technology.into());
    }

    /// Total number of technologies across all categories.
    #[must_use]
    pub fn technology_count(&self) -> usize {
        TechCategory::ALL
            .into_iter()
            .map(|category| self.technologies(category).len())
            .sum()
    }
}
