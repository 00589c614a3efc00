//! Normalized catalog entry, the single shape every provider maps into

use chrono::Datelike;
use lazy_static::lazy_static;
use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Title fallback for records that carry none.
pub const UNTITLED: &str = "Untitled";

/// Author fallback for records that carry none.
pub const UNKNOWN_AUTHOR: &str = "Unknown Author";

/// Substitute cover image for records without a usable provider image.
pub const PLACEHOLDER_COVER: &str = "https://via.placeholder.com/128x192?text=No+Cover";

/// Coarse content types the surrounding application organizes the catalog by
///
/// Providers are category-agnostic; the category comes from the caller's
/// context (which query table was used), never from provider data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    DigitalBook,
    Journal,
    TeachingModule,
    InternshipReport,
}

impl Category {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::DigitalBook => "digital-book",
            Category::Journal => "journal",
            Category::TeachingModule => "teaching-module",
            Category::InternshipReport => "internship-report",
        }
    }
}

/// A catalog entry normalized from either provider's schema
///
/// Entries are constructed fresh per call and never persisted by this layer.
/// Required fields are always populated; the `UNTITLED`, `UNKNOWN_AUTHOR`,
/// and `PLACEHOLDER_COVER` fallbacks cover records with missing data.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Opaque identifier, unique within the owning provider's namespace.
    /// Open Library records without a native key receive a synthesized id,
    /// so the same logical item can carry a different id across requests.
    pub id: String,
    pub title: String,
    pub author: String,
    /// Always an absolute image reference; never empty.
    pub cover_url: String,
    pub category: Category,
    pub year: i32,
    pub description: Option<String>,
    pub language: Option<String>,
    pub isbn: Option<String>,
    pub publisher: Option<String>,
    pub page_count: Option<u32>,
    pub preview_link: Option<String>,
    /// Synthetic popularity counter for display; not a persisted metric.
    pub views: Option<u32>,
}

lazy_static! {
    static ref YEAR: Regex = Regex::new(r"\d{4}").unwrap();
}

/// Extract a publish year from a loosely formatted date ("2005-08-12",
/// "October 1, 1988", "1988"), defaulting to the current calendar year.
pub(crate) fn year_or_current(date: Option<&str>) -> i32 {
    date.and_then(|d| YEAR.find(d))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or_else(|| chrono::Utc::now().year())
}

pub(crate) fn synthetic_views() -> u32 {
    rand::thread_rng().gen_range(40..1200)
}
