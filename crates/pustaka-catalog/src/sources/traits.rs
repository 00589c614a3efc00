//! Common contract for catalog metadata providers

use thiserror::Error;

use crate::domain::{CatalogEntry, Category};
use crate::http::HttpError;

/// Failure inside a provider plugin
///
/// Never escapes a provider's public surface; the [`Provider`] impls catch
/// every variant and degrade to an empty result or `None`.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error(transparent)]
    Http(#[from] HttpError),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Not found")]
    NotFound,
}

/// Metadata about a provider
pub struct SourceMetadata {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub base_url: &'static str,
    pub rate_limit_per_second: f32,
    pub supports_pagination: bool,
    pub supports_language_filter: bool,
    pub requires_api_key: bool,
}

/// Sort hint passed through to providers that honor one
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Relevance,
    Newest,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Relevance => "relevance",
            SortOrder::Newest => "newest",
        }
    }
}

/// Options for a provider search call
///
/// Providers ignore the fields they cannot express: Open Library honors only
/// `limit` and `category`, Google Books honors all of them.
#[derive(Clone, Debug)]
pub struct SearchOptions {
    pub limit: u32,
    pub start_index: u32,
    pub order_by: SortOrder,
    pub language: Option<String>,
    /// Assigned to every mapped entry; providers are category-agnostic.
    pub category: Category,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            limit: 10,
            start_index: 0,
            order_by: SortOrder::Relevance,
            language: None,
            category: Category::DigitalBook,
        }
    }
}

/// Result of a provider search call
#[derive(Debug, Default)]
pub struct SearchOutcome {
    pub entries: Vec<CatalogEntry>,
    /// Provider-reported total for the query, used for pagination math.
    /// Zero when the provider degraded to an empty result.
    pub provider_total: u32,
}

/// Capability contract every provider implements
///
/// Both operations are infallible at this boundary: transport and parsing
/// failures are absorbed inside the implementation, which logs and returns
/// an empty outcome or `None`. One provider's outage must never fail the
/// aggregate operations that depend on it.
#[allow(async_fn_in_trait)]
pub trait Provider {
    async fn search(&self, query: &str, options: &SearchOptions) -> SearchOutcome;

    async fn entry_by_id(&self, id: &str) -> Option<CatalogEntry>;
}
