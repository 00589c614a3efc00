//! pustaka-catalog: external catalog aggregation and search layer for the
//! pustaka digital library
//!
//! This crate provides the unified, queryable view over the external half
//! of the catalog:
//! - Two provider plugins (Open Library, Google Books) normalizing
//!   heterogeneous schemas into one `CatalogEntry` shape
//! - Multi-provider combined search with merge and title deduplication
//! - Paginated category browsing with fallback broadening
//! - Detail lookup dispatched to the owning provider by identifier shape
//! - Best-effort corpus statistics with static fallbacks
//!
//! Provider failures never escape this layer: every operation terminates in
//! a well-formed empty, not-found, or fallback value, so browsing and
//! statistics stay available while either third-party service is degraded.

pub mod catalog;
pub mod domain;
pub mod http;
pub mod sources;

// Re-export main types for convenience
pub use catalog::{
    BrowseOptions, BrowsePage, CatalogService, CatalogStats, CombinedSearchOptions,
    NoSessionCounter, SearchPage, SearchSource, SessionCountError, SessionCounter, ALL_FILTER,
    FALLBACK_STATS,
};
pub use domain::{CatalogEntry, Category, PLACEHOLDER_COVER, UNKNOWN_AUTHOR, UNTITLED};
pub use sources::{
    GoogleBooksClient, OpenLibraryClient, Provider, SearchOptions, SearchOutcome, SortOrder,
    SourceError, SourceMetadata,
};
