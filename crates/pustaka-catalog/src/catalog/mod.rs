//! Aggregate catalog operations over the two provider plugins
//!
//! `CatalogService` is the inbound surface of the layer: combined search,
//! paginated category browsing, detail lookup, and corpus statistics. None
//! of its operations raise on provider failure; every failure mode
//! terminates in a well-formed empty, not-found, or fallback value.

mod browse;
mod detail;
mod search;
mod stats;

pub use browse::{BrowseOptions, BrowsePage, ALL_FILTER};
pub use search::{CombinedSearchOptions, SearchPage, SearchSource};
pub use stats::{CatalogStats, NoSessionCounter, SessionCountError, SessionCounter, FALLBACK_STATS};

use crate::sources::{GoogleBooksClient, OpenLibraryClient, Provider};

pub struct CatalogService<A = OpenLibraryClient, B = GoogleBooksClient, S = NoSessionCounter> {
    open_library: A,
    google_books: B,
    sessions: S,
}

impl CatalogService {
    /// Service wired to the production providers, without a live-activity
    /// collaborator.
    pub fn new() -> Self {
        Self::with_parts(
            OpenLibraryClient::new(),
            GoogleBooksClient::new(),
            NoSessionCounter,
        )
    }
}

impl Default for CatalogService {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Provider, B: Provider, S: SessionCounter> CatalogService<A, B, S> {
    /// Substitute either provider or the session counter; every aggregate
    /// operation is generic over the capability contract.
    pub fn with_parts(open_library: A, google_books: B, sessions: S) -> Self {
        Self {
            open_library,
            google_books,
            sessions,
        }
    }
}
