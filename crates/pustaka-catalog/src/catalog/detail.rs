//! Detail lookups dispatched to the owning provider by identifier shape

use super::{CatalogService, SessionCounter};
use crate::domain::CatalogEntry;
use crate::sources::{open_library, Provider};

impl<A: Provider, B: Provider, S: SessionCounter> CatalogService<A, B, S> {
    /// Resolve one entry by its opaque identifier.
    ///
    /// Work-reference shapes (a `/works/` marker or the `OL` prefix) are
    /// dispatched to Open Library; every other shape goes to Google Books.
    /// The two formats are disjoint as observed empirically, not by any
    /// structural guarantee. An identifier its owning provider cannot
    /// resolve yields `None`, never an error.
    pub async fn entry_by_id(&self, id: &str) -> Option<CatalogEntry> {
        if open_library::is_work_reference(id) {
            self.open_library.entry_by_id(id).await
        } else {
            self.google_books.entry_by_id(id).await
        }
    }
}
