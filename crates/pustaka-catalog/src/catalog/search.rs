//! Multi-provider search engine: concurrent fan-out, merge, deduplicate

use std::collections::HashSet;

use super::{CatalogService, SessionCounter};
use crate::domain::CatalogEntry;
use crate::sources::{Provider, SearchOptions};

/// Which providers a combined search fans out to
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SearchSource {
    #[default]
    All,
    OpenLibrary,
    GoogleBooks,
}

#[derive(Clone, Debug)]
pub struct CombinedSearchOptions {
    pub limit: u32,
    pub language: Option<String>,
    pub source: SearchSource,
}

impl Default for CombinedSearchOptions {
    fn default() -> Self {
        Self {
            limit: 20,
            language: None,
            source: SearchSource::All,
        }
    }
}

#[derive(Debug)]
pub struct SearchPage {
    pub entries: Vec<CatalogEntry>,
    /// Count of entries actually returned after deduplication and
    /// truncation. A local, approximate figure, NOT a provider-reported
    /// corpus total, and not comparable to [`super::BrowsePage`]'s
    /// `provider_total`.
    pub total_items: u32,
}

impl<A: Provider, B: Provider, S: SessionCounter> CatalogService<A, B, S> {
    /// Fan a free-text query out to the selected providers and merge.
    ///
    /// The query must be non-empty; the engine does not guard against empty
    /// input. Results arrive Google Books first, then Open Library, are
    /// deduplicated by case-insensitive exact title equality with the first
    /// occurrence kept, and truncated to `limit`. A provider outage
    /// surfaces as a partial result, indistinguishable from a clean result
    /// with fewer matches.
    pub async fn search(&self, query: &str, options: &CombinedSearchOptions) -> SearchPage {
        let merged: Vec<CatalogEntry> = match options.source {
            SearchSource::All => {
                // Ceiling split so the combined result does not exceed the
                // requested limit before deduplication.
                let provider_options = SearchOptions {
                    limit: options.limit.div_ceil(2),
                    language: options.language.clone(),
                    ..SearchOptions::default()
                };
                let (google, open) = tokio::join!(
                    self.google_books.search(query, &provider_options),
                    self.open_library.search(query, &provider_options),
                );
                google.entries.into_iter().chain(open.entries).collect()
            }
            SearchSource::GoogleBooks => {
                let provider_options = SearchOptions {
                    limit: options.limit,
                    language: options.language.clone(),
                    ..SearchOptions::default()
                };
                self.google_books.search(query, &provider_options).await.entries
            }
            SearchSource::OpenLibrary => {
                let provider_options = SearchOptions {
                    limit: options.limit,
                    language: options.language.clone(),
                    ..SearchOptions::default()
                };
                self.open_library.search(query, &provider_options).await.entries
            }
        };

        let mut entries = dedup_by_title(merged);
        entries.truncate(options.limit as usize);
        let total_items = entries.len() as u32;

        SearchPage {
            entries,
            total_items,
        }
    }
}

/// Deduplicate by case-insensitive exact title equality, keeping the first
/// occurrence in concatenation order. A blunt heuristic: genuinely distinct
/// items sharing a title collapse into one.
fn dedup_by_title(entries: Vec<CatalogEntry>) -> Vec<CatalogEntry> {
    let mut seen = HashSet::new();
    entries
        .into_iter()
        .filter(|e| seen.insert(e.title.to_lowercase()))
        .collect()
}
