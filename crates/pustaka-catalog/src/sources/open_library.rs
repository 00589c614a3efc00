//! Open Library source plugin
//!
//! API docs: https://openlibrary.org/developers/api
//! Rate limit: courtesy limit, ~1 request/second sustained

use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use uuid::Uuid;

use super::traits::{Provider, SearchOptions, SearchOutcome, SourceError, SourceMetadata};
use crate::domain::{
    synthetic_views, year_or_current, CatalogEntry, Category, PLACEHOLDER_COVER, UNKNOWN_AUTHOR,
    UNTITLED,
};
use crate::http::{HttpClient, HttpError};

#[derive(Debug, Deserialize)]
struct OpenLibrarySearchResponse {
    #[serde(rename = "numFound")]
    num_found: Option<u32>,
    docs: Vec<OpenLibraryDoc>,
}

/// Loosely structured search record; nearly every field is optional in
/// practice, so every mapping below carries a fallback.
#[derive(Debug, Deserialize)]
struct OpenLibraryDoc {
    key: Option<String>,
    title: Option<String>,
    author_name: Option<Vec<String>>,
    cover_i: Option<i64>,
    first_publish_year: Option<i32>,
    language: Option<Vec<String>>,
    publisher: Option<Vec<String>>,
    isbn: Option<Vec<String>>,
    number_of_pages_median: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OpenLibraryWork {
    title: Option<String>,
    description: Option<WorkDescription>,
    covers: Option<Vec<i64>>,
    authors: Option<Vec<WorkAuthorRef>>,
    first_publish_date: Option<String>,
}

/// Work descriptions arrive either as a bare string or as a typed object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WorkDescription {
    Text(String),
    Typed { value: String },
}

impl WorkDescription {
    fn into_text(self) -> String {
        match self {
            WorkDescription::Text(text) => text,
            WorkDescription::Typed { value } => value,
        }
    }
}

#[derive(Debug, Deserialize)]
struct WorkAuthorRef {
    author: Option<KeyRef>,
}

#[derive(Debug, Deserialize)]
struct KeyRef {
    key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenLibraryAuthor {
    name: Option<String>,
}

lazy_static! {
    static ref WORK_KEY: Regex = Regex::new(r"^OL\d+W$").unwrap();
}

/// Identifier-shape check used for detail-lookup dispatch.
///
/// Work references carry the `/works/` marker or the bare `OL` prefix. The
/// two providers' formats are disjoint in practice, not by any structural
/// guarantee.
pub fn is_work_reference(id: &str) -> bool {
    id.contains("/works/") || id.starts_with("OL")
}

pub struct OpenLibraryClient {
    client: HttpClient,
    base_url: String,
    covers_url: String,
}

impl OpenLibraryClient {
    pub fn new() -> Self {
        Self::with_base_urls("https://openlibrary.org", "https://covers.openlibrary.org")
    }

    /// Override the endpoints, for tests or a caching mirror.
    pub fn with_base_urls(base_url: &str, covers_url: &str) -> Self {
        Self {
            client: HttpClient::new("pustaka/1.0 (https://github.com/pustaka-app/pustaka)"),
            base_url: base_url.trim_end_matches('/').to_string(),
            covers_url: covers_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn metadata() -> SourceMetadata {
        SourceMetadata {
            id: "openlibrary",
            name: "Open Library",
            description: "Open bibliographic index from the Internet Archive",
            base_url: "https://openlibrary.org",
            rate_limit_per_second: 1.0,
            supports_pagination: false,
            supports_language_filter: false,
            requires_api_key: false,
        }
    }

    async fn try_search(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<SearchOutcome, SourceError> {
        let url = format!("{}/search.json", self.base_url);
        let limit = options.limit.to_string();
        let response = self
            .client
            .get_with_params(&url, &[("q", query), ("limit", &limit)])
            .await?;

        if response.status != 200 {
            return Err(HttpError::RequestFailed {
                message: format!("Status {}", response.status),
            }
            .into());
        }

        parse_search_response(&response.body, options.category, &self.covers_url)
    }

    async fn try_entry_by_id(&self, id: &str) -> Result<CatalogEntry, SourceError> {
        let key = normalize_work_key(id).ok_or(SourceError::NotFound)?;

        let url = format!("{}/works/{}.json", self.base_url, key);
        let response = self.client.get(&url).await?;
        if response.status == 404 {
            return Err(SourceError::NotFound);
        }
        if response.status != 200 {
            return Err(HttpError::RequestFailed {
                message: format!("Status {}", response.status),
            }
            .into());
        }

        let work: OpenLibraryWork = serde_json::from_str(&response.body)
            .map_err(|e| SourceError::Parse(format!("Invalid work JSON: {}", e)))?;

        // Dependent secondary fetch for the author display name; its failure
        // must not fail the whole lookup.
        let author = match first_author_key(&work) {
            Some(author_key) => match self.fetch_author_name(&author_key).await {
                Ok(name) => name,
                Err(e) => {
                    tracing::warn!(provider = "openlibrary", error = %e,
                        "author lookup degraded to fallback");
                    UNKNOWN_AUTHOR.to_string()
                }
            },
            None => UNKNOWN_AUTHOR.to_string(),
        };

        Ok(map_work(&key, work, author, &self.covers_url))
    }

    async fn fetch_author_name(&self, author_key: &str) -> Result<String, SourceError> {
        let url = format!("{}{}.json", self.base_url, author_key);
        let response = self.client.get(&url).await?;
        if response.status != 200 {
            return Err(HttpError::RequestFailed {
                message: format!("Status {}", response.status),
            }
            .into());
        }

        let author: OpenLibraryAuthor = serde_json::from_str(&response.body)
            .map_err(|e| SourceError::Parse(format!("Invalid author JSON: {}", e)))?;
        author.name.ok_or(SourceError::NotFound)
    }
}

impl Default for OpenLibraryClient {
    fn default() -> Self {
        Self::new()
    }
}

impl Provider for OpenLibraryClient {
    async fn search(&self, query: &str, options: &SearchOptions) -> SearchOutcome {
        match self.try_search(query, options).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(provider = "openlibrary", error = %e,
                    "search degraded to empty result");
                SearchOutcome::default()
            }
        }
    }

    async fn entry_by_id(&self, id: &str) -> Option<CatalogEntry> {
        match self.try_entry_by_id(id).await {
            Ok(entry) => Some(entry),
            Err(SourceError::NotFound) => None,
            Err(e) => {
                tracing::warn!(provider = "openlibrary", error = %e,
                    "lookup degraded to not-found");
                None
            }
        }
    }
}

/// Reduce an incoming identifier to a bare work key, rejecting shapes that
/// are not work references.
fn normalize_work_key(id: &str) -> Option<String> {
    let key = match id.rfind("/works/") {
        Some(pos) => &id[pos + "/works/".len()..],
        None => id,
    };
    let key = key.trim_end_matches(".json").trim_end_matches('/');
    WORK_KEY.is_match(key).then(|| key.to_string())
}

fn first_author_key(work: &OpenLibraryWork) -> Option<String> {
    work.authors
        .as_ref()?
        .iter()
        .find_map(|a| a.author.as_ref()?.key.clone())
}

/// Parse an Open Library search response
fn parse_search_response(
    json: &str,
    category: Category,
    covers_url: &str,
) -> Result<SearchOutcome, SourceError> {
    let response: OpenLibrarySearchResponse = serde_json::from_str(json)
        .map_err(|e| SourceError::Parse(format!("Invalid Open Library JSON: {}", e)))?;

    let provider_total = response.num_found.unwrap_or(0);
    let entries = response
        .docs
        .into_iter()
        .map(|doc| map_doc(doc, category, covers_url))
        .collect();

    Ok(SearchOutcome {
        entries,
        provider_total,
    })
}

fn map_doc(doc: OpenLibraryDoc, category: Category, covers_url: &str) -> CatalogEntry {
    // Records without a native key get a synthesized id; the same logical
    // item can therefore carry a different id across repeated requests.
    let id = doc
        .key
        .filter(|k| !k.is_empty())
        .unwrap_or_else(|| format!("ol-{}", Uuid::new_v4()));

    CatalogEntry {
        id,
        title: doc
            .title
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| UNTITLED.to_string()),
        author: doc
            .author_name
            .and_then(|a| a.into_iter().next())
            .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
        cover_url: doc
            .cover_i
            .map(|cover| format!("{}/b/id/{}-M.jpg", covers_url, cover))
            .unwrap_or_else(|| PLACEHOLDER_COVER.to_string()),
        category,
        year: doc
            .first_publish_year
            .unwrap_or_else(|| year_or_current(None)),
        description: None,
        language: doc.language.and_then(|l| l.into_iter().next()),
        isbn: doc.isbn.and_then(|i| i.into_iter().next()),
        publisher: doc.publisher.and_then(|p| p.into_iter().next()),
        page_count: doc.number_of_pages_median,
        preview_link: None,
        views: Some(synthetic_views()),
    }
}

fn map_work(key: &str, work: OpenLibraryWork, author: String, covers_url: &str) -> CatalogEntry {
    CatalogEntry {
        id: format!("/works/{}", key),
        title: work
            .title
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| UNTITLED.to_string()),
        author,
        cover_url: work
            .covers
            .and_then(|c| c.into_iter().next())
            .map(|cover| format!("{}/b/id/{}-M.jpg", covers_url, cover))
            .unwrap_or_else(|| PLACEHOLDER_COVER.to_string()),
        category: Category::DigitalBook,
        year: year_or_current(work.first_publish_date.as_deref()),
        description: work.description.map(WorkDescription::into_text),
        language: None,
        isbn: None,
        publisher: None,
        page_count: None,
        preview_link: Some(format!("https://openlibrary.org/works/{}", key)),
        views: Some(synthetic_views()),
    }
}
