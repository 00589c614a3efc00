//! Google Books source plugin
//!
//! API docs: https://developers.google.com/books/docs/v1/using
//! Rate limit: 1000 requests/day without an API key

use serde::Deserialize;

use super::traits::{Provider, SearchOptions, SearchOutcome, SourceError, SourceMetadata};
use crate::domain::{
    synthetic_views, year_or_current, CatalogEntry, Category, PLACEHOLDER_COVER, UNKNOWN_AUTHOR,
    UNTITLED,
};
use crate::http::{HttpClient, HttpError};

/// Google Books rejects maxResults above this cap.
const MAX_RESULTS_CAP: u32 = 40;

#[derive(Debug, Deserialize)]
struct VolumesResponse {
    #[serde(rename = "totalItems")]
    total_items: Option<u32>,
    items: Option<Vec<Volume>>,
}

#[derive(Debug, Deserialize)]
struct Volume {
    id: Option<String>,
    #[serde(rename = "volumeInfo")]
    volume_info: Option<VolumeInfo>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VolumeInfo {
    title: Option<String>,
    authors: Option<Vec<String>>,
    published_date: Option<String>,
    description: Option<String>,
    industry_identifiers: Option<Vec<IndustryIdentifier>>,
    page_count: Option<u32>,
    language: Option<String>,
    publisher: Option<String>,
    preview_link: Option<String>,
    image_links: Option<ImageLinks>,
}

#[derive(Debug, Deserialize)]
struct IndustryIdentifier {
    #[serde(rename = "type")]
    kind: Option<String>,
    identifier: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageLinks {
    thumbnail: Option<String>,
    medium: Option<String>,
    large: Option<String>,
}

pub struct GoogleBooksClient {
    client: HttpClient,
    base_url: String,
    api_key: Option<String>,
}

impl GoogleBooksClient {
    pub fn new() -> Self {
        Self::with_base_url("https://www.googleapis.com/books/v1")
    }

    /// Override the endpoint, for tests or a caching mirror.
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            client: HttpClient::new("pustaka/1.0 (https://github.com/pustaka-app/pustaka)"),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: None,
        }
    }

    pub fn with_api_key(mut self, api_key: &str) -> Self {
        self.api_key = Some(api_key.to_string());
        self
    }

    pub fn metadata() -> SourceMetadata {
        SourceMetadata {
            id: "googlebooks",
            name: "Google Books",
            description: "Commercial book metadata index with paginated volume search",
            base_url: "https://www.googleapis.com/books/v1",
            rate_limit_per_second: 1.0,
            supports_pagination: true,
            supports_language_filter: true,
            requires_api_key: false,
        }
    }

    async fn try_search(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<SearchOutcome, SourceError> {
        let url = format!("{}/volumes", self.base_url);
        let max_results = options.limit.min(MAX_RESULTS_CAP).to_string();
        let start_index = options.start_index.to_string();

        let mut params = vec![
            ("q", query),
            ("maxResults", &max_results),
            ("startIndex", &start_index),
            ("orderBy", options.order_by.as_str()),
        ];
        if let Some(language) = &options.language {
            params.push(("langRestrict", language));
        }
        if let Some(key) = &self.api_key {
            params.push(("key", key));
        }

        let response = self.client.get_with_params(&url, &params).await?;
        if response.status != 200 {
            return Err(HttpError::RequestFailed {
                message: format!("Status {}", response.status),
            }
            .into());
        }

        parse_volumes_response(&response.body, options.category)
    }

    async fn try_entry_by_id(&self, id: &str) -> Result<CatalogEntry, SourceError> {
        let url = format!("{}/volumes/{}", self.base_url, urlencoding::encode(id));
        let response = match &self.api_key {
            Some(key) => self.client.get_with_params(&url, &[("key", key)]).await?,
            None => self.client.get(&url).await?,
        };

        // A missing volume is a valid outcome, not an error.
        if response.status == 404 {
            return Err(SourceError::NotFound);
        }
        if response.status != 200 {
            return Err(HttpError::RequestFailed {
                message: format!("Status {}", response.status),
            }
            .into());
        }

        let volume: Volume = serde_json::from_str(&response.body)
            .map_err(|e| SourceError::Parse(format!("Invalid volume JSON: {}", e)))?;
        map_volume(volume, Category::DigitalBook).ok_or(SourceError::NotFound)
    }
}

impl Default for GoogleBooksClient {
    fn default() -> Self {
        Self::new()
    }
}

impl Provider for GoogleBooksClient {
    async fn search(&self, query: &str, options: &SearchOptions) -> SearchOutcome {
        match self.try_search(query, options).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(provider = "googlebooks", error = %e,
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
                tracing::warn!(provider = "googlebooks", error = %e,
                    "lookup degraded to not-found");
                None
            }
        }
    }
}

/// Parse a volume search response
fn parse_volumes_response(json: &str, category: Category) -> Result<SearchOutcome, SourceError> {
    let response: VolumesResponse = serde_json::from_str(json)
        .map_err(|e| SourceError::Parse(format!("Invalid Google Books JSON: {}", e)))?;

    let provider_total = response.total_items.unwrap_or(0);
    let entries = response
        .items
        .unwrap_or_default()
        .into_iter()
        .filter_map(|v| map_volume(v, category))
        .collect();

    Ok(SearchOutcome {
        entries,
        provider_total,
    })
}

/// Map a volume record; records without an id are dropped.
fn map_volume(volume: Volume, category: Category) -> Option<CatalogEntry> {
    let id = volume.id.filter(|i| !i.is_empty())?;
    let info = volume.volume_info.unwrap_or_default();

    Some(CatalogEntry {
        id,
        title: info
            .title
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| UNTITLED.to_string()),
        author: info
            .authors
            .and_then(|a| a.into_iter().next())
            .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
        cover_url: pick_cover(info.image_links.as_ref()),
        category,
        year: year_or_current(info.published_date.as_deref()),
        description: info.description,
        language: info.language,
        isbn: pick_isbn(info.industry_identifiers),
        publisher: info.publisher,
        page_count: info.page_count,
        preview_link: info.preview_link,
        views: Some(synthetic_views()),
    })
}

/// Cover selection priority: large, then medium, then thumbnail upgraded to
/// secure transport, then the placeholder.
fn pick_cover(links: Option<&ImageLinks>) -> String {
    if let Some(links) = links {
        if let Some(url) = &links.large {
            return url.clone();
        }
        if let Some(url) = &links.medium {
            return url.clone();
        }
        if let Some(url) = &links.thumbnail {
            return force_https(url);
        }
    }
    PLACEHOLDER_COVER.to_string()
}

fn force_https(url: &str) -> String {
    match url.strip_prefix("http://") {
        Some(rest) => format!("https://{}", rest),
        None => url.to_string(),
    }
}

/// Prefer ISBN-13 over ISBN-10 when both are reported.
fn pick_isbn(identifiers: Option<Vec<IndustryIdentifier>>) -> Option<String> {
    let identifiers = identifiers?;
    let find = |kind: &str| {
        identifiers
            .iter()
            .find(|i| i.kind.as_deref() == Some(kind))
            .and_then(|i| i.identifier.clone())
    };
    find("ISBN_13").or_else(|| find("ISBN_10"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    const SAMPLE_VOLUMES: &str = r#"{
        "totalItems": 1523,
        "items": [
            {
                "id": "zyTCAlFPjgYC",
                "volumeInfo": {
                    "title": "The Google Story",
                    "authors": ["David A. Vise", "Mark Malseed"],
                    "publisher": "Random House Digital",
                    "publishedDate": "2005-11-15",
                    "description": "The definitive account.",
                    "industryIdentifiers": [
                        {"type": "ISBN_10", "identifier": "055380457X"},
                        {"type": "ISBN_13", "identifier": "9780553804577"}
                    ],
                    "pageCount": 207,
                    "language": "en",
                    "previewLink": "http://books.google.com/books?id=zyTCAlFPjgYC",
                    "imageLinks": {
                        "thumbnail": "http://books.google.com/books/content?id=zyTCAlFPjgYC&zoom=1"
                    }
                }
            },
            {
                "id": "bare000000",
                "volumeInfo": {}
            },
            {
                "volumeInfo": {"title": "No id, dropped"}
            }
        ]
    }"#;

    #[test]
    fn test_parse_volumes_response() {
        let outcome = parse_volumes_response(SAMPLE_VOLUMES, Category::DigitalBook).unwrap();

        assert_eq!(outcome.provider_total, 1523);
        // The record without an id is dropped
        assert_eq!(outcome.entries.len(), 2);

        let first = &outcome.entries[0];
        assert_eq!(first.id, "zyTCAlFPjgYC");
        assert_eq!(first.title, "The Google Story");
        assert_eq!(first.author, "David A. Vise");
        assert_eq!(first.year, 2005);
        assert_eq!(first.isbn.as_deref(), Some("9780553804577"));
        assert_eq!(first.page_count, Some(207));
        assert_eq!(first.language.as_deref(), Some("en"));
        assert!(first.cover_url.starts_with("https://"));
    }

    #[test]
    fn test_bare_volume_gets_fallbacks() {
        let outcome = parse_volumes_response(SAMPLE_VOLUMES, Category::Journal).unwrap();

        let bare = &outcome.entries[1];
        assert_eq!(bare.id, "bare000000");
        assert_eq!(bare.title, UNTITLED);
        assert_eq!(bare.author, UNKNOWN_AUTHOR);
        assert_eq!(bare.cover_url, PLACEHOLDER_COVER);
        assert_eq!(bare.year, chrono::Utc::now().year());
        assert_eq!(bare.category, Category::Journal);
    }

    #[test]
    fn test_empty_result_set() {
        let outcome = parse_volumes_response(r#"{"totalItems": 0}"#, Category::DigitalBook).unwrap();
        assert!(outcome.entries.is_empty());
        assert_eq!(outcome.provider_total, 0);
    }

    #[test]
    fn test_malformed_json_is_a_parse_error() {
        let result = parse_volumes_response("<html>502</html>", Category::DigitalBook);
        assert!(matches!(result, Err(SourceError::Parse(_))));
    }

    #[test]
    fn test_cover_priority() {
        let links = ImageLinks {
            thumbnail: Some("http://books.google.com/thumb".to_string()),
            medium: Some("https://books.google.com/medium".to_string()),
            large: Some("https://books.google.com/large".to_string()),
        };
        assert_eq!(pick_cover(Some(&links)), "https://books.google.com/large");

        let links = ImageLinks {
            thumbnail: Some("http://books.google.com/thumb".to_string()),
            medium: Some("https://books.google.com/medium".to_string()),
            large: None,
        };
        assert_eq!(pick_cover(Some(&links)), "https://books.google.com/medium");

        let links = ImageLinks {
            thumbnail: Some("http://books.google.com/thumb".to_string()),
            medium: None,
            large: None,
        };
        // Thumbnails are upgraded to secure transport
        assert_eq!(pick_cover(Some(&links)), "https://books.google.com/thumb");

        assert_eq!(pick_cover(None), PLACEHOLDER_COVER);
    }

    #[test]
    fn test_isbn_13_preferred() {
        let ids = vec![
            IndustryIdentifier {
                kind: Some("ISBN_10".to_string()),
                identifier: Some("055380457X".to_string()),
            },
            IndustryIdentifier {
                kind: Some("ISBN_13".to_string()),
                identifier: Some("9780553804577".to_string()),
            },
        ];
        assert_eq!(pick_isbn(Some(ids)).as_deref(), Some("9780553804577"));

        let only_10 = vec![IndustryIdentifier {
            kind: Some("ISBN_10".to_string()),
            identifier: Some("055380457X".to_string()),
        }];
        assert_eq!(pick_isbn(Some(only_10)).as_deref(), Some("055380457X"));

        assert_eq!(pick_isbn(None), None);
    }
}
