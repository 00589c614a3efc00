//! HTTP client abstraction for provider plugins
//!
//! Wraps reqwest with a user agent, query-parameter helpers, and a bounded
//! in-memory freshness window for identical repeated GET requests. The
//! window is a pure performance optimization; staleness inside it is
//! acceptable and not a correctness concern.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use reqwest::Client;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HttpError {
    #[error("Request failed: {message}")]
    RequestFailed { message: String },
    #[error("Invalid URL: {url}")]
    InvalidUrl { url: String },
    #[error("Rate limited")]
    RateLimited,
    #[error("Parse error: {message}")]
    ParseError { message: String },
}

#[derive(Clone, Debug)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// How long an identical GET may be served from memory.
const FRESHNESS_WINDOW: Duration = Duration::from_secs(300);

struct CachedResponse {
    fetched_at: Instant,
    response: HttpResponse,
}

pub struct HttpClient {
    client: Client,
    user_agent: String,
    cache: Mutex<HashMap<String, CachedResponse>>,
}

impl HttpClient {
    pub fn new(user_agent: &str) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            user_agent: user_agent.to_string(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub async fn get(&self, url: &str) -> Result<HttpResponse, HttpError> {
        if let Some(cached) = self.cache_get(url) {
            tracing::debug!(url, "serving response from freshness window");
            return Ok(cached);
        }

        tracing::debug!(url, "issuing GET");
        let response = self
            .client
            .get(url)
            .header("User-Agent", &self.user_agent)
            .send()
            .await
            .map_err(|e| HttpError::RequestFailed {
                message: e.to_string(),
            })?;

        let status = response.status().as_u16();

        if status == 429 {
            return Err(HttpError::RateLimited);
        }

        let body = response.text().await.map_err(|e| HttpError::ParseError {
            message: e.to_string(),
        })?;

        let response = HttpResponse { status, body };
        if status == 200 {
            self.cache_put(url, response.clone());
        }

        Ok(response)
    }

    pub async fn get_with_params(
        &self,
        url: &str,
        params: &[(&str, &str)],
    ) -> Result<HttpResponse, HttpError> {
        let url =
            reqwest::Url::parse_with_params(url, params).map_err(|_| HttpError::InvalidUrl {
                url: url.to_string(),
            })?;

        self.get(url.as_str()).await
    }

    fn cache_get(&self, url: &str) -> Option<HttpResponse> {
        let cache = self.cache.lock().unwrap();
        cache
            .get(url)
            .filter(|c| c.fetched_at.elapsed() < FRESHNESS_WINDOW)
            .map(|c| c.response.clone())
    }

    fn cache_put(&self, url: &str, response: HttpResponse) {
        let mut cache = self.cache.lock().unwrap();
        cache.retain(|_, c| c.fetched_at.elapsed() < FRESHNESS_WINDOW);
        cache.insert(
            url.to_string(),
            CachedResponse {
                fetched_at: Instant::now(),
                response,
            },
        );
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new("pustaka/1.0")
    }
}
