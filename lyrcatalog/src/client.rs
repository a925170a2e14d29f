//! HTTP client for the public music catalog
//!
//! Two outbound calls are involved per track: a search query returning
//! candidate track identifiers, and a URL resolution call returning a
//! playable URL at a preferred quality tier. Both endpoints are plain GET
//! APIs that expect browser-like request headers.

use crate::error::{CatalogError, Result};
use crate::models::deserialize_id;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error};

/// Default catalog search endpoint
pub const DEFAULT_SEARCH_URL: &str = "https://music.163.com/api/search/get/web";

/// Default song URL resolution endpoint
pub const DEFAULT_SONG_URL: &str = "https://wyy-api-three.vercel.app/song/url";

/// Default quality tier requested for playable URLs
pub const DEFAULT_QUALITY: &str = "flac";

/// Default request timeout (30 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Browser User-Agent the catalog endpoints expect
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// The search endpoint returns few/no results for tiny limits, so the
/// request always asks for at least this many and caps locally.
const MIN_SEARCH_LIMIT: usize = 50;

/// Capability interface for catalog lookups
///
/// One production implementation ([`NeteaseClient`]) plus substitutable test
/// doubles for resolver and orchestrator tests.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Searches the catalog for `artist title`, returning up to `limit`
    /// track identifiers. Zero results is `Ok(vec![])`, not an error.
    async fn search_track_ids(&self, artist: &str, title: &str, limit: usize)
        -> Result<Vec<String>>;

    /// Resolves a playable URL for a track identifier. `Ok(None)` means the
    /// catalog answered but offered no usable URL.
    async fn song_url(&self, track_id: &str) -> Result<Option<String>>;
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    result: Option<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(default)]
    songs: Vec<SearchSong>,
}

#[derive(Debug, Deserialize)]
struct SearchSong {
    #[serde(deserialize_with = "deserialize_id")]
    id: String,
}

/// Production catalog client
#[derive(Debug, Clone)]
pub struct NeteaseClient {
    client: Client,
    search_url: String,
    song_url_endpoint: String,
    quality: String,
}

impl NeteaseClient {
    /// Create a client with default endpoints and timeout
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// Create a builder for configuring the client
    pub fn builder() -> NeteaseClientBuilder {
        NeteaseClientBuilder::default()
    }

    fn browser_headers(request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("Accept", "application/json, text/plain, */*")
            .header("Accept-Language", "zh-CN,zh;q=0.9,en;q=0.8")
            .header("Cache-Control", "no-cache")
            .header("User-Agent", USER_AGENT)
    }

    /// Walks the known response shapes for a playable URL: a top-level
    /// `url` field, or one nested under `data`.
    fn extract_url(body: &Value) -> Option<String> {
        for node in [body.get("url"), body.get("data").and_then(|d| d.get("url"))] {
            if let Some(Value::String(url)) = node {
                if !url.is_empty() {
                    return Some(url.clone());
                }
            }
        }
        None
    }
}

#[async_trait]
impl CatalogApi for NeteaseClient {
    async fn search_track_ids(
        &self,
        artist: &str,
        title: &str,
        limit: usize,
    ) -> Result<Vec<String>> {
        let query = format!("{} {}", artist, title);
        let request_limit = limit.max(MIN_SEARCH_LIMIT);

        debug!(%query, limit, "Catalog search");

        let request = self
            .client
            .get(&self.search_url)
            .query(&[
                ("s", query.as_str()),
                ("type", "1"),
                ("limit", &request_limit.to_string()),
            ])
            .header("Referer", "https://music.163.com/");
        let response = Self::browser_headers(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Api(status.as_u16()));
        }

        let parsed: SearchResponse = response.json().await?;
        let ids = parsed
            .result
            .map(|result| result.songs)
            .unwrap_or_default()
            .into_iter()
            .map(|song| song.id)
            .take(limit)
            .collect();

        Ok(ids)
    }

    async fn song_url(&self, track_id: &str) -> Result<Option<String>> {
        debug!(track_id, quality=%self.quality, "Resolving playable URL");

        let request = self.client.get(&self.song_url_endpoint).query(&[
            ("id", track_id),
            ("quality", self.quality.as_str()),
        ]);
        let response = Self::browser_headers(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Api(status.as_u16()));
        }

        let body: Value = response.json().await?;

        if let Some(url) = Self::extract_url(&body) {
            return Ok(Some(url));
        }

        // Some API variants report the failure reason in-band
        if let Some(msg) = body
            .get("message")
            .or_else(|| body.get("error"))
            .and_then(Value::as_str)
        {
            error!(track_id, "Catalog URL API returned error: {}", msg);
        }

        Ok(None)
    }
}

/// Builder for [`NeteaseClient`]
#[derive(Debug, Clone)]
pub struct NeteaseClientBuilder {
    search_url: String,
    song_url_endpoint: String,
    quality: String,
    timeout: Duration,
}

impl Default for NeteaseClientBuilder {
    fn default() -> Self {
        Self {
            search_url: DEFAULT_SEARCH_URL.to_string(),
            song_url_endpoint: DEFAULT_SONG_URL.to_string(),
            quality: DEFAULT_QUALITY.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl NeteaseClientBuilder {
    pub fn search_url(mut self, url: impl Into<String>) -> Self {
        self.search_url = url.into();
        self
    }

    pub fn song_url(mut self, url: impl Into<String>) -> Self {
        self.song_url_endpoint = url.into();
        self
    }

    pub fn quality(mut self, quality: impl Into<String>) -> Self {
        self.quality = quality.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<NeteaseClient> {
        let client = Client::builder().timeout(self.timeout).build()?;
        Ok(NeteaseClient {
            client,
            search_url: self.search_url,
            song_url_endpoint: self.song_url_endpoint,
            quality: self.quality,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(server_url: &str) -> NeteaseClient {
        NeteaseClient::builder()
            .search_url(format!("{}/search/get/web", server_url))
            .song_url(format!("{}/song/url", server_url))
            .timeout(Duration::from_secs(5))
            .build()
            .expect("Failed to build client")
    }

    #[tokio::test]
    async fn search_parses_ids_in_order() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/search/get/web")
            .match_query(mockito::Matcher::UrlEncoded("s".into(), "王菲 岁月如歌".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"result":{"songs":[{"id":186016},{"id":186017},{"id":"186018"}]}}"#)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let ids = client.search_track_ids("王菲", "岁月如歌", 2).await.unwrap();
        assert_eq!(ids, vec!["186016".to_string(), "186017".to_string()]);
    }

    #[tokio::test]
    async fn search_without_results_is_empty() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/search/get/web")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"result":{}}"#)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let ids = client.search_track_ids("nobody", "nothing", 1).await.unwrap();
        assert!(ids.is_empty());
    }

    #[tokio::test]
    async fn search_propagates_http_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/search/get/web")
            .match_query(mockito::Matcher::Any)
            .with_status(502)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let err = client.search_track_ids("a", "b", 1).await.unwrap_err();
        match err {
            CatalogError::Api(status) => assert_eq!(status, 502),
            other => panic!("Unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn song_url_top_level_shape() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/song/url")
            .match_query(mockito::Matcher::UrlEncoded("id".into(), "186016".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"url":"https://cdn.example.com/186016.flac"}"#)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let url = client.song_url("186016").await.unwrap();
        assert_eq!(url, Some("https://cdn.example.com/186016.flac".to_string()));
    }

    #[tokio::test]
    async fn song_url_nested_data_shape() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/song/url")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data":{"url":"https://cdn.example.com/186016.flac"}}"#)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let url = client.song_url("186016").await.unwrap();
        assert_eq!(url, Some("https://cdn.example.com/186016.flac".to_string()));
    }

    #[tokio::test]
    async fn song_url_null_or_empty_is_absent() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/song/url")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"url":null,"message":"song not available"}"#)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let url = client.song_url("186016").await.unwrap();
        assert!(url.is_none());
    }
}
