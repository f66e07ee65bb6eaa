//! HTTP implementation of the [`Catalog`] trait (Google Books `volumes` API
//! by default).
//!
//! # Error translation
//!
//! Every failure collapses into a single [`CatalogError`] message:
//!
//! - non-2xx response with a JSON body `{"error": {"message": ...}}` → that message
//! - any other non-2xx response, transport error, timeout, or undecodable
//!   body → the operation's fallback (`"Failed to fetch book"` /
//!   `"Failed to fetch books"`)
//!
//! No retries are attempted.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{RequestBuilder, Url};
use serde::de::DeserializeOwned;

use book_explorer_core::catalog::{Catalog, SearchRequest};
use book_explorer_core::error::{CatalogError, FETCH_BOOKS_FAILED, FETCH_BOOK_FAILED};
use book_explorer_core::models::{BookDetail, SearchPage};

use crate::config::CatalogConfig;

const DEFAULT_USER_AGENT: &str = concat!("book-explorer/", env!("CARGO_PKG_VERSION"));

/// Catalog client over HTTP.
pub struct GoogleBooksClient {
    client: reqwest::Client,
    base_url: Url,
    api_key: Option<String>,
}

impl std::fmt::Debug for GoogleBooksClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleBooksClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl GoogleBooksClient {
    /// Build a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not a valid base URL or the HTTP
    /// client cannot be constructed.
    pub fn new(config: &CatalogConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .with_context(|| format!("Invalid catalog.base_url: {}", config.base_url))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("catalog.base_url cannot be used as a base: {}", base_url);
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(
                config
                    .user_agent
                    .clone()
                    .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            )
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url,
            api_key: config.api_key.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    fn volume_url(&self, id: &str) -> Result<Url, CatalogError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| CatalogError::new(None, None, FETCH_BOOK_FAILED))?
            .pop_if_empty()
            .push(id);
        Ok(url)
    }

    fn with_key(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.query(&[("key", key.as_str())]),
            None => request,
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        fallback: &str,
    ) -> Result<T, CatalogError> {
        let response = request.send().await.map_err(|e| {
            tracing::warn!(error = %e, "catalog request failed");
            CatalogError::new(e.status().map(|s| s.as_u16()), None, fallback)
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let upstream = upstream_message(&body);
            tracing::warn!(%status, message = ?upstream, "catalog returned an error");
            return Err(CatalogError::new(Some(status.as_u16()), upstream, fallback));
        }

        response.json::<T>().await.map_err(|e| {
            tracing::warn!(error = %e, "catalog response could not be decoded");
            CatalogError::new(Some(status.as_u16()), None, fallback)
        })
    }
}

/// Extract `error.message` from a catalog error body.
fn upstream_message(body: &str) -> Option<String> {
    let json: serde_json::Value = serde_json::from_str(body).ok()?;
    json.get("error")
        .and_then(|e| e.get("message"))
        .and_then(|m| m.as_str())
        .map(str::to_string)
}

#[async_trait]
impl Catalog for GoogleBooksClient {
    async fn fetch_by_id(&self, id: &str) -> Result<BookDetail, CatalogError> {
        let url = self.volume_url(id)?;
        tracing::debug!(%url, "fetching volume");
        let request = self.with_key(self.client.get(url));
        self.get_json(request, FETCH_BOOK_FAILED).await
    }

    async fn search(&self, request: &SearchRequest) -> Result<SearchPage, CatalogError> {
        tracing::debug!(
            query = %request.query,
            offset = request.offset,
            page_size = request.page_size,
            "sending search request"
        );
        let http = self.client.get(self.base_url.clone()).query(&[
            ("q", request.query.as_str().to_string()),
            ("startIndex", request.offset.to_string()),
            ("maxResults", request.page_size.to_string()),
        ]);
        let page: SearchPage = self.get_json(self.with_key(http), FETCH_BOOKS_FAILED).await?;
        tracing::debug!(
            items = page.items.len(),
            total_items = page.total_items,
            "received search page"
        );
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use book_explorer_core::models::SearchParams;
    use book_explorer_core::query::build_query;
    use httpmock::prelude::*;
    use serde_json::json;

    use super::*;

    const VOLUMES_PATH: &str = "/books/v1/volumes";

    fn client_for(server: &MockServer) -> GoogleBooksClient {
        client_with(server, |_| {})
    }

    fn client_with(server: &MockServer, update: impl FnOnce(&mut CatalogConfig)) -> GoogleBooksClient {
        let mut config = CatalogConfig {
            base_url: server.url(VOLUMES_PATH),
            ..CatalogConfig::default()
        };
        update(&mut config);
        GoogleBooksClient::new(&config).unwrap()
    }

    fn dune_request() -> SearchRequest {
        SearchRequest {
            query: build_query(&SearchParams::new("Dune", "Herbert", "")),
            offset: 20,
            page_size: 20,
        }
    }

    #[tokio::test]
    async fn search_sends_query_parameters() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path(VOLUMES_PATH)
                .query_param("q", "intitle:Dune+inauthor:Herbert")
                .query_param("startIndex", "20")
                .query_param("maxResults", "20");
            then.status(200).json_body(json!({
                "kind": "books#volumes",
                "totalItems": 42,
                "items": [
                    {"id": "a", "volumeInfo": {"title": "Dune"}},
                    {"id": "b", "volumeInfo": {"title": "Dune Messiah"}}
                ]
            }));
        });

        let page = client_for(&server).search(&dune_request()).await.unwrap();
        mock.assert();
        assert_eq!(page.total_items, 42);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[1].id, "b");
    }

    #[tokio::test]
    async fn missing_items_is_an_empty_page() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path(VOLUMES_PATH);
            then.status(200)
                .json_body(json!({"kind": "books#volumes", "totalItems": 0}));
        });

        let page = client_for(&server).search(&dune_request()).await.unwrap();
        assert!(page.items.is_empty());
    }

    #[tokio::test]
    async fn api_key_is_sent_when_configured() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET).path(VOLUMES_PATH).query_param("key", "k-123");
            then.status(200).json_body(json!({"totalItems": 0}));
        });

        let client = client_with(&server, |c| c.api_key = Some("k-123".into()));
        client.search(&dune_request()).await.unwrap();
        mock.assert();
    }

    #[tokio::test]
    async fn user_agent_is_configurable() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.header("user-agent", "shelf-test/1.0");
            then.status(200).json_body(json!({"totalItems": 0}));
        });

        let client = client_with(&server, |c| c.user_agent = Some("shelf-test/1.0".into()));
        client.search(&dune_request()).await.unwrap();
        mock.assert();
    }

    #[tokio::test]
    async fn search_error_surfaces_upstream_message() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path(VOLUMES_PATH);
            then.status(400).json_body(json!({
                "error": {"code": 400, "message": "Invalid value at 'start_index'"}
            }));
        });

        let err = client_for(&server).search(&dune_request()).await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid value at 'start_index'");
        assert_eq!(err.status, Some(400));
    }

    #[tokio::test]
    async fn search_error_without_message_uses_fallback() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path(VOLUMES_PATH);
            then.status(503).body("<html>unavailable</html>");
        });

        let err = client_for(&server).search(&dune_request()).await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to fetch books");
    }

    #[tokio::test]
    async fn fetch_by_id_hits_volume_path() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET).path(format!("{VOLUMES_PATH}/zyTCAlFPjgYC"));
            then.status(200).json_body(json!({
                "id": "zyTCAlFPjgYC",
                "volumeInfo": {
                    "title": "The Google Story",
                    "publisher": "Random House",
                    "pageCount": 207,
                    "categories": ["Business"]
                }
            }));
        });

        let book = client_for(&server).fetch_by_id("zyTCAlFPjgYC").await.unwrap();
        mock.assert();
        let info = book.volume().unwrap();
        assert_eq!(info.publisher.as_deref(), Some("Random House"));
        assert_eq!(info.page_count, Some(207));
    }

    #[tokio::test]
    async fn fetch_by_id_without_message_uses_fallback() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path(format!("{VOLUMES_PATH}/missing"));
            then.status(404).json_body(json!({"error": {"code": 404}}));
        });

        let err = client_for(&server).fetch_by_id("missing").await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to fetch book");
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn undecodable_body_uses_fallback() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path(format!("{VOLUMES_PATH}/garbled"));
            then.status(200).body("not json");
        });

        let err = client_for(&server).fetch_by_id("garbled").await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to fetch book");
    }

    #[tokio::test]
    async fn transport_failure_uses_fallback() {
        let config = CatalogConfig {
            // Reserved port, nothing listens here.
            base_url: "http://127.0.0.1:9/volumes".into(),
            timeout_secs: 2,
            ..CatalogConfig::default()
        };
        let err = GoogleBooksClient::new(&config)
            .unwrap()
            .fetch_by_id("x")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Failed to fetch book");
        assert_eq!(err.status, None);
    }

    #[test]
    fn rejects_unparseable_base_url() {
        let config = CatalogConfig {
            base_url: "not a url".into(),
            ..CatalogConfig::default()
        };
        assert!(GoogleBooksClient::new(&config).is_err());
    }
}
