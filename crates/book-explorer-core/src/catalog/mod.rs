//! Catalog abstraction.
//!
//! The [`Catalog`] trait is the request/response contract with the remote
//! book catalog. The HTTP implementation lives in the application crate;
//! [`memory::InMemoryCatalog`] serves a fixed set of volumes for tests and
//! offline demos.
//!
//! Implementations must be `Send + Sync` so fetches can run on spawned tasks.

pub mod memory;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::CatalogError;
use crate::models::{BookDetail, SearchPage};
use crate::query::CombinedQuery;

/// Parameters of one search call: `q`, `startIndex` and `maxResults`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub query: CombinedQuery,
    pub offset: usize,
    pub page_size: usize,
}

/// Abstract book catalog.
///
/// | Method | Upstream call |
/// |--------|---------------|
/// | [`fetch_by_id`](Catalog::fetch_by_id) | `GET {base}/{id}` |
/// | [`search`](Catalog::search) | `GET {base}?q=..&startIndex=..&maxResults=..` |
///
/// Both fail with a [`CatalogError`] whose message is never empty. A page
/// with no items is a successful result, not an error.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Fetch a single volume by its catalog id.
    async fn fetch_by_id(&self, id: &str) -> Result<BookDetail, CatalogError>;

    /// Fetch one page of search results.
    async fn search(&self, request: &SearchRequest) -> Result<SearchPage, CatalogError>;
}
