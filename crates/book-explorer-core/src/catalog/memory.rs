//! In-memory [`Catalog`] implementation for testing and offline use.
//!
//! Understands the `intitle:`, `inauthor:` and `subject:` operators of a
//! [`CombinedQuery`](crate::query::CombinedQuery) as case-insensitive
//! substring matches against title, authors and categories. A bare term
//! (no operator) matches any of the three.

use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::{CatalogError, FETCH_BOOKS_FAILED, FETCH_BOOK_FAILED};
use crate::models::{BookDetail, SearchPage};

use super::{Catalog, SearchRequest};

/// Canned failure returned by every call while set.
#[derive(Debug, Clone)]
struct Failure {
    status: Option<u16>,
    message: Option<String>,
}

/// In-memory catalog over a fixed list of volumes.
pub struct InMemoryCatalog {
    volumes: Vec<BookDetail>,
    failure: RwLock<Option<Failure>>,
    requests: RwLock<Vec<SearchRequest>>,
}

impl InMemoryCatalog {
    pub fn new(volumes: Vec<BookDetail>) -> Self {
        Self {
            volumes,
            failure: RwLock::new(None),
            requests: RwLock::new(Vec::new()),
        }
    }

    /// Make every subsequent call fail. `message: None` exercises the
    /// fallback text.
    pub fn fail_with(&self, status: Option<u16>, message: Option<&str>) {
        *self.failure.write().unwrap_or_else(|e| e.into_inner()) = Some(Failure {
            status,
            message: message.map(str::to_string),
        });
    }

    pub fn recover(&self) {
        *self.failure.write().unwrap_or_else(|e| e.into_inner()) = None;
    }

    /// Every search request received so far, in order.
    pub fn search_requests(&self) -> Vec<SearchRequest> {
        self.requests
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn failure(&self, fallback: &str) -> Option<CatalogError> {
        self.failure
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(|f| CatalogError::new(f.status, f.message.clone(), fallback))
    }

    fn matches(book: &BookDetail, query: &str) -> bool {
        let info = book.volume_info.clone().unwrap_or_default();
        let title = info.title.unwrap_or_default().to_lowercase();
        let authors: Vec<String> = info
            .authors
            .unwrap_or_default()
            .iter()
            .map(|a| a.to_lowercase())
            .collect();
        let subjects: Vec<String> = info
            .categories
            .unwrap_or_default()
            .iter()
            .map(|c| c.to_lowercase())
            .collect();
        let any = |values: &[String], needle: &str| values.iter().any(|v| v.contains(needle));

        query.split('+').filter(|t| !t.is_empty()).all(|term| {
            let term = term.to_lowercase();
            if let Some(needle) = term.strip_prefix("intitle:") {
                title.contains(needle)
            } else if let Some(needle) = term.strip_prefix("inauthor:") {
                any(&authors, needle)
            } else if let Some(needle) = term.strip_prefix("subject:") {
                any(&subjects, needle)
            } else {
                title.contains(&term) || any(&authors, &term) || any(&subjects, &term)
            }
        })
    }
}

impl Default for InMemoryCatalog {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[async_trait]
impl Catalog for InMemoryCatalog {
    async fn fetch_by_id(&self, id: &str) -> Result<BookDetail, CatalogError> {
        if let Some(err) = self.failure(FETCH_BOOK_FAILED) {
            return Err(err);
        }
        self.volumes
            .iter()
            .find(|b| b.id == id)
            .cloned()
            .ok_or_else(|| {
                CatalogError::new(
                    Some(404),
                    Some("The volume ID could not be found.".into()),
                    FETCH_BOOK_FAILED,
                )
            })
    }

    async fn search(&self, request: &SearchRequest) -> Result<SearchPage, CatalogError> {
        self.requests
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.clone());

        if let Some(err) = self.failure(FETCH_BOOKS_FAILED) {
            return Err(err);
        }

        let matching: Vec<&BookDetail> = self
            .volumes
            .iter()
            .filter(|b| Self::matches(b, request.query.as_str()))
            .collect();

        Ok(SearchPage {
            total_items: matching.len() as u64,
            items: matching
                .into_iter()
                .skip(request.offset)
                .take(request.page_size)
                .cloned()
                .collect(),
        })
    }
}
