//! Error types surfaced to the user.
//!
//! Neither error is retried or propagated past the view that triggered it;
//! both carry the exact text shown to the user.

use thiserror::Error;

/// Fallback text when fetching a single volume fails without an upstream message.
pub const FETCH_BOOK_FAILED: &str = "Failed to fetch book";
/// Fallback text when a search request fails without an upstream message.
pub const FETCH_BOOKS_FAILED: &str = "Failed to fetch books";

/// Rejected search form input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter at least one search parameter")]
    EmptyQuery,
}

/// A failed catalog request (transport, HTTP status, or undecodable body).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct CatalogError {
    /// HTTP status, when a response was received.
    pub status: Option<u16>,
    message: String,
}

impl CatalogError {
    /// Build an error from an optional upstream message, substituting
    /// `fallback` when the upstream one is missing or blank.
    pub fn new(status: Option<u16>, upstream: Option<String>, fallback: &str) -> Self {
        let message = upstream
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| fallback.to_string());
        Self { status, message }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The catalog answered 404. Informational only: views treat it like any
    /// other failure.
    pub fn is_not_found(&self) -> bool {
        self.status == Some(404)
    }
}
