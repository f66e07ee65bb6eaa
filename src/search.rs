//! One-shot paged search (`books search`).
//!
//! Drives a fresh [`SearchOrchestrator`] through an initial fetch and up to
//! `pages - 1` load-more steps, stopping early once the catalog runs out.

use anyhow::{bail, Result};

use book_explorer_core::catalog::Catalog;
use book_explorer_core::error::ValidationError;
use book_explorer_core::models::{BookSummary, SearchParams};
use book_explorer_core::orchestrator::{AppState, Completion, SearchOrchestrator};
use book_explorer_core::pagination::PaginationPolicy;
use book_explorer_core::scroll::BottomProximity;

use crate::progress::{FetchProgressEvent, FetchProgressReporter};
use crate::render::{self, ViewMode};

/// Everything a finished search leaves behind.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub results: Vec<BookSummary>,
    pub has_more: bool,
    pub pages_fetched: usize,
    pub total_items: Option<u64>,
    /// Notice or error shown to the user (e.g. the no-results message).
    pub message: Option<String>,
    /// Set when the last fetch failed rather than returned a page.
    pub failed: bool,
}

/// Run a search for `params`, fetching at most `pages` pages.
pub async fn search_books(
    catalog: &dyn Catalog,
    policy: PaginationPolicy,
    params: SearchParams,
    pages: usize,
    reporter: &dyn FetchProgressReporter,
) -> Result<SearchOutcome, ValidationError> {
    let mut state = AppState::new();
    let mut orchestrator = SearchOrchestrator::new(policy, BottomProximity::default());
    let mut next = orchestrator.submit(&mut state, params)?;
    let mut pages_fetched = 0;
    let mut failed = false;

    while let Some(ticket) = next.take() {
        pages_fetched += 1;
        let query = ticket.request.query.to_string();
        reporter.report(FetchProgressEvent::Requesting {
            query: query.clone(),
            page: pages_fetched,
            offset: ticket.request.offset,
        });

        let outcome = catalog.search(&ticket.request).await;
        match orchestrator.complete(&mut state, &ticket, outcome) {
            Completion::Loaded {
                count, has_more, ..
            } => {
                reporter.report(FetchProgressEvent::Loaded {
                    query: query.clone(),
                    page: pages_fetched,
                    count,
                    loaded: state.books.results().len(),
                    total_items: orchestrator.total_items(),
                });
                if !has_more {
                    reporter.report(FetchProgressEvent::Exhausted {
                        query,
                        loaded: state.books.results().len(),
                    });
                } else if pages_fetched < pages {
                    next = orchestrator.load_more(&mut state);
                }
            }
            Completion::Exhausted { .. } => {
                reporter.report(FetchProgressEvent::Exhausted {
                    query,
                    loaded: state.books.results().len(),
                });
            }
            Completion::Failed { .. } => failed = true,
            Completion::Stale => {}
        }
    }

    Ok(SearchOutcome {
        results: state.books.results().to_vec(),
        has_more: state.search.has_more(),
        pages_fetched,
        total_items: orchestrator.total_items(),
        message: orchestrator.error().map(str::to_string),
        failed,
    })
}

/// CLI entry point for `books search`.
///
/// Prints rendered results (or a JSON array with `--json`) to stdout. A
/// failed fetch still prints whatever was loaded, then returns the error.
pub async fn run_search(
    catalog: &dyn Catalog,
    policy: PaginationPolicy,
    params: SearchParams,
    pages: usize,
    view: ViewMode,
    json: bool,
    reporter: &dyn FetchProgressReporter,
) -> Result<()> {
    let outcome = search_books(catalog, policy, params, pages, reporter).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome.results)?);
    } else {
        if let Some(total) = outcome.total_items.filter(|_| !outcome.results.is_empty()) {
            println!(
                "Showing {} of about {} books\n",
                outcome.results.len(),
                total
            );
        }
        let message = if outcome.failed {
            None
        } else {
            outcome.message.as_deref()
        };
        print!(
            "{}",
            render::render_results(
                &outcome.results,
                view,
                |_| false,
                false,
                outcome.has_more,
                message,
            )
        );
        if outcome.has_more {
            println!("(more results available: use --pages to fetch further)");
        }
    }

    if outcome.failed {
        bail!(outcome
            .message
            .unwrap_or_else(|| book_explorer_core::error::FETCH_BOOKS_FAILED.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use book_explorer_core::catalog::memory::InMemoryCatalog;
    use book_explorer_core::models::{BookDetail, VolumeInfo};

    use super::*;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<FetchProgressEvent>>);

    impl FetchProgressReporter for Recorder {
        fn report(&self, event: FetchProgressEvent) {
            self.0.lock().unwrap().push(event);
        }
    }

    fn library(n: usize) -> InMemoryCatalog {
        InMemoryCatalog::new(
            (0..n)
                .map(|i| BookDetail {
                    id: format!("dune-{i}"),
                    volume_info: Some(VolumeInfo {
                        title: Some(format!("Dune {i}")),
                        authors: Some(vec!["Frank Herbert".into()]),
                        ..VolumeInfo::default()
                    }),
                })
                .collect(),
        )
    }

    #[tokio::test]
    async fn fetches_requested_number_of_pages() {
        let catalog = library(45);
        let recorder = Recorder::default();
        let outcome = search_books(
            &catalog,
            PaginationPolicy::new(20),
            SearchParams::title("Dune"),
            2,
            &recorder,
        )
        .await
        .unwrap();

        assert_eq!(outcome.results.len(), 40);
        assert!(outcome.has_more);
        assert_eq!(outcome.pages_fetched, 2);
        let offsets: Vec<usize> = catalog.search_requests().iter().map(|r| r.offset).collect();
        assert_eq!(offsets, vec![0, 20]);
        assert_eq!(recorder.0.lock().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn stops_at_short_page() {
        let catalog = library(25);
        let outcome = search_books(
            &catalog,
            PaginationPolicy::new(20),
            SearchParams::title("Dune"),
            10,
            &crate::progress::NoProgress,
        )
        .await
        .unwrap();

        assert_eq!(outcome.results.len(), 25);
        assert!(!outcome.has_more);
        assert_eq!(outcome.pages_fetched, 2);
        assert!(!outcome.failed);
    }

    #[tokio::test]
    async fn full_last_page_costs_one_more_request() {
        let catalog = library(40);
        let outcome = search_books(
            &catalog,
            PaginationPolicy::new(20),
            SearchParams::title("Dune"),
            10,
            &crate::progress::NoProgress,
        )
        .await
        .unwrap();

        assert_eq!(outcome.results.len(), 40);
        assert_eq!(outcome.pages_fetched, 3);
        assert!(outcome.message.is_none());
    }

    #[tokio::test]
    async fn no_matches_sets_notice() {
        let catalog = library(5);
        let outcome = search_books(
            &catalog,
            PaginationPolicy::default(),
            SearchParams::new("", "Austen", ""),
            1,
            &crate::progress::NoProgress,
        )
        .await
        .unwrap();

        assert!(outcome.results.is_empty());
        assert_eq!(
            outcome.message.as_deref(),
            Some("No books found for this search. Try different keywords.")
        );
    }

    #[tokio::test]
    async fn blank_params_are_rejected() {
        let catalog = library(5);
        let err = search_books(
            &catalog,
            PaginationPolicy::default(),
            SearchParams::new(" ", "", ""),
            1,
            &crate::progress::NoProgress,
        )
        .await
        .unwrap_err();
        assert_eq!(err, ValidationError::EmptyQuery);
        assert!(catalog.search_requests().is_empty());
    }

    #[tokio::test]
    async fn failure_is_reported() {
        let catalog = library(5);
        catalog.fail_with(Some(503), None);
        let outcome = search_books(
            &catalog,
            PaginationPolicy::default(),
            SearchParams::title("Dune"),
            3,
            &crate::progress::NoProgress,
        )
        .await
        .unwrap();

        assert!(outcome.failed);
        assert_eq!(outcome.message.as_deref(), Some("Failed to fetch books"));
        assert_eq!(outcome.pages_fetched, 1);
    }
}
