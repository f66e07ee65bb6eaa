//! Search orchestration: the state machine that turns search submissions and
//! scroll triggers into catalog fetches and folds the responses back into
//! [`AppState`].
//!
//! # Phases
//!
//! ```text
//! Idle(query = "") ──submit──▶ FetchingInitial ──▶ Ready(has_more) ◀──▶ FetchingMore
//!                                     │                  │
//!                                     └──────────────────┴──▶ Exhausted(has_more = false)
//! ```
//!
//! # Single flight
//!
//! At most one fetch is outstanding. [`FetchStatus`] records it; load-more
//! triggers observed while fetching are dropped, not queued, so a burst of
//! scroll events advances the offset once. Every ticket carries the request
//! generation it was issued under. A new submission or a reset bumps the
//! generation, and completions for an older generation are discarded instead
//! of overwriting fresher state.
//!
//! The orchestrator does no I/O. The caller executes the [`SearchRequest`]
//! inside a ticket and hands the outcome back to [`SearchOrchestrator::complete`].

use serde::Serialize;

use crate::catalog::SearchRequest;
use crate::collection::{BookAction, BookCollection};
use crate::error::{CatalogError, ValidationError};
use crate::models::{SearchPage, SearchParams};
use crate::normalize::normalize_all;
use crate::pagination::PaginationPolicy;
use crate::query::build_query;
use crate::scroll::{BottomProximity, ScrollPosition};
use crate::session::{SearchSession, SessionAction};

/// Shown when the first page of a new query comes back empty.
pub const NO_RESULTS_MESSAGE: &str = "No books found for this search. Try different keywords.";

/// The application state container: one search session plus the book lists.
///
/// Constructed by the UI root and passed by reference to the orchestrator;
/// there is no global instance.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AppState {
    pub search: SearchSession,
    pub books: BookCollection,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Whether a fetch replaces the result list or extends it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchKind {
    Initial,
    Continuation,
}

/// A fetch the caller must execute, tagged with the generation it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub generation: u64,
    pub kind: FetchKind,
    pub request: SearchRequest,
}

/// Single-flight guard.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FetchStatus {
    #[default]
    Idle,
    Fetching(FetchTicket),
}

/// Observable phase of the session, derived from state and status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Idle,
    FetchingInitial,
    FetchingMore,
    Ready,
    Exhausted,
}

/// What [`SearchOrchestrator::complete`] did with a fetch outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// Items were merged into the results.
    Loaded { kind: FetchKind, count: usize, has_more: bool },
    /// The page was empty; no further pages will be requested.
    Exhausted { kind: FetchKind },
    /// The fetch failed; the message is now the current error.
    Failed { message: String },
    /// The ticket belongs to a superseded generation and was ignored.
    Stale,
}

#[derive(Debug, Clone)]
pub struct SearchOrchestrator {
    policy: PaginationPolicy,
    trigger: BottomProximity,
    status: FetchStatus,
    generation: u64,
    error: Option<String>,
    total_items: Option<u64>,
}

impl Default for SearchOrchestrator {
    fn default() -> Self {
        Self::new(PaginationPolicy::default(), BottomProximity::default())
    }
}

impl SearchOrchestrator {
    pub fn new(policy: PaginationPolicy, trigger: BottomProximity) -> Self {
        Self {
            policy,
            trigger,
            status: FetchStatus::Idle,
            generation: 0,
            error: None,
            total_items: None,
        }
    }

    pub fn policy(&self) -> PaginationPolicy {
        self.policy
    }

    pub fn status(&self) -> &FetchStatus {
        &self.status
    }

    pub fn is_fetching(&self) -> bool {
        matches!(self.status, FetchStatus::Fetching(_))
    }

    /// The user-facing error or notice, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Last `totalItems` reported by the catalog. Display only.
    pub fn total_items(&self) -> Option<u64> {
        self.total_items
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn phase(&self, state: &AppState) -> SessionPhase {
        match &self.status {
            FetchStatus::Fetching(ticket) => match ticket.kind {
                FetchKind::Initial => SessionPhase::FetchingInitial,
                FetchKind::Continuation => SessionPhase::FetchingMore,
            },
            FetchStatus::Idle if state.search.query().is_empty() => SessionPhase::Idle,
            FetchStatus::Idle if state.search.has_more() => SessionPhase::Ready,
            FetchStatus::Idle => SessionPhase::Exhausted,
        }
    }

    /// Submit the search form.
    ///
    /// Returns `Ok(None)` when the combined query equals the current one.
    pub fn submit(
        &mut self,
        state: &mut AppState,
        params: SearchParams,
    ) -> Result<Option<FetchTicket>, ValidationError> {
        let query = build_query(&params);
        if query.is_empty() {
            self.error = Some(ValidationError::EmptyQuery.to_string());
            return Err(ValidationError::EmptyQuery);
        }

        state.search.apply(SessionAction::SetParams(params));
        if &query == state.search.query() {
            tracing::debug!(%query, "query unchanged; not refetching");
            return Ok(None);
        }

        tracing::debug!(%query, "new search query");
        state.search.apply(SessionAction::SetQuery(query));
        state.books.apply(BookAction::ClearResults);
        self.error = None;
        self.total_items = None;
        self.generation += 1;

        Ok(Some(self.start(state, FetchKind::Initial)))
    }

    /// Request the next page. Ignored while a fetch is in flight, once the
    /// session is exhausted, or before any query was submitted.
    pub fn load_more(&mut self, state: &mut AppState) -> Option<FetchTicket> {
        if state.search.query().is_empty() || !state.search.has_more() || self.is_fetching() {
            return None;
        }

        state
            .search
            .apply(SessionAction::AdvanceOffset(self.policy.page_size()));
        Some(self.start(state, FetchKind::Continuation))
    }

    /// Scroll observer hook: loads more when the viewport nears the bottom.
    pub fn on_scroll(&mut self, state: &mut AppState, position: &ScrollPosition) -> Option<FetchTicket> {
        if self.trigger.is_near_bottom(position) {
            self.load_more(state)
        } else {
            None
        }
    }

    /// Fold a fetch outcome into state.
    pub fn complete(
        &mut self,
        state: &mut AppState,
        ticket: &FetchTicket,
        outcome: Result<SearchPage, CatalogError>,
    ) -> Completion {
        if ticket.generation != self.generation {
            tracing::warn!(
                ticket = ticket.generation,
                current = self.generation,
                "discarding stale search response"
            );
            return Completion::Stale;
        }
        if self.status == FetchStatus::Fetching(ticket.clone()) {
            self.status = FetchStatus::Idle;
        }

        let page = match outcome {
            Ok(page) => page,
            Err(err) => {
                tracing::warn!(error = %err, query = %ticket.request.query, "search failed");
                let message = err.to_string();
                self.error = Some(message.clone());
                state.search.apply(SessionAction::SetHasMore(false));
                return Completion::Failed { message };
            }
        };

        self.total_items = Some(page.total_items);

        if page.items.is_empty() {
            state.search.apply(SessionAction::SetHasMore(false));
            if ticket.kind == FetchKind::Initial {
                self.error = Some(NO_RESULTS_MESSAGE.to_string());
                state.books.apply(BookAction::ClearResults);
            }
            return Completion::Exhausted { kind: ticket.kind };
        }

        let count = page.items.len();
        let books = normalize_all(&page.items);
        state.books.apply(match ticket.kind {
            FetchKind::Initial => BookAction::ReplaceResults(books),
            FetchKind::Continuation => BookAction::AppendResults(books),
        });

        let has_more = self.policy.may_have_more(count);
        state.search.apply(SessionAction::SetHasMore(has_more));
        tracing::debug!(count, has_more, offset = ticket.request.offset, "search page applied");

        Completion::Loaded {
            kind: ticket.kind,
            count,
            has_more,
        }
    }

    /// Clear the search and its results. An in-flight response will be stale.
    pub fn reset(&mut self, state: &mut AppState) {
        state.search.apply(SessionAction::Reset);
        state.books.apply(BookAction::ClearResults);
        self.generation += 1;
        self.status = FetchStatus::Idle;
        self.error = None;
        self.total_items = None;
    }

    /// Dismiss the current error or notice.
    pub fn clear_error(&mut self) {
        self.error = None;
    }

    fn start(&mut self, state: &AppState, kind: FetchKind) -> FetchTicket {
        let ticket = FetchTicket {
            generation: self.generation,
            kind,
            request: SearchRequest {
                query: state.search.query().clone(),
                offset: state.search.offset(),
                page_size: self.policy.page_size(),
            },
        };
        self.status = FetchStatus::Fetching(ticket.clone());
        ticket
    }
}
