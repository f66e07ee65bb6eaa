//! Book state: the current result list and the favorites set.
//!
//! Results keep fetch order and are never deduplicated (if the catalog
//! repeats a volume across pages, so does the list). Favorites are an
//! insertion-ordered set keyed by volume id.

use indexmap::IndexMap;
use serde::Serialize;

use crate::models::BookSummary;
use crate::normalize::{normalize, BookLike};

/// Reducer actions for [`BookCollection`].
#[derive(Debug, Clone)]
pub enum BookAction {
    /// Replace the result list with a freshly fetched first page.
    ReplaceResults(Vec<BookSummary>),
    /// Append a continuation page.
    AppendResults(Vec<BookSummary>),
    ClearResults,
    AddFavorite(BookSummary),
    RemoveFavorite(String),
}

/// Outcome of [`BookCollection::toggle_favorite`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoriteToggle {
    Added,
    Removed,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BookCollection {
    results: Vec<BookSummary>,
    favorites: IndexMap<String, BookSummary>,
}

impl BookCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one reducer action.
    ///
    /// Summaries are re-normalized on the way in, so no entry path can
    /// bypass the canonical shape.
    pub fn apply(&mut self, action: BookAction) {
        match action {
            BookAction::ReplaceResults(books) => {
                self.results = books.iter().map(normalize).collect();
            }
            BookAction::AppendResults(books) => {
                self.results.extend(books.iter().map(normalize));
            }
            BookAction::ClearResults => self.results.clear(),
            BookAction::AddFavorite(book) => {
                if !self.favorites.contains_key(&book.id) {
                    self.favorites.insert(book.id.clone(), normalize(&book));
                }
            }
            BookAction::RemoveFavorite(id) => {
                self.favorites.shift_remove(&id);
            }
        }
    }

    pub fn results(&self) -> &[BookSummary] {
        &self.results
    }

    pub fn favorites(&self) -> impl ExactSizeIterator<Item = &BookSummary> {
        self.favorites.values()
    }

    pub fn favorites_len(&self) -> usize {
        self.favorites.len()
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.favorites.contains_key(id)
    }

    pub fn favorite(&self, id: &str) -> Option<&BookSummary> {
        self.favorites.get(id)
    }

    /// Add a book to favorites. A no-op if the id is already present.
    pub fn add_favorite<B: BookLike + ?Sized>(&mut self, book: &B) {
        self.apply(BookAction::AddFavorite(normalize(book)));
    }

    /// Remove a favorite by id. Removing a non-member is a no-op.
    pub fn remove_favorite(&mut self, id: &str) {
        self.apply(BookAction::RemoveFavorite(id.to_string()));
    }

    /// Remove the book if it is a favorite, otherwise add it.
    pub fn toggle_favorite<B: BookLike + ?Sized>(&mut self, book: &B) -> FavoriteToggle {
        if self.is_favorite(book.id()) {
            self.remove_favorite(book.id());
            FavoriteToggle::Removed
        } else {
            self.add_favorite(book);
            FavoriteToggle::Added
        }
    }
}
