//! Search state: combined query, pagination cursor, and the "more results
//! may exist" flag.

use serde::Serialize;

use crate::models::SearchParams;
use crate::query::CombinedQuery;

/// Reducer actions for [`SearchSession`].
#[derive(Debug, Clone)]
pub enum SessionAction {
    /// Remember the raw form fields.
    SetParams(SearchParams),
    /// Switch to a new query: offset back to 0, `has_more` back to true.
    SetQuery(CombinedQuery),
    /// Move the cursor forward by one page.
    AdvanceOffset(usize),
    SetHasMore(bool),
    Reset,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchSession {
    query: CombinedQuery,
    offset: usize,
    has_more: bool,
    params: SearchParams,
}

impl Default for SearchSession {
    fn default() -> Self {
        Self {
            query: CombinedQuery::default(),
            offset: 0,
            has_more: true,
            params: SearchParams::default(),
        }
    }
}

impl SearchSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, action: SessionAction) {
        match action {
            SessionAction::SetParams(params) => self.params = params,
            SessionAction::SetQuery(query) => {
                self.query = query;
                self.offset = 0;
                self.has_more = true;
            }
            SessionAction::AdvanceOffset(page_size) => self.offset += page_size,
            SessionAction::SetHasMore(has_more) => self.has_more = has_more,
            SessionAction::Reset => *self = Self::default(),
        }
    }

    pub fn query(&self) -> &CombinedQuery {
        &self.query
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn params(&self) -> &SearchParams {
        &self.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::build_query;

    #[test]
    fn initial_state() {
        let session = SearchSession::new();
        assert!(session.query().is_empty());
        assert_eq!(session.offset(), 0);
        assert!(session.has_more());
    }

    #[test]
    fn new_query_resets_cursor() {
        let mut session = SearchSession::new();
        session.apply(SessionAction::SetQuery(build_query(&SearchParams::title("a"))));
        session.apply(SessionAction::AdvanceOffset(20));
        session.apply(SessionAction::AdvanceOffset(20));
        session.apply(SessionAction::SetHasMore(false));
        assert_eq!(session.offset(), 40);

        session.apply(SessionAction::SetQuery(build_query(&SearchParams::title("b"))));
        assert_eq!(session.query().as_str(), "intitle:b");
        assert_eq!(session.offset(), 0);
        assert!(session.has_more());
    }

    #[test]
    fn reset_returns_to_initial() {
        let mut session = SearchSession::new();
        session.apply(SessionAction::SetParams(SearchParams::title("Dune")));
        session.apply(SessionAction::SetQuery(build_query(&SearchParams::title("Dune"))));
        session.apply(SessionAction::AdvanceOffset(20));
        session.apply(SessionAction::Reset);
        assert_eq!(session, SearchSession::default());
    }
}
