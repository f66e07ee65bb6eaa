//! Combined catalog query construction.
//!
//! The search form has three independent fields. The catalog expects them
//! folded into a single `q` parameter using its field operators:
//!
//! ```text
//! intitle:<title>+inauthor:<author>+subject:<genre>
//! ```
//!
//! Blank fields are omitted; the order is always title, author, genre.

use std::fmt;

use serde::Serialize;

use crate::models::SearchParams;

const TITLE_OPERATOR: &str = "intitle:";
const AUTHOR_OPERATOR: &str = "inauthor:";
const SUBJECT_OPERATOR: &str = "subject:";
const TERM_SEPARATOR: &str = "+";

/// A query string in the catalog's operator syntax.
///
/// The empty query is the session's initial value and is never sent upstream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CombinedQuery(String);

impl CombinedQuery {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for CombinedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CombinedQuery {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Fold the form fields into a [`CombinedQuery`].
///
/// ```rust
/// use book_explorer_core::models::SearchParams;
/// use book_explorer_core::query::build_query;
///
/// let q = build_query(&SearchParams::new("Dune", "", "science fiction"));
/// assert_eq!(q.as_str(), "intitle:Dune+subject:science fiction");
/// assert!(build_query(&SearchParams::default()).is_empty());
/// ```
pub fn build_query(params: &SearchParams) -> CombinedQuery {
    let terms: Vec<String> = [
        (TITLE_OPERATOR, params.title.trim()),
        (AUTHOR_OPERATOR, params.author.trim()),
        (SUBJECT_OPERATOR, params.genre.trim()),
    ]
    .into_iter()
    .filter(|(_, value)| !value.is_empty())
    .map(|(operator, value)| format!("{operator}{value}"))
    .collect();

    CombinedQuery(terms.join(TERM_SEPARATOR))
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn title_only() {
        let q = build_query(&SearchParams::title("Dune"));
        assert_eq!(q.as_str(), "intitle:Dune");
    }

    #[test]
    fn all_fields_in_fixed_order() {
        let q = build_query(&SearchParams::new("Dune", "Herbert", "fiction"));
        assert_eq!(q.as_str(), "intitle:Dune+inauthor:Herbert+subject:fiction");
    }

    #[test]
    fn skips_blank_middle_field() {
        let q = build_query(&SearchParams::new("Dune", "   ", "fiction"));
        assert_eq!(q.as_str(), "intitle:Dune+subject:fiction");
    }

    #[test]
    fn trims_values() {
        let q = build_query(&SearchParams::new("", " Le Guin ", ""));
        assert_eq!(q.as_str(), "inauthor:Le Guin");
    }

    #[test]
    fn empty_params_give_empty_query() {
        assert!(build_query(&SearchParams::default()).is_empty());
        assert!(build_query(&SearchParams::new(" ", "\t", "")).is_empty());
    }

    fn field() -> impl Strategy<Value = String> {
        prop_oneof![Just(String::new()), "[A-Za-z][A-Za-z ]{0,10}"]
    }

    proptest! {
        #[test]
        fn query_has_exactly_the_non_blank_terms(
            title in field(),
            author in field(),
            genre in field(),
        ) {
            let params = SearchParams::new(title.clone(), author.clone(), genre.clone());
            let q = build_query(&params);

            let mut expected = Vec::new();
            if !title.trim().is_empty() {
                expected.push(format!("intitle:{}", title.trim()));
            }
            if !author.trim().is_empty() {
                expected.push(format!("inauthor:{}", author.trim()));
            }
            if !genre.trim().is_empty() {
                expected.push(format!("subject:{}", genre.trim()));
            }

            prop_assert_eq!(q.as_str(), expected.join("+"));
            prop_assert_eq!(q.is_empty(), params.is_blank());
        }
    }
}
