//! Book retrieval by catalog id.
//!
//! Fetches a single volume for the detail view. Used by the `books get` CLI
//! command and the `show` command of `books browse`.

use anyhow::Result;

use book_explorer_core::catalog::Catalog;
use book_explorer_core::error::CatalogError;
use book_explorer_core::models::BookDetail;

use crate::render;

/// Fetch a volume by id.
pub async fn get_book(catalog: &dyn Catalog, id: &str) -> Result<BookDetail, CatalogError> {
    let id = id.trim();
    tracing::debug!(id, "fetching book detail");
    catalog.fetch_by_id(id).await
}

/// CLI entry point: calls [`get_book`] and prints to stdout.
///
/// With `--json` the raw volume is printed; otherwise the detail view.
pub async fn run_get(catalog: &dyn Catalog, id: &str, full: bool, json: bool) -> Result<()> {
    let book = match get_book(catalog, id).await {
        Ok(b) => b,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&book)?);
    } else {
        print!("{}", render::render_detail(&book, false, full));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use book_explorer_core::catalog::memory::InMemoryCatalog;
    use book_explorer_core::models::VolumeInfo;

    use super::*;

    fn catalog() -> InMemoryCatalog {
        InMemoryCatalog::new(vec![BookDetail {
            id: "emma".into(),
            volume_info: Some(VolumeInfo {
                title: Some("Emma".into()),
                publisher: Some("John Murray".into()),
                ..VolumeInfo::default()
            }),
        }])
    }

    #[tokio::test]
    async fn finds_by_trimmed_id() {
        let book = get_book(&catalog(), "  emma ").await.unwrap();
        assert_eq!(book.volume().unwrap().title.as_deref(), Some("Emma"));
    }

    #[tokio::test]
    async fn missing_id_is_an_error() {
        let err = get_book(&catalog(), "nope").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn failure_without_message_uses_fallback() {
        let catalog = catalog();
        catalog.fail_with(Some(500), None);
        let err = get_book(&catalog, "emma").await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to fetch book");
    }
}
