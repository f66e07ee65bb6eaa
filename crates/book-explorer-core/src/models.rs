//! Book data models shared by the catalog client, the state slices and the views.
//!
//! Two shapes flow through the system:
//!
//! - [`BookDetail`]: a catalog volume as the upstream API returns it. Every
//!   field is optional because the catalog omits whatever it does not know.
//! - [`BookSummary`]: the canonical reduced record held in application state.
//!   Produced only by [`normalize`](crate::normalize::normalize).
//!
//! Both serialize with the catalog's camelCase keys, so a summary can be fed
//! back into anything that accepts a raw volume.

use serde::{Deserialize, Serialize};

/// Free-form search form input. Blank fields are ignored by the query builder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub genre: String,
}

impl SearchParams {
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        genre: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            genre: genre.into(),
        }
    }

    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// True when every field is blank after trimming.
    pub fn is_blank(&self) -> bool {
        self.title.trim().is_empty()
            && self.author.trim().is_empty()
            && self.genre.trim().is_empty()
    }
}

/// Cover image links of a volume.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageLinks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub small_thumbnail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

/// Volume metadata as returned by the catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authors: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_links: Option<ImageLinks>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
}

/// A single catalog volume (`GET {base}/{id}` or an entry of a search page).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookDetail {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_info: Option<VolumeInfo>,
}

impl BookDetail {
    pub fn volume(&self) -> Option<&VolumeInfo> {
        self.volume_info.as_ref()
    }
}

/// One page of search results.
///
/// A missing `items` array deserializes to an empty vector: the catalog drops
/// the key entirely once `startIndex` runs past the last match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    #[serde(default)]
    pub items: Vec<BookDetail>,
    #[serde(default)]
    pub total_items: u64,
}

/// Thumbnail-only image links kept on a [`BookSummary`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryImageLinks {
    pub thumbnail: String,
}

/// The bounded volume fields kept on a [`BookSummary`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryVolumeInfo {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authors: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_links: Option<SummaryImageLinks>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,
}

/// Canonical book record held in [`BookCollection`](crate::collection::BookCollection).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookSummary {
    pub id: String,
    pub volume_info: SummaryVolumeInfo,
}

impl BookSummary {
    pub fn title(&self) -> &str {
        &self.volume_info.title
    }

    pub fn authors(&self) -> Option<&[String]> {
        self.volume_info.authors.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.volume_info.description.as_deref()
    }

    pub fn thumbnail(&self) -> Option<&str> {
        self.volume_info
            .image_links
            .as_ref()
            .map(|links| links.thumbnail.as_str())
    }

    pub fn published_date(&self) -> Option<&str> {
        self.volume_info.published_date.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_page_without_items_is_empty() {
        let page: SearchPage = serde_json::from_str(r#"{"kind":"books#volumes","totalItems":0}"#)
            .unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total_items, 0);
    }

    #[test]
    fn book_detail_ignores_unknown_fields() {
        let json = r#"{
            "kind": "books#volume",
            "id": "abc",
            "etag": "x",
            "volumeInfo": {
                "title": "Dune",
                "authors": ["Frank Herbert"],
                "pageCount": 412,
                "imageLinks": {"smallThumbnail": "s", "thumbnail": "t"},
                "language": "en"
            }
        }"#;
        let book: BookDetail = serde_json::from_str(json).unwrap();
        let info = book.volume().unwrap();
        assert_eq!(info.title.as_deref(), Some("Dune"));
        assert_eq!(info.page_count, Some(412));
        assert_eq!(
            info.image_links.as_ref().unwrap().thumbnail.as_deref(),
            Some("t")
        );
    }

    #[test]
    fn summary_omits_absent_fields() {
        let summary = BookSummary {
            id: "1".into(),
            volume_info: SummaryVolumeInfo {
                title: "T".into(),
                authors: None,
                description: None,
                image_links: None,
                published_date: Some("1965".into()),
            },
        };
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "id": "1",
                "volumeInfo": {"title": "T", "publishedDate": "1965"}
            })
        );
    }

    #[test]
    fn blank_params() {
        assert!(SearchParams::default().is_blank());
        assert!(SearchParams::new("  ", "", "\t").is_blank());
        assert!(!SearchParams::new("", "Herbert", "").is_blank());
    }
}
