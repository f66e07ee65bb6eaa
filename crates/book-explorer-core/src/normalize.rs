//! Book normalization.
//!
//! Every book entering application state goes through [`normalize`], whether
//! it arrives as a fresh search page, an appended page, or a favorite-add.
//! Only the title gets a placeholder; other absent fields stay absent so
//! that "is this field present" checks downstream remain meaningful.

use crate::models::{BookDetail, BookSummary, SummaryImageLinks, SummaryVolumeInfo};

/// Placeholder used when the catalog has no (or an empty) title.
pub const UNTITLED: &str = "No title available";

/// Read access to the fields [`normalize`] keeps.
///
/// Implemented for raw catalog volumes and for already-normalized summaries,
/// which is what makes normalization idempotent.
pub trait BookLike {
    fn id(&self) -> &str;
    fn title(&self) -> Option<&str>;
    fn authors(&self) -> Option<&[String]>;
    fn description(&self) -> Option<&str>;
    fn thumbnail(&self) -> Option<&str>;
    fn published_date(&self) -> Option<&str>;
}

impl BookLike for BookDetail {
    fn id(&self) -> &str {
        &self.id
    }

    fn title(&self) -> Option<&str> {
        self.volume().and_then(|v| v.title.as_deref())
    }

    fn authors(&self) -> Option<&[String]> {
        self.volume().and_then(|v| v.authors.as_deref())
    }

    fn description(&self) -> Option<&str> {
        self.volume().and_then(|v| v.description.as_deref())
    }

    fn thumbnail(&self) -> Option<&str> {
        self.volume()
            .and_then(|v| v.image_links.as_ref())
            .and_then(|links| links.thumbnail.as_deref())
    }

    fn published_date(&self) -> Option<&str> {
        self.volume().and_then(|v| v.published_date.as_deref())
    }
}

impl BookLike for BookSummary {
    fn id(&self) -> &str {
        &self.id
    }

    fn title(&self) -> Option<&str> {
        Some(BookSummary::title(self))
    }

    fn authors(&self) -> Option<&[String]> {
        BookSummary::authors(self)
    }

    fn description(&self) -> Option<&str> {
        BookSummary::description(self)
    }

    fn thumbnail(&self) -> Option<&str> {
        BookSummary::thumbnail(self)
    }

    fn published_date(&self) -> Option<&str> {
        BookSummary::published_date(self)
    }
}

/// Reduce any book-like value to the canonical [`BookSummary`].
pub fn normalize<B: BookLike + ?Sized>(book: &B) -> BookSummary {
    let title = match book.title() {
        Some(title) if !title.is_empty() => title.to_string(),
        _ => UNTITLED.to_string(),
    };

    BookSummary {
        id: book.id().to_string(),
        volume_info: SummaryVolumeInfo {
            title,
            authors: book.authors().map(<[String]>::to_vec),
            description: book.description().map(str::to_string),
            image_links: book.thumbnail().map(|thumbnail| SummaryImageLinks {
                thumbnail: thumbnail.to_string(),
            }),
            published_date: book.published_date().map(str::to_string),
        },
    }
}

/// Normalize a batch, preserving order.
pub fn normalize_all<'a, B, I>(books: I) -> Vec<BookSummary>
where
    B: BookLike + 'a,
    I: IntoIterator<Item = &'a B>,
{
    books.into_iter().map(|book| normalize(book)).collect()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::models::{ImageLinks, VolumeInfo};

    fn detail(id: &str, info: Option<VolumeInfo>) -> BookDetail {
        BookDetail {
            id: id.to_string(),
            volume_info: info,
        }
    }

    #[test]
    fn missing_title_gets_placeholder() {
        let summary = normalize(&detail("a", Some(VolumeInfo::default())));
        assert_eq!(summary.title(), UNTITLED);
    }

    #[test]
    fn empty_title_gets_placeholder() {
        let info = VolumeInfo {
            title: Some(String::new()),
            ..VolumeInfo::default()
        };
        assert_eq!(normalize(&detail("a", Some(info))).title(), UNTITLED);
    }

    #[test]
    fn missing_volume_info_is_tolerated() {
        let summary = normalize(&detail("a", None));
        assert_eq!(summary.id, "a");
        assert_eq!(summary.title(), UNTITLED);
        assert!(summary.authors().is_none());
    }

    #[test]
    fn keeps_bounded_fields_and_drops_the_rest() {
        let info = VolumeInfo {
            title: Some("Dune".into()),
            authors: Some(vec!["Frank Herbert".into()]),
            description: Some("Spice.".into()),
            image_links: Some(ImageLinks {
                small_thumbnail: Some("small".into()),
                thumbnail: Some("thumb".into()),
            }),
            published_date: Some("1965".into()),
            publisher: Some("Chilton".into()),
            page_count: Some(412),
            categories: Some(vec!["Fiction".into()]),
        };
        let summary = normalize(&detail("dune", Some(info)));
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "id": "dune",
                "volumeInfo": {
                    "title": "Dune",
                    "authors": ["Frank Herbert"],
                    "description": "Spice.",
                    "imageLinks": {"thumbnail": "thumb"},
                    "publishedDate": "1965"
                }
            })
        );
    }

    #[test]
    fn image_links_without_thumbnail_are_dropped() {
        let info = VolumeInfo {
            title: Some("T".into()),
            image_links: Some(ImageLinks {
                small_thumbnail: Some("small".into()),
                thumbnail: None,
            }),
            ..VolumeInfo::default()
        };
        assert!(normalize(&detail("x", Some(info))).thumbnail().is_none());
    }

    #[test]
    fn empty_optional_fields_pass_through_unchanged() {
        let info = VolumeInfo {
            title: Some("T".into()),
            description: Some(String::new()),
            authors: Some(Vec::new()),
            ..VolumeInfo::default()
        };
        let summary = normalize(&detail("x", Some(info)));
        assert_eq!(summary.description(), Some(""));
        assert_eq!(summary.authors(), Some(&[][..]));
    }

    fn opt_text() -> impl Strategy<Value = Option<String>> {
        proptest::option::of("[a-z ]{0,6}")
    }

    fn arb_detail() -> impl Strategy<Value = BookDetail> {
        (
            "[a-z0-9]{1,8}",
            opt_text(),
            proptest::option::of(proptest::collection::vec("[A-Za-z]{1,6}", 0..3)),
            opt_text(),
            opt_text(),
            opt_text(),
            opt_text(),
        )
            .prop_map(
                |(id, title, authors, description, thumbnail, small, published_date)| BookDetail {
                    id,
                    volume_info: Some(VolumeInfo {
                        title,
                        authors,
                        description,
                        image_links: Some(ImageLinks {
                            small_thumbnail: small,
                            thumbnail,
                        }),
                        published_date,
                        ..VolumeInfo::default()
                    }),
                },
            )
    }

    proptest! {
        #[test]
        fn normalize_is_idempotent(book in arb_detail()) {
            let once = normalize(&book);
            let twice = normalize(&once);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn summary_survives_a_json_round_trip_through_the_raw_shape(book in arb_detail()) {
            let once = normalize(&book);
            let raw: BookDetail =
                serde_json::from_value(serde_json::to_value(&once).unwrap()).unwrap();
            prop_assert_eq!(normalize(&raw), once);
        }
    }
}
