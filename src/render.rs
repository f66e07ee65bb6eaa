//! Terminal views: result grid and list, the detail panel, favorites, and
//! the empty/status lines around them.
//!
//! Every function returns a `String` so callers decide where it goes, and
//! so the line count can feed the viewport's document height.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use book_explorer_core::models::{BookDetail, BookSummary};
use book_explorer_core::normalize::UNTITLED;

pub const NO_BOOKS: &str = "No books found. Try a different search.";
pub const NO_FAVORITES: &str = "No favorite books yet. Start adding some!";
pub const LOADING: &str = "Loading books...";
pub const NO_MORE_BOOKS: &str = "No more books to show";
pub const UNKNOWN_AUTHOR: &str = "Unknown Author";
pub const NO_DESCRIPTION: &str = "No description available";

/// Collapsed detail descriptions are cut to this many characters.
pub const DESCRIPTION_PREVIEW_CHARS: usize = 200;

const CARD_WIDTH: usize = 28;
const GRID_COLUMNS: usize = 3;
const CARD_DESCRIPTION_LINES: usize = 2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}

impl std::str::FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "grid" => Ok(ViewMode::Grid),
            "list" => Ok(ViewMode::List),
            other => Err(format!("unknown view mode '{}': use grid or list", other)),
        }
    }
}

/// Render a list of books in the given mode, numbering entries from 1.
///
/// `is_favorite` decides the heart marker.
pub fn render_books(
    books: &[BookSummary],
    mode: ViewMode,
    is_favorite: impl Fn(&str) -> bool,
) -> String {
    render_books_from(books, 1, mode, is_favorite)
}

/// Like [`render_books`], numbering from `first` (used for appended pages).
pub fn render_books_from(
    books: &[BookSummary],
    first: usize,
    mode: ViewMode,
    is_favorite: impl Fn(&str) -> bool,
) -> String {
    match mode {
        ViewMode::Grid => render_grid(books, first, &is_favorite),
        ViewMode::List => render_list(books, first, &is_favorite),
    }
}

fn authors_line(book: &BookSummary) -> String {
    match book.authors() {
        Some(authors) if !authors.is_empty() => authors.join(", "),
        _ => UNKNOWN_AUTHOR.to_string(),
    }
}

fn heart(favorite: bool) -> &'static str {
    if favorite {
        "♥"
    } else {
        "♡"
    }
}

fn render_grid(books: &[BookSummary], first: usize, is_favorite: &dyn Fn(&str) -> bool) -> String {
    let mut out = String::new();
    for (row_index, row) in books.chunks(GRID_COLUMNS).enumerate() {
        let cards: Vec<Vec<String>> = row
            .iter()
            .enumerate()
            .map(|(i, book)| card(first + row_index * GRID_COLUMNS + i, book, is_favorite(&book.id)))
            .collect();
        let height = cards.iter().map(Vec::len).max().unwrap_or(0);
        for line in 0..height {
            let joined: Vec<String> = cards
                .iter()
                .map(|c| pad(c.get(line).map(String::as_str).unwrap_or(""), CARD_WIDTH))
                .collect();
            out.push_str(joined.join("  ").trim_end());
            out.push('\n');
        }
        out.push('\n');
    }
    out
}

fn card(number: usize, book: &BookSummary, favorite: bool) -> Vec<String> {
    let mut lines = vec![
        format!("┌{}", "─".repeat(CARD_WIDTH - 1)),
        fit(&format!("│ {}. {}", number, book.title()), CARD_WIDTH),
        fit(&format!("│ {}", authors_line(book)), CARD_WIDTH),
    ];
    let description = book
        .description()
        .map(strip_html)
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| NO_DESCRIPTION.to_string());
    for chunk in wrap(&description, CARD_WIDTH - 2)
        .into_iter()
        .take(CARD_DESCRIPTION_LINES)
    {
        lines.push(fit(&format!("│ {}", chunk), CARD_WIDTH));
    }
    lines.push(fit(
        &format!("│ {} {}", heart(favorite), book.id),
        CARD_WIDTH,
    ));
    lines.push(format!("└{}", "─".repeat(CARD_WIDTH - 1)));
    lines
}

fn render_list(books: &[BookSummary], first: usize, is_favorite: &dyn Fn(&str) -> bool) -> String {
    let mut out = String::new();
    for (i, book) in books.iter().enumerate() {
        out.push_str(&format!(
            "{:>3}. {} {}  [{}]\n",
            first + i,
            heart(is_favorite(&book.id)),
            book.title(),
            book.id
        ));
        out.push_str(&format!("     {}\n", authors_line(book)));
        let description = book
            .description()
            .map(strip_html)
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| NO_DESCRIPTION.to_string());
        if let Some(first) = wrap(&description, 72).into_iter().next() {
            out.push_str(&format!("     {}\n", first));
        }
        if let Some(date) = book.published_date() {
            out.push_str(&format!("     {}\n", date));
        }
        out.push('\n');
    }
    out
}

/// Render the search page body: books, or the empty state, plus the footer.
pub fn render_results(
    books: &[BookSummary],
    mode: ViewMode,
    is_favorite: impl Fn(&str) -> bool,
    loading: bool,
    has_more: bool,
    message: Option<&str>,
) -> String {
    let mut out = String::new();
    if let Some(message) = message {
        out.push_str(&format!("! {}\n\n", message));
    }
    if books.is_empty() {
        if !loading && message.is_none() {
            out.push_str(NO_BOOKS);
            out.push('\n');
        }
    } else {
        out.push_str(&render_books(books, mode, is_favorite));
    }
    if loading {
        out.push_str(LOADING);
        out.push('\n');
    } else if !has_more && !books.is_empty() {
        out.push_str(NO_MORE_BOOKS);
        out.push('\n');
    }
    out
}

/// Render the favorites page.
pub fn render_favorites(favorites: &[BookSummary], mode: ViewMode) -> String {
    let mut out = String::from("My Favorite Books\n\n");
    if favorites.is_empty() {
        out.push_str(NO_FAVORITES);
        out.push('\n');
    } else {
        out.push_str(&render_books(favorites, mode, |_| true));
    }
    out
}

/// Render the detail panel for a single volume.
pub fn render_detail(book: &BookDetail, favorite: bool, full_description: bool) -> String {
    let info = book.volume_info.clone().unwrap_or_default();
    let mut out = String::new();

    let title = info
        .title
        .as_deref()
        .filter(|t| !t.is_empty())
        .unwrap_or(UNTITLED);
    out.push_str(&format!("{}\n", title));
    out.push_str(&format!(
        "{}\n\n",
        info.authors
            .as_ref()
            .filter(|a| !a.is_empty())
            .map(|a| a.join(", "))
            .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string())
    ));

    if let Some(date) = &info.published_date {
        out.push_str(&format!("Published:  {}\n", date));
    }
    if let Some(publisher) = &info.publisher {
        out.push_str(&format!("Publisher:  {}\n", publisher));
    }
    if let Some(pages) = info.page_count {
        out.push_str(&format!("Pages:      {}\n", pages));
    }
    if let Some(categories) = &info.categories {
        out.push_str(&format!("Categories: {}\n", categories.join(", ")));
    }
    if let Some(thumbnail) = info.image_links.as_ref().and_then(|l| l.thumbnail.as_ref()) {
        out.push_str(&format!("Cover:      {}\n", thumbnail));
    }

    out.push_str("\nDescription\n");
    let description = match info.description.as_deref() {
        Some(raw) if full_description => strip_html(raw),
        Some(raw) => truncate_description(raw, DESCRIPTION_PREVIEW_CHARS),
        None => NO_DESCRIPTION.to_string(),
    };
    out.push_str(&description);
    out.push('\n');
    if !full_description
        && info
            .description
            .as_deref()
            .is_some_and(|d| d.chars().count() > DESCRIPTION_PREVIEW_CHARS)
    {
        out.push_str("(use --full to show the whole description)\n");
    }

    out.push_str(&format!(
        "\n{} {}\n",
        heart(favorite),
        if favorite {
            "In Favorites"
        } else {
            "Not in Favorites"
        }
    ));
    out
}

/// Error panel shown when a detail fetch fails.
pub fn render_detail_error(message: &str) -> String {
    format!("{}\n← Return to search\n", message)
}

/// Strip tags and cut to `max_chars`, appending `...` when cut.
pub fn truncate_description(text: &str, max_chars: usize) -> String {
    let clean = strip_html(text);
    if clean.is_empty() {
        return NO_DESCRIPTION.to_string();
    }
    if clean.chars().count() <= max_chars {
        return clean;
    }
    let cut: String = clean.chars().take(max_chars).collect();
    format!("{}...", cut)
}

/// Remove anything between `<` and `>`.
pub fn strip_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_tag = false;
    for c in text.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn fit(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let cut: String = text.chars().take(width.saturating_sub(1)).collect();
    format!("{}…", cut)
}

fn pad(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len >= width {
        text.to_string()
    } else {
        format!("{}{}", text, " ".repeat(width - len))
    }
}

/// Number of terminal lines a rendered block occupies.
pub fn line_count(rendered: &str) -> usize {
    rendered.lines().count()
}
