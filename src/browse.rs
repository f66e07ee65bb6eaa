//! Interactive browsing session (`books browse`).
//!
//! The [`Browser`] owns the [`AppState`], the [`SearchOrchestrator`] and a
//! terminal [`Viewport`]. Catalog calls run on spawned tasks and report back
//! over an mpsc channel, as do scroll observers, so the loop is the only
//! writer of state.
//!
//! When input is not a terminal, every fetch is awaited before the next
//! line is read so scripted sessions produce deterministic output.

use std::io::Write;
use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use book_explorer_core::catalog::Catalog;
use book_explorer_core::collection::FavoriteToggle;
use book_explorer_core::error::CatalogError;
use book_explorer_core::models::{BookDetail, BookSummary, SearchPage, SearchParams};
use book_explorer_core::orchestrator::{
    AppState, Completion, FetchKind, FetchTicket, SearchOrchestrator, NO_RESULTS_MESSAGE,
};
use book_explorer_core::pagination::PaginationPolicy;
use book_explorer_core::scroll::{BottomProximity, ScrollPosition, Viewport};

use crate::config::BrowseConfig;
use crate::get::get_book;
use crate::render::{self, ViewMode};

const HELP: &str = "\
Commands:
  search title=<t> author=<a> genre=<g>   start a new search (any field may be omitted)
  more                                     load the next page
  scroll [lines]                           scroll down (default: one screen)
  view grid|list                           switch the result layout
  show <n|id>                              show details for result n or a catalog id
  fav <n|id>                               add or remove a favorite
  favorites                                list favorites
  reset                                    clear the search
  help                                     show this help
  quit                                     leave
";

/// Tunables for a browse session.
#[derive(Debug, Clone, Copy)]
pub struct BrowseSettings {
    pub policy: PaginationPolicy,
    pub trigger: BottomProximity,
    pub viewport_rows: usize,
    pub view: ViewMode,
}

impl BrowseSettings {
    pub fn from_config(config: &BrowseConfig) -> Self {
        Self {
            policy: PaginationPolicy::new(config.page_size),
            trigger: BottomProximity::new(config.scroll_threshold),
            viewport_rows: config.viewport_rows,
            view: config.view,
        }
    }
}

impl Default for BrowseSettings {
    fn default() -> Self {
        Self::from_config(&BrowseConfig::default())
    }
}

/// Which book a `show`/`fav` command refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// 1-based position in the current results.
    Index(usize),
    Id(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Search(SearchParams),
    More,
    Scroll(Option<usize>),
    View(ViewMode),
    Show(Target),
    Fav(Target),
    Favorites,
    Reset,
    Help,
    Quit,
}

/// Parse one input line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word {
        "" => return Ok(None),
        "search" | "s" => Command::Search(parse_search_args(rest)?),
        "more" | "m" => Command::More,
        "scroll" => {
            if rest.is_empty() {
                Command::Scroll(None)
            } else {
                let lines = rest
                    .parse::<usize>()
                    .map_err(|_| format!("scroll expects a number of lines, got '{}'", rest))?;
                Command::Scroll(Some(lines))
            }
        }
        "view" => Command::View(rest.parse()?),
        "show" => Command::Show(parse_target(rest)?),
        "fav" => Command::Fav(parse_target(rest)?),
        "favorites" | "favs" => Command::Favorites,
        "reset" => Command::Reset,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(format!("unknown command '{}': type 'help'", other)),
    };
    Ok(Some(command))
}

#[derive(Debug, Clone, Copy)]
enum Field {
    Title,
    Author,
    Genre,
}

fn field_mut(params: &mut SearchParams, field: Field) -> &mut String {
    match field {
        Field::Title => &mut params.title,
        Field::Author => &mut params.author,
        Field::Genre => &mut params.genre,
    }
}

/// `title=Dune Messiah author=Herbert`: a value runs until the next key.
fn parse_search_args(args: &str) -> Result<SearchParams, String> {
    let mut params = SearchParams::default();
    let mut current: Option<Field> = None;

    for word in args.split_whitespace() {
        let keyed = word.split_once('=').and_then(|(key, value)| {
            let field = match key {
                "title" => Field::Title,
                "author" => Field::Author,
                "genre" => Field::Genre,
                _ => return None,
            };
            Some((field, value))
        });

        if let Some((field, value)) = keyed {
            let slot = field_mut(&mut params, field);
            slot.clear();
            slot.push_str(value);
            current = Some(field);
            continue;
        }

        match current {
            Some(field) => {
                let slot = field_mut(&mut params, field);
                slot.push(' ');
                slot.push_str(word);
            }
            None => {
                return Err(format!(
                    "expected title=, author= or genre=, got '{}'",
                    word
                ))
            }
        }
    }
    Ok(params)
}

fn parse_target(arg: &str) -> Result<Target, String> {
    if arg.is_empty() {
        return Err("expected a result number or a book id".to_string());
    }
    Ok(match arg.parse::<usize>() {
        Ok(n) => Target::Index(n),
        Err(_) => Target::Id(arg.to_string()),
    })
}

/// Messages delivered to the loop by fetch tasks and scroll observers.
#[derive(Debug)]
pub enum Event {
    Fetched {
        ticket: FetchTicket,
        outcome: Result<SearchPage, CatalogError>,
    },
    Detail {
        id: String,
        outcome: Result<BookDetail, CatalogError>,
    },
    Scrolled(ScrollPosition),
}

pub struct Browser<W: Write> {
    catalog: Arc<dyn Catalog>,
    state: AppState,
    orchestrator: SearchOrchestrator,
    viewport: Viewport,
    view: ViewMode,
    events: UnboundedSender<Event>,
    pending_details: usize,
    out: W,
}

impl<W: Write> Browser<W> {
    pub fn new(
        catalog: Arc<dyn Catalog>,
        settings: BrowseSettings,
        events: UnboundedSender<Event>,
        out: W,
    ) -> Self {
        let mut viewport = Viewport::new(settings.viewport_rows);
        let scrolled = events.clone();
        viewport.subscribe(move |position| {
            if scrolled.send(Event::Scrolled(*position)).is_err() {
                tracing::debug!("browse loop gone, dropping scroll event");
            }
        });

        Self {
            catalog,
            state: AppState::new(),
            orchestrator: SearchOrchestrator::new(settings.policy, settings.trigger),
            viewport,
            view: settings.view,
            events,
            pending_details: 0,
            out,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// True while a search page or a detail fetch is outstanding.
    pub fn is_busy(&self) -> bool {
        self.orchestrator.is_fetching() || self.pending_details > 0
    }

    /// Handle one input line. Returns `false` when the session should end.
    pub fn handle_line(&mut self, line: &str) -> Result<bool> {
        let command = match parse_command(line) {
            Ok(Some(command)) => command,
            Ok(None) => return Ok(true),
            Err(message) => {
                writeln!(self.out, "! {}", message)?;
                return Ok(true);
            }
        };

        match command {
            Command::Search(params) => self.search(params)?,
            Command::More => self.more()?,
            Command::Scroll(lines) => self.scroll(lines)?,
            Command::View(view) => {
                self.view = view;
                let page = self.render_page();
                write!(self.out, "{}", page)?;
                self.refresh_document_height();
            }
            Command::Show(target) => self.show(target)?,
            Command::Fav(target) => self.toggle_favorite(target)?,
            Command::Favorites => {
                let favorites: Vec<BookSummary> = self.state.books.favorites().cloned().collect();
                write!(self.out, "{}", render::render_favorites(&favorites, self.view))?;
            }
            Command::Reset => {
                self.orchestrator.reset(&mut self.state);
                self.viewport.scroll_to_top();
                self.viewport.set_document_height(0);
                writeln!(self.out, "Search cleared.")?;
            }
            Command::Help => write!(self.out, "{}", HELP)?,
            Command::Quit => return Ok(false),
        }
        self.out.flush()?;
        Ok(true)
    }

    pub fn handle_event(&mut self, event: Event) -> Result<()> {
        match event {
            Event::Fetched { ticket, outcome } => self.fetched(ticket, outcome)?,
            Event::Detail { id, outcome } => {
                self.pending_details = self.pending_details.saturating_sub(1);
                match outcome {
                    Ok(book) => {
                        let favorite = self.state.books.is_favorite(&book.id);
                        write!(self.out, "{}", render::render_detail(&book, favorite, false))?;
                    }
                    Err(e) => {
                        tracing::debug!(id = %id, error = %e, "detail fetch failed");
                        write!(self.out, "{}", render::render_detail_error(e.message()))?;
                    }
                }
            }
            Event::Scrolled(position) => {
                if let Some(ticket) = self.orchestrator.on_scroll(&mut self.state, &position) {
                    writeln!(self.out, "{}", render::LOADING)?;
                    self.dispatch(ticket);
                }
            }
        }
        self.out.flush()?;
        Ok(())
    }

    fn search(&mut self, params: SearchParams) -> Result<()> {
        match self.orchestrator.submit(&mut self.state, params) {
            Err(e) => writeln!(self.out, "! {}", e)?,
            Ok(None) => writeln!(
                self.out,
                "Already showing results for {}",
                self.state.search.query()
            )?,
            Ok(Some(ticket)) => {
                self.viewport.scroll_to_top();
                self.viewport.set_document_height(0);
                writeln!(self.out, "{}", render::LOADING)?;
                self.dispatch(ticket);
            }
        }
        Ok(())
    }

    fn more(&mut self) -> Result<()> {
        if let Some(ticket) = self.orchestrator.load_more(&mut self.state) {
            writeln!(self.out, "{}", render::LOADING)?;
            self.dispatch(ticket);
        } else if self.state.search.query().is_empty() {
            writeln!(self.out, "Search for books first.")?;
        } else if self.orchestrator.is_fetching() {
            writeln!(self.out, "{}", render::LOADING)?;
        } else {
            writeln!(self.out, "{}", render::NO_MORE_BOOKS)?;
        }
        Ok(())
    }

    fn scroll(&mut self, lines: Option<usize>) -> Result<()> {
        let position = self.viewport.position();
        self.viewport
            .scroll_by(lines.unwrap_or(position.viewport_height));
        let position = self.viewport.position();
        writeln!(
            self.out,
            "-- rows {}-{} of {} --",
            position.scroll_y + 1,
            position.visible_bottom().min(position.document_height),
            position.document_height
        )?;
        Ok(())
    }

    fn show(&mut self, target: Target) -> Result<()> {
        let id = match self.resolve(&target) {
            Some(book) => book.id.clone(),
            None => match target {
                Target::Id(id) => id,
                Target::Index(n) => {
                    writeln!(self.out, "! no result number {}", n)?;
                    return Ok(());
                }
            },
        };

        self.pending_details += 1;
        let catalog = Arc::clone(&self.catalog);
        let events = self.events.clone();
        tokio::spawn(async move {
            let outcome = get_book(catalog.as_ref(), &id).await;
            if let Err(err) = events.send(Event::Detail { id, outcome }) {
                if let Event::Detail { id, .. } = err.0 {
                    tracing::debug!(id = %id, "browse loop gone, dropping book detail");
                }
            }
        });
        Ok(())
    }

    fn toggle_favorite(&mut self, target: Target) -> Result<()> {
        let book = match self.resolve(&target) {
            Some(book) => book.clone(),
            None => {
                writeln!(self.out, "! no book {} in the current results", describe(&target))?;
                return Ok(());
            }
        };

        match self.state.books.toggle_favorite(&book) {
            FavoriteToggle::Added => {
                writeln!(self.out, "♥ Added '{}' to favorites", book.title())?
            }
            FavoriteToggle::Removed => {
                writeln!(self.out, "♡ Removed '{}' from favorites", book.title())?
            }
        }
        Ok(())
    }

    /// Look a target up in the results, then in favorites.
    fn resolve(&self, target: &Target) -> Option<&BookSummary> {
        match target {
            Target::Index(n) => n
                .checked_sub(1)
                .and_then(|i| self.state.books.results().get(i)),
            Target::Id(id) => self
                .state
                .books
                .results()
                .iter()
                .find(|b| &b.id == id)
                .or_else(|| self.state.books.favorite(id)),
        }
    }

    fn dispatch(&self, ticket: FetchTicket) {
        tracing::debug!(
            generation = ticket.generation,
            offset = ticket.request.offset,
            "dispatching search fetch"
        );
        let catalog = Arc::clone(&self.catalog);
        let events = self.events.clone();
        tokio::spawn(async move {
            let outcome = catalog.search(&ticket.request).await;
            if let Err(err) = events.send(Event::Fetched { ticket, outcome }) {
                if let Event::Fetched { ticket, .. } = err.0 {
                    tracing::debug!(
                        generation = ticket.generation,
                        offset = ticket.request.offset,
                        "browse loop gone, dropping search page"
                    );
                }
            }
        });
    }

    fn fetched(&mut self, ticket: FetchTicket, outcome: Result<SearchPage, CatalogError>) -> Result<()> {
        let before = self.state.books.results().len();
        match self.orchestrator.complete(&mut self.state, &ticket, outcome) {
            Completion::Loaded { kind, has_more, .. } => {
                if kind == FetchKind::Initial {
                    if let Some(total) = self.orchestrator.total_items() {
                        writeln!(
                            self.out,
                            "Results for {} (about {} books)\n",
                            ticket.request.query, total
                        )?;
                    }
                }
                let start = if kind == FetchKind::Initial { 0 } else { before };
                let books = &self.state.books.results()[start..];
                let favorites = &self.state.books;
                let rendered =
                    render::render_books_from(books, start + 1, self.view, |id| favorites.is_favorite(id));
                write!(self.out, "{}", rendered)?;
                if !has_more {
                    writeln!(self.out, "{}", render::NO_MORE_BOOKS)?;
                }
            }
            Completion::Exhausted {
                kind: FetchKind::Initial,
            } => writeln!(self.out, "! {}", NO_RESULTS_MESSAGE)?,
            Completion::Exhausted {
                kind: FetchKind::Continuation,
            } => writeln!(self.out, "{}", render::NO_MORE_BOOKS)?,
            Completion::Failed { message } => writeln!(self.out, "! {}", message)?,
            Completion::Stale => return Ok(()),
        }
        self.refresh_document_height();
        Ok(())
    }

    fn render_page(&self) -> String {
        let favorites = &self.state.books;
        render::render_results(
            self.state.books.results(),
            self.view,
            |id| favorites.is_favorite(id),
            self.orchestrator.is_fetching(),
            self.state.search.has_more(),
            self.orchestrator.error(),
        )
    }

    fn refresh_document_height(&mut self) {
        let height = render::line_count(&self.render_page());
        self.viewport.set_document_height(height);
    }
}

fn describe(target: &Target) -> String {
    match target {
        Target::Index(n) => format!("number {}", n),
        Target::Id(id) => format!("'{}'", id),
    }
}

/// Process queued events, then wait until nothing is in flight.
async fn settle<W: Write>(browser: &mut Browser<W>, events: &mut UnboundedReceiver<Event>) -> Result<()> {
    loop {
        while let Ok(event) = events.try_recv() {
            browser.handle_event(event)?;
        }
        if !browser.is_busy() {
            return Ok(());
        }
        match events.recv().await {
            Some(event) => browser.handle_event(event)?,
            None => return Ok(()),
        }
    }
}

/// Run a browse session reading commands from `input` and writing to `out`.
///
/// `interactive` selects the fully asynchronous loop; otherwise each
/// command's fetches finish before the next line is read.
pub async fn browse<R, W>(
    catalog: Arc<dyn Catalog>,
    settings: BrowseSettings,
    input: R,
    out: W,
    interactive: bool,
) -> Result<W>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut browser = Browser::new(catalog, settings, tx, out);
    let mut lines = input.lines();

    writeln!(browser.out, "Book Explorer. Type 'help' for commands.")?;
    loop {
        if !interactive {
            settle(&mut browser, &mut rx).await?;
        } else {
            write!(browser.out, "> ")?;
            browser.out.flush()?;
        }

        tokio::select! {
            line = lines.next_line() => {
                match line? {
                    Some(line) => {
                        if !browser.handle_line(&line)? {
                            break;
                        }
                    }
                    None => break,
                }
            }
            Some(event) = rx.recv() => browser.handle_event(event)?,
        }
    }

    Ok(browser.into_output())
}

/// CLI entry point for `books browse`, wired to stdin/stdout.
pub async fn run_browse(catalog: Arc<dyn Catalog>, settings: BrowseSettings) -> Result<()> {
    let interactive = atty::is(atty::Stream::Stdin);
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    browse(catalog, settings, stdin, std::io::stdout(), interactive).await?;
    Ok(())
}
