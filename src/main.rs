//! # Book Explorer CLI (`books`)
//!
//! Search the book catalog, show book details, or start an interactive
//! browsing session with scroll-triggered paging and favorites.
//!
//! ## Usage
//!
//! ```bash
//! books --config ./config/books.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `books search` | Search by title, author and/or genre |
//! | `books get <id>` | Show the details of one book |
//! | `books browse` | Interactive session: search, scroll, favorites |
//!
//! ## Examples
//!
//! ```bash
//! # First page of results for a title
//! books search --title "dune"
//!
//! # Three pages as JSON, progress on stderr
//! books search --author "le guin" --pages 3 --json --progress json
//!
//! # Full description of one volume
//! books get zyTCAlFPjgYC --full
//!
//! # Scripted browsing session
//! printf 'search title=dune\nscroll 200\nfav 1\nfavorites\n' | books browse
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use book_explorer::browse::{self, BrowseSettings};
use book_explorer::catalog_http::GoogleBooksClient;
use book_explorer::config;
use book_explorer::get;
use book_explorer::progress::ProgressMode;
use book_explorer::render::ViewMode;
use book_explorer::search;
use book_explorer_core::catalog::Catalog;
use book_explorer_core::models::SearchParams;
use book_explorer_core::pagination::PaginationPolicy;

/// Book Explorer: search a public book catalog from the terminal.
#[derive(Parser)]
#[command(name = "books", version, about)]
struct Cli {
    /// Path to the TOML configuration file.
    ///
    /// Defaults to `./config/books.toml`; built-in defaults are used when
    /// that file does not exist.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace). `RUST_LOG`
    /// takes precedence.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search the catalog.
    ///
    /// Fields are combined as `intitle:<title>+inauthor:<author>+subject:<genre>`;
    /// at least one must be non-empty.
    Search {
        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        author: Option<String>,

        /// Subject / category.
        #[arg(long)]
        genre: Option<String>,

        /// Maximum number of pages to fetch. Stops early at the last page.
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        pages: u32,

        /// Result layout. Defaults to `[browse].view` from config.
        #[arg(long, value_enum)]
        view: Option<ViewMode>,

        /// Print the results as a JSON array instead of rendering them.
        #[arg(long)]
        json: bool,

        /// Progress output on stderr. Defaults to `human` on a terminal, `off` otherwise.
        #[arg(long, value_enum)]
        progress: Option<ProgressMode>,
    },

    /// Show the details of a book by its catalog id.
    Get {
        /// Catalog volume id.
        id: String,

        /// Show the whole description instead of the first 200 characters.
        #[arg(long)]
        full: bool,

        /// Print the raw volume as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Start an interactive browsing session on stdin.
    ///
    /// Type `help` inside the session for the list of commands.
    Browse {
        /// Initial result layout. Defaults to `[browse].view` from config.
        #[arg(long, value_enum)]
        view: Option<ViewMode>,
    },
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "error",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cfg = config::resolve_config(cli.config.as_deref())?;
    let catalog: Arc<dyn Catalog> = Arc::new(GoogleBooksClient::new(&cfg.catalog)?);

    match cli.command {
        Commands::Search {
            title,
            author,
            genre,
            pages,
            view,
            json,
            progress,
        } => {
            let params = SearchParams::new(
                title.unwrap_or_default(),
                author.unwrap_or_default(),
                genre.unwrap_or_default(),
            );
            let reporter = progress
                .unwrap_or_else(ProgressMode::default_for_tty)
                .reporter();
            search::run_search(
                catalog.as_ref(),
                PaginationPolicy::new(cfg.browse.page_size),
                params,
                pages as usize,
                view.unwrap_or(cfg.browse.view),
                json,
                reporter.as_ref(),
            )
            .await?;
        }
        Commands::Get { id, full, json } => {
            get::run_get(catalog.as_ref(), &id, full, json).await?;
        }
        Commands::Browse { view } => {
            let mut settings = BrowseSettings::from_config(&cfg.browse);
            if let Some(view) = view {
                settings.view = view;
            }
            browse::run_browse(catalog, settings).await?;
        }
    }

    Ok(())
}
