//! Fetch progress reporting.
//!
//! Reports what `books search` is fetching so users see which page is in
//! flight and how many books have arrived. Progress is emitted on **stderr**
//! so stdout remains parseable for scripts (`--json`).

use std::io::Write;

use clap::ValueEnum;

/// A single progress event for a paged search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FetchProgressEvent {
    /// A page request was sent.
    Requesting { query: String, page: usize, offset: usize },
    /// A page arrived. `loaded` is the running total of results held.
    Loaded {
        query: String,
        page: usize,
        count: usize,
        loaded: usize,
        total_items: Option<u64>,
    },
    /// The catalog has no more pages for this query.
    Exhausted { query: String, loaded: usize },
}

pub trait FetchProgressReporter: Send + Sync {
    fn report(&self, event: FetchProgressEvent);
}

/// Human-friendly progress on stderr: "search intitle:Dune  page 2  40 / 1,234 books".
pub struct StderrProgress;

impl FetchProgressReporter for StderrProgress {
    fn report(&self, event: FetchProgressEvent) {
        let line = match &event {
            FetchProgressEvent::Requesting {
                query,
                page,
                offset,
            } => format!(
                "search {}  page {}  requesting from {}...\n",
                query,
                page,
                format_number(*offset as u64)
            ),
            FetchProgressEvent::Loaded {
                query,
                page,
                loaded,
                total_items,
                ..
            } => match total_items {
                Some(total) => format!(
                    "search {}  page {}  {} / {} books\n",
                    query,
                    page,
                    format_number(*loaded as u64),
                    format_number(*total)
                ),
                None => format!(
                    "search {}  page {}  {} books\n",
                    query,
                    page,
                    format_number(*loaded as u64)
                ),
            },
            FetchProgressEvent::Exhausted { query, loaded } => format!(
                "search {}  done  {} books\n",
                query,
                format_number(*loaded as u64)
            ),
        };
        let _ = std::io::stderr().lock().write_all(line.as_bytes());
        let _ = std::io::stderr().lock().flush();
    }
}

/// Machine-readable progress: one JSON object per line on stderr.
pub struct JsonProgress;

impl FetchProgressReporter for JsonProgress {
    fn report(&self, event: FetchProgressEvent) {
        let obj = match &event {
            FetchProgressEvent::Requesting {
                query,
                page,
                offset,
            } => serde_json::json!({
                "event": "progress",
                "query": query,
                "phase": "requesting",
                "page": page,
                "offset": offset
            }),
            FetchProgressEvent::Loaded {
                query,
                page,
                count,
                loaded,
                total_items,
            } => serde_json::json!({
                "event": "progress",
                "query": query,
                "phase": "loaded",
                "page": page,
                "count": count,
                "loaded": loaded,
                "total_items": total_items
            }),
            FetchProgressEvent::Exhausted { query, loaded } => serde_json::json!({
                "event": "progress",
                "query": query,
                "phase": "exhausted",
                "loaded": loaded
            }),
        };
        if let Ok(line) = serde_json::to_string(&obj) {
            let _ = writeln!(std::io::stderr().lock(), "{}", line);
            let _ = std::io::stderr().lock().flush();
        }
    }
}

/// No-op reporter when progress is disabled.
pub struct NoProgress;

impl FetchProgressReporter for NoProgress {
    fn report(&self, _event: FetchProgressEvent) {}
}

fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + (s.len() - 1) / 3);
    let chars: Vec<char> = s.chars().rev().collect();
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(*c);
    }
    result.chars().rev().collect()
}

/// Progress mode for the CLI: off, human (stderr), or JSON (stderr).
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum ProgressMode {
    Off,
    Human,
    Json,
}

impl ProgressMode {
    /// Default: human progress when stderr is a TTY, otherwise off.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            ProgressMode::Human
        } else {
            ProgressMode::Off
        }
    }

    pub fn reporter(&self) -> Box<dyn FetchProgressReporter> {
        match self {
            ProgressMode::Off => Box::new(NoProgress),
            ProgressMode::Human => Box::new(StderrProgress),
            ProgressMode::Json => Box::new(JsonProgress),
        }
    }
}
