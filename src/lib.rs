//! # Book Explorer
//!
//! Search a public book catalog from the terminal, page through results in
//! grid or list view, open book details, and keep a favorites list for the
//! length of a session.
//!
//! The search state machine, models and catalog abstraction live in the
//! IO-free [`book_explorer_core`] crate. This crate adds the HTTP catalog
//! client, configuration, rendering and the `books` commands.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌────────────────────┐   ┌──────────────┐
//! │ search form  │──▶│ SearchOrchestrator │──▶│   Catalog    │
//! │ / scroll     │   │  (core, no I/O)    │   │ HTTP/memory  │
//! └──────────────┘   └─────────┬──────────┘   └──────┬───────┘
//!                              │  normalize          │
//!                              ▼                     │
//!                       ┌─────────────┐              │
//!                       │  AppState   │◀─────────────┘
//!                       │ search+books│
//!                       └──────┬──────┘
//!                              ▼
//!                       ┌─────────────┐
//!                       │   render    │
//!                       └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! books search --title dune --author herbert
//! books search --genre fantasy --pages 3 --json
//! books get zyTCAlFPjgYC --full
//! books browse --view list
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`catalog_http`] | HTTP catalog client |
//! | [`render`] | Grid, list, detail and favorites views |
//! | [`progress`] | Fetch progress reporting on stderr |
//! | [`search`] | One-shot paged search |
//! | [`get`] | Book detail retrieval |
//! | [`browse`] | Interactive browsing session |

pub mod browse;
pub mod catalog_http;
pub mod config;
pub mod get;
pub mod progress;
pub mod render;
pub mod search;
