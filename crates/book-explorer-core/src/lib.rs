//! # Book Explorer Core
//!
//! IO-free logic for Book Explorer: book models, combined query building,
//! normalization, the search/book state slices, the pagination policy, the
//! scroll trigger, the search orchestrator, and the catalog trait.
//!
//! This crate contains no tokio, reqwest, filesystem I/O, or other
//! runtime-specific dependencies. Front ends own an [`orchestrator::AppState`],
//! drive a [`orchestrator::SearchOrchestrator`], and execute the fetches it
//! asks for against any [`catalog::Catalog`].

pub mod catalog;
pub mod collection;
pub mod error;
pub mod models;
pub mod normalize;
pub mod orchestrator;
pub mod pagination;
pub mod query;
pub mod scroll;
pub mod session;
