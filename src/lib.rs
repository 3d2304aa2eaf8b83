//! Client-side data layer for the Choplink restaurant administration API.
//!
//! [`infra::http::Transport`] talks to the backend, [`application::api`]
//! maps domain operations onto it, [`cache::QueryCache`] keeps query results
//! and [`application::Queries`] ties reads and writes to the cache.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
