//! Assignment tracking service and its terminal dashboard.
//!
//! The server half (`app`, `auth`, `assignments`) exposes a JSON API over
//! Postgres; the client half (`dashboard`) consumes that API. Both binaries
//! link this crate.

pub mod app;
pub mod assignments;
pub mod auth;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod extract;
pub mod state;
