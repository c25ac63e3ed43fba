//! SmartCart NLP service library crate for the conversational ordering API.
//!
//! Re-exports all modules so the binary (`main.rs`) and external crates
//! (e.g. `sc-e2e-tests`) can reach `AppState`, `build_router`, the
//! `Resolver` and the context stores.

pub mod config;
pub mod context;
pub mod error;
pub mod inference;
pub mod routes;
pub mod state;
