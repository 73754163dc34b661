//! `conjoint-pricing` library crate.
//!
//! The binary (`cj`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the pipeline can be driven from other front-ends
//! - code stays easy to navigate as the project grows
//!
//! Flow: survey table -> per-respondent OLS part-worths (`fit`) -> importance
//! and willingness to pay (`metrics`) -> logit price sweep (`market`) ->
//! cross-respondent summary (`report`). `app::pipeline` ties it together.

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod logging;
pub mod market;
pub mod math;
pub mod metrics;
pub mod models;
pub mod plot;
pub mod report;
