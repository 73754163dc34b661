//! Input/output helpers.
//!
//! - survey CSV ingest + validation (`ingest`)
//! - study config JSON (`config`)
//! - result exports (CSV/JSON) and survey CSV writing (`export`)

pub mod config;
pub mod export;
pub mod ingest;

pub use config::*;
pub use export::*;
pub use ingest::*;
