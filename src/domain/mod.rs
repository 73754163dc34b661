//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the attribute vocabulary (`AttributeKey`, `AttributeFamily`)
//! - survey input (`AttributeProfile`, `SurveyTable`)
//! - per-respondent outputs (`UtilityModel`, `ImportanceVector`, `WtpVector`,
//!   `OptimalPricePoint`)
//! - run configuration (`StudyConfig`)

pub mod config;
pub mod types;

pub use config::*;
pub use types::*;
