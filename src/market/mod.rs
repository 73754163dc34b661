//! Market simulation.
//!
//! Responsibilities:
//!
//! - generate the focal price grid
//! - compute logit shares, sales and profit per price (per respondent)
//! - select the profit-maximizing price

pub mod grid;
pub mod simulator;

pub use grid::*;
pub use simulator::*;
