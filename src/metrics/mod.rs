//! Metrics derived from a fitted utility model: importance and WTP.

pub mod importance;
pub mod wtp;

pub use importance::*;
pub use wtp::*;
