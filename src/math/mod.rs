//! Mathematical utilities: least squares and logit shares.

pub mod logit;
pub mod ols;

pub use logit::*;
pub use ols::*;
