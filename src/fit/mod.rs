//! Part-worth estimation.
//!
//! One ordinary-least-squares fit per respondent, independent of every other
//! respondent.

pub mod estimator;

pub use estimator::*;
