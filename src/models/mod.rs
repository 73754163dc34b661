//! Linear utility model evaluation.
//!
//! Implemented as small, pure functions so estimation and simulation code can
//! share one definition of "utility of a product".

pub mod utility;

pub use utility::*;
