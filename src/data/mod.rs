//! Data sources other than a user-supplied survey file.

pub mod sample;

pub use sample::*;
