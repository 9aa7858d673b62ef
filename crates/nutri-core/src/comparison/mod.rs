//! Visit comparison.
//!
//! Pure, read-only projection over one patient's visit history. Insufficient
//! data is an explicit output state ([`TrendClass::InsufficientData`]), never
//! an error.

mod catalog;
mod engine;

pub use catalog::*;
pub use engine::*;
