//! Core data models for the stats engine.

mod comparison;
mod confidence;
mod highlight;
mod raw;
mod record;
mod role;
mod stats;

pub use comparison::*;
pub use confidence::*;
pub use highlight::*;
pub use raw::*;
pub use record::*;
pub use role::*;
pub use stats::*;
