//! Stream traits and in-memory streams that work without `std`.
mod streams;
mod traits;

pub use streams::*;
pub use traits::*;
