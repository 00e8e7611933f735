mod cursor;
#[cfg(any(feature = "std", test))]
mod std_stream;

pub use cursor::*;
#[cfg(any(feature = "std", test))]
pub use std_stream::*;
