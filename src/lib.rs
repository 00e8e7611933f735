#![no_std]
extern crate alloc;
#[cfg(any(feature = "std", test))]
extern crate std;

mod dynamic_error;
mod limited_vec;
pub mod no_std_io;
pub mod ustar;

pub use dynamic_error::DynamicError;
pub use limited_vec::{LengthLimitExceeded, LimitedVec};
pub use ustar::{
  ArchiveError, ArchiveOptions, EntrySink, HeaderError, IoError, Listing, ResolvedEntry, SlotSink,
  UstarArchive, ValidationError,
};
