//! USTAR archives: header codec, traversal, lookup, listing, appending and validation.

mod appender;
mod archive;
mod archive_io;
mod block_walker;
mod errors;
mod header;
mod lister;
mod octal;
mod options;
mod resolver;
mod tar_constants;
#[cfg(test)]
mod test_support;
mod validator;

pub use appender::append;
pub use archive::UstarArchive;
pub use archive_io::{ArchiveSink, ArchiveSource};
pub use block_walker::{end_of_archive, next_header, skip_content, BlockCursor, Entries, Entry, HeaderStep};
pub use errors::{ArchiveError, HeaderError, HeaderField, IoError};
pub use header::UstarHeader;
pub use lister::{is_direct_child, list, EntrySink, Listing, SlotSink};
pub use octal::{ChecksumField, OctalError, OctalField};
pub use options::ArchiveOptions;
pub use resolver::{ResolvedEntry, Resolver};
pub use tar_constants::{
  align_to_block_size, EntryType, BLOCK_SIZE, CHECKSUM_RANGE, PATH_CAPACITY, USTAR_MAGIC,
  USTAR_VERSION, ZERO_BLOCK,
};
pub use validator::{validate, ValidationError};
