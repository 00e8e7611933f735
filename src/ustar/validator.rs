use log::{debug, warn};
use thiserror::Error;

use crate::ustar::{
  archive_io::ArchiveSource,
  block_walker::{next_header, skip_content, BlockCursor, HeaderStep},
  errors::{HeaderError, IoError},
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
  #[error("Header at offset {offset} has magic {found:?} instead of \"ustar\\0\"")]
  MagicMismatch { offset: usize, found: [u8; 6] },
  #[error("Header at offset {offset} has version {found:?} instead of \"00\"")]
  VersionMismatch { offset: usize, found: [u8; 2] },
  #[error("Header at offset {offset} stores checksum {stored} but sums to {computed}")]
  ChecksumMismatch {
    offset: usize,
    stored: u32,
    computed: u32,
  },
  /// A header that cannot be walked past, e.g. because its size or checksum field is garbage.
  #[error("Header at offset {offset}: {source}")]
  CorruptHeader { offset: usize, source: HeaderError },
  #[error(transparent)]
  Io(#[from] IoError),
}

impl ValidationError {
  /// Stable severity code, the more specific the failure the closer to zero.
  #[must_use]
  pub fn code(&self) -> i32 {
    match self {
      Self::MagicMismatch { .. } => -1,
      Self::VersionMismatch { .. } => -2,
      Self::ChecksumMismatch { .. } | Self::CorruptHeader { .. } => -3,
      Self::Io(_) => -4,
    }
  }

  fn from_header_error(offset: usize, error: HeaderError) -> Self {
    match error {
      HeaderError::MagicMismatch { found } => Self::MagicMismatch { offset, found },
      HeaderError::VersionMismatch { found } => Self::VersionMismatch { offset, found },
      HeaderError::ChecksumMismatch { stored, computed } => Self::ChecksumMismatch {
        offset,
        stored,
        computed,
      },
      source => Self::CorruptHeader { offset, source },
    }
  }
}

/// Checks every header up to the terminator and returns how many there are.
///
/// The first header that fails decides the error. Lone zero blocks are stepped over.
pub fn validate<S: ArchiveSource + ?Sized>(stream: &mut S) -> Result<usize, ValidationError> {
  let mut cursor = BlockCursor::START;
  let mut count = 0;
  loop {
    match next_header(stream, cursor)? {
      HeaderStep::Header {
        header,
        at,
        content,
      } => {
        let checked = header
          .validate()
          .and_then(|()| skip_content(&header, content));
        cursor = checked.map_err(|e| {
          let error = ValidationError::from_header_error(at.offset(), e);
          warn!("Invalid archive: {error}");
          error
        })?;
        count += 1;
      },
      HeaderStep::FalseTerminator { resume } => cursor = resume,
      HeaderStep::EndOfArchive { .. } => {
        debug!("Archive holds {count} valid headers");
        return Ok(count);
      },
    }
  }
}
