//! Header-to-header traversal of an archive.
//!
//! Traversal state is a plain [`BlockCursor`] value. The functions here take one and hand back
//! the next one, so every public operation can start over from [`BlockCursor::START`].

use alloc::{string::String, vec::Vec};

use log::{debug, trace};

use crate::ustar::{
  archive_io::ArchiveSource,
  errors::{ArchiveError, HeaderError, IoError},
  header::UstarHeader,
  tar_constants::{align_to_block_size, BLOCK_SIZE, ZERO_BLOCK},
};

/// A block aligned byte offset into the archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockCursor(usize);

impl BlockCursor {
  pub const START: Self = Self(0);

  #[must_use]
  pub fn offset(self) -> usize {
    self.0
  }

  fn advance(self, length: usize) -> Result<Self, IoError> {
    self
      .0
      .checked_add(length)
      .map(Self)
      .ok_or(IoError::OffsetOverflow {
        offset: self.0,
        length,
      })
  }

  fn next_block(self) -> Result<Self, IoError> {
    self.advance(BLOCK_SIZE)
  }
}

/// Result of reading at a cursor that is expected to hold a header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderStep {
  /// A non-zero block. Its content starts at `content`.
  Header {
    header: UstarHeader,
    at: BlockCursor,
    content: BlockCursor,
  },
  /// A single zero block followed by a non-zero one; traversal continues at `resume`.
  FalseTerminator { resume: BlockCursor },
  /// Two consecutive zero blocks, the first one at `terminator`.
  EndOfArchive { terminator: BlockCursor },
}

/// Reads the block at `cursor` and classifies it.
///
/// The header is not validated. A stream ending before a full block is an
/// [`IoError::UnexpectedEof`], an archive without terminator included.
pub fn next_header<S: ArchiveSource + ?Sized>(
  stream: &mut S,
  cursor: BlockCursor,
) -> Result<HeaderStep, IoError> {
  let block = stream.read_block(cursor.offset())?;
  let next = cursor.next_block()?;

  if block != ZERO_BLOCK {
    trace!("Header block at offset {}", cursor.offset());
    return Ok(HeaderStep::Header {
      header: UstarHeader::from_block(&block),
      at: cursor,
      content: next,
    });
  }

  if stream.read_block(next.offset())? == ZERO_BLOCK {
    trace!("End of archive at offset {}", cursor.offset());
    return Ok(HeaderStep::EndOfArchive { terminator: cursor });
  }

  debug!(
    "Lone zero block at offset {}, resuming at offset {}",
    cursor.offset(),
    next.offset()
  );
  Ok(HeaderStep::FalseTerminator { resume: next })
}

/// Returns the cursor of the header following the content of `header`.
///
/// The content is never read. Its size is taken from the header for every entry type.
pub fn skip_content(header: &UstarHeader, content: BlockCursor) -> Result<BlockCursor, HeaderError> {
  let size = header.size()?;
  align_to_block_size(size)
    .and_then(|padded| content.advance(padded).ok())
    .ok_or(HeaderError::ContentOutOfRange {
      size,
      offset: content.offset(),
    })
}

/// A header together with the offset it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
  pub at: BlockCursor,
  pub header: UstarHeader,
}

impl Entry {
  /// The logical path of the entry, header decoding errors carry the header offset.
  pub fn path(&self) -> Result<String, ArchiveError> {
    self
      .header
      .full_path()
      .map_err(|source| ArchiveError::CorruptHeader {
        offset: self.at.offset(),
        source,
      })
  }

  /// The stored path bytes, see [`UstarHeader::path_bytes`].
  pub fn path_bytes(&self) -> Result<Vec<u8>, ArchiveError> {
    self
      .header
      .path_bytes()
      .map_err(|source| ArchiveError::CorruptHeader {
        offset: self.at.offset(),
        source,
      })
  }

  /// The header following this entry's content.
  fn next_cursor(&self) -> Result<BlockCursor, ArchiveError> {
    let content = self.at.next_block()?;
    skip_content(&self.header, content).map_err(|source| ArchiveError::CorruptHeader {
      offset: self.at.offset(),
      source,
    })
  }
}

/// Walks all headers from the start of the archive up to its terminator.
///
/// The size field of an entry is only parsed when the walk moves past it, so a caller can still
/// inspect an entry whose size is garbage.
pub struct Entries<'a, S: ?Sized> {
  stream: &'a mut S,
  cursor: Option<BlockCursor>,
  /// Entry returned last, its content has not been skipped yet.
  pending: Option<Entry>,
}

impl<'a, S: ArchiveSource + ?Sized> Entries<'a, S> {
  pub fn new(stream: &'a mut S) -> Self {
    Self {
      stream,
      cursor: Some(BlockCursor::START),
      pending: None,
    }
  }

  /// Returns the next header, or `None` once the terminator has been reached.
  pub fn next_entry(&mut self) -> Result<Option<Entry>, ArchiveError> {
    if let Some(previous) = self.pending.take() {
      self.cursor = Some(previous.next_cursor()?);
    }
    while let Some(cursor) = self.cursor {
      match next_header(&mut *self.stream, cursor)? {
        HeaderStep::Header { header, at, .. } => {
          let entry = Entry { at, header };
          self.pending = Some(entry.clone());
          return Ok(Some(entry));
        },
        HeaderStep::FalseTerminator { resume } => self.cursor = Some(resume),
        HeaderStep::EndOfArchive { .. } => self.cursor = None,
      }
    }
    Ok(None)
  }
}

/// Locates the first block of the terminator, the point new entries are written at.
pub fn end_of_archive<S: ArchiveSource + ?Sized>(stream: &mut S) -> Result<BlockCursor, ArchiveError> {
  let mut cursor = BlockCursor::START;
  loop {
    match next_header(stream, cursor)? {
      HeaderStep::Header {
        header,
        at,
        content,
      } => {
        cursor = skip_content(&header, content).map_err(|source| ArchiveError::CorruptHeader {
          offset: at.offset(),
          source,
        })?;
      },
      HeaderStep::FalseTerminator { resume } => cursor = resume,
      HeaderStep::EndOfArchive { terminator } => return Ok(terminator),
    }
  }
}
