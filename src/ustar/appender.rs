use log::debug;

use crate::ustar::{
  archive_io::ArchiveSink,
  block_walker::{end_of_archive, BlockCursor},
  errors::{ArchiveError, IoError},
  header::UstarHeader,
  resolver::Resolver,
  tar_constants::{align_to_block_size, EntryType, BLOCK_SIZE, ZERO_BLOCK},
};

/// Appends a regular file named `name` at the root of the archive.
///
/// The previous terminator is overwritten by the new header, the content and its padding, followed
/// by a fresh terminator. Bytes past the new terminator are left alone. Nothing is written if the
/// name is invalid or already taken.
///
/// Returns the cursor of the new header.
pub fn append<S: ArchiveSink + ?Sized>(
  stream: &mut S,
  max_symlink_depth: usize,
  sync_on_append: bool,
  name: &str,
  content: &[u8],
) -> Result<BlockCursor, ArchiveError> {
  let header = UstarHeader::encode_new(name, content.len(), EntryType::RegularFile)
    .map_err(ArchiveError::InvalidEntry)?;

  if Resolver::new(&mut *stream, max_symlink_depth).find(name)?.is_some() {
    return Err(ArchiveError::AlreadyExists {
      path: name.into(),
    });
  }

  let at = end_of_archive(stream)?;
  let content_at = at
    .offset()
    .checked_add(BLOCK_SIZE)
    .ok_or(IoError::OffsetOverflow {
      offset: at.offset(),
      length: BLOCK_SIZE,
    })?;
  let padded = align_to_block_size(content.len()).ok_or(IoError::OffsetOverflow {
    offset: content_at,
    length: content.len(),
  })?;
  let terminator_at = content_at
    .checked_add(padded)
    .ok_or(IoError::OffsetOverflow {
      offset: content_at,
      length: padded,
    })?;

  let padding_at = content_at + content.len();

  stream.write_all_at(at.offset(), header.as_block(), false)?;
  if !content.is_empty() {
    stream.write_all_at(content_at, content, false)?;
    stream.write_all_at(padding_at, &ZERO_BLOCK[..padded - content.len()], false)?;
  }
  stream.write_all_at(terminator_at, &[0u8; 2 * BLOCK_SIZE], sync_on_append)?;
  stream.flush_all()?;

  debug!(
    "Appended {name:?} ({} bytes) at offset {}",
    content.len(),
    at.offset()
  );
  Ok(at)
}
