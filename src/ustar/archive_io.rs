//! Positioned block access on top of the stream traits.
//!
//! Every operation seeks to an absolute offset first, so the stream position left behind by
//! earlier calls never matters.

use core::fmt::Debug;

use crate::{
  no_std_io::{Read, ReadExact as _, ReadExactError, Seek, SeekFrom, Write, WriteAll as _},
  ustar::{errors::IoError, tar_constants::BLOCK_SIZE},
  DynamicError,
};

/// A seekable byte stream an archive can be read from.
pub trait ArchiveSource {
  fn seek_to(&mut self, offset: usize) -> Result<(), IoError>;

  /// Reads the 512 byte block starting at `offset`.
  ///
  /// A stream ending inside the block is reported as [`IoError::UnexpectedEof`].
  fn read_block(&mut self, offset: usize) -> Result<[u8; BLOCK_SIZE], IoError>;
}

impl<T> ArchiveSource for T
where
  T: Read + Seek + ?Sized,
  T::ReadError: Debug,
  T::SeekError: Debug,
{
  fn seek_to(&mut self, offset: usize) -> Result<(), IoError> {
    self
      .seek(SeekFrom::Start(offset))
      .map_err(|e| IoError::Seek {
        offset,
        source: DynamicError::from_debug(&e),
      })?;
    Ok(())
  }

  fn read_block(&mut self, offset: usize) -> Result<[u8; BLOCK_SIZE], IoError> {
    self.seek_to(offset)?;
    let mut block = [0u8; BLOCK_SIZE];
    self.read_exact(&mut block).map_err(|e| match e {
      ReadExactError::UnexpectedEof {
        bytes_read,
        bytes_requested,
      } => IoError::UnexpectedEof {
        offset,
        bytes_read,
        bytes_requested,
      },
      ReadExactError::Io(e) => IoError::Read {
        offset,
        source: DynamicError::from_debug(&e),
      },
    })?;
    Ok(block)
  }
}

/// A seekable byte stream an archive can also be written to.
pub trait ArchiveSink: ArchiveSource {
  fn write_all_at(&mut self, offset: usize, bytes: &[u8], sync_hint: bool) -> Result<(), IoError>;

  fn flush_all(&mut self) -> Result<(), IoError>;
}

impl<T> ArchiveSink for T
where
  T: Read + Seek + Write + ?Sized,
  T::ReadError: Debug,
  T::SeekError: Debug,
  T::WriteError: Debug,
  T::FlushError: Debug,
{
  fn write_all_at(&mut self, offset: usize, bytes: &[u8], sync_hint: bool) -> Result<(), IoError> {
    self.seek_to(offset)?;
    self
      .write_all(bytes, sync_hint)
      .map_err(|e| IoError::Write {
        offset,
        source: DynamicError::from_debug(&e),
      })
  }

  fn flush_all(&mut self) -> Result<(), IoError> {
    self.flush().map_err(|e| IoError::Flush {
      source: DynamicError::from_debug(&e),
    })
  }
}
