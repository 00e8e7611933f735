use core::fmt::Display;

use alloc::string::String;

use thiserror::Error;

use crate::{ustar::octal::OctalError, DynamicError};

/// The header field an error refers to.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum HeaderField {
  Name,
  Prefix,
  Size,
  Checksum,
  LinkName,
}

impl Display for HeaderField {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    match self {
      Self::Name => write!(f, "header.name"),
      Self::Prefix => write!(f, "header.prefix"),
      Self::Size => write!(f, "header.size"),
      Self::Checksum => write!(f, "header.checksum"),
      Self::LinkName => write!(f, "header.linkname"),
    }
  }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HeaderError {
  #[error("Unknown magic {found:?}, expected \"ustar\\0\"")]
  MagicMismatch { found: [u8; 6] },
  #[error("Unknown version {found:?}, expected \"00\"")]
  VersionMismatch { found: [u8; 2] },
  #[error("Corrupt header: stored checksum {stored} but computed {computed}")]
  ChecksumMismatch { stored: u32, computed: u32 },
  #[error("Corrupt {field}: {source}")]
  CorruptField { field: HeaderField, source: OctalError },
  #[error("Cannot encode {field}: {source}")]
  Unencodable { field: HeaderField, source: OctalError },
  #[error("{field} is not valid UTF-8: {source}")]
  InvalidUtf8 {
    field: HeaderField,
    source: core::str::Utf8Error,
  },
  #[error("Path of {length} bytes does not fit the {capacity} byte path buffer")]
  PathTooLong { length: usize, capacity: usize },
  #[error("Content of {size} bytes at offset {offset} runs past the addressable range")]
  ContentOutOfRange { size: usize, offset: usize },
  #[error("Invalid entry name {name:?}: {reason}")]
  InvalidName { name: String, reason: &'static str },
}

/// Failure of the stream backing an archive.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IoError {
  #[error("Read at offset {offset} failed: {source}")]
  Read { offset: usize, source: DynamicError },
  #[error("Unexpected end of archive at offset {offset}: got {bytes_read} of {bytes_requested} bytes")]
  UnexpectedEof {
    offset: usize,
    bytes_read: usize,
    bytes_requested: usize,
  },
  #[error("Write at offset {offset} failed: {source}")]
  Write { offset: usize, source: DynamicError },
  #[error("Seek to offset {offset} failed: {source}")]
  Seek { offset: usize, source: DynamicError },
  #[error("Flush failed: {source}")]
  Flush { source: DynamicError },
  #[error("Offset {offset} plus {length} bytes exceeds the addressable range")]
  OffsetOverflow { offset: usize, length: usize },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArchiveError {
  #[error(transparent)]
  Io(#[from] IoError),
  #[error("Header at offset {offset}: {source}")]
  CorruptHeader { offset: usize, source: HeaderError },
  #[error("Symbolic link loop while resolving {path:?}")]
  SymlinkLoop { path: String },
  #[error("An entry named {path:?} already exists")]
  AlreadyExists { path: String },
  #[error("Cannot create entry: {0}")]
  InvalidEntry(HeaderError),
}
