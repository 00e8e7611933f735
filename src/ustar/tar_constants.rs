use core::ops::Range;

// --- Constants for the USTAR Format ---
pub const BLOCK_SIZE: usize = 512;

/// A block of zeros for padding and end-of-archive markers.
pub const ZERO_BLOCK: [u8; BLOCK_SIZE] = [0; BLOCK_SIZE];

pub const USTAR_MAGIC: &[u8; 6] = b"ustar\0";
pub const USTAR_VERSION: &[u8; 2] = b"00";

/// Byte range of the checksum field inside a header block.
pub const CHECKSUM_RANGE: Range<usize> = 148..156;

/// Size of the buffer a reconstructed entry path must fit into, terminator included.
///
/// This is a limit of this implementation, not of the format: a USTAR path is at most
/// 155 + 1 + 100 bytes, so only hand-crafted headers can reach it.
pub const PATH_CAPACITY: usize = 512;

/// Rounds `size` up to the next multiple of [`BLOCK_SIZE`], i.e. `(size + 511) & !511`.
///
/// Every content skip, padding computation and end-of-archive search goes through this.
#[must_use]
pub fn align_to_block_size(size: usize) -> Option<usize> {
  size
    .checked_add(BLOCK_SIZE - 1)
    .map(|padded| padded & !(BLOCK_SIZE - 1))
}

/// # Typeflags:
///
/// - `0` for regular file
/// - `\0` for regular file written by pre-POSIX tools
/// - `2` for symbolic link
/// - `5` for directory
///
/// Everything else (hard links, devices, FIFOs, vendor extensions) is kept as [`EntryType::Other`].
#[derive(Debug, Eq, Hash, PartialEq, Clone, Copy)]
pub enum EntryType {
  /// Regular file
  RegularFile,
  /// Regular file with a NUL typeflag
  AlternateRegularFile,
  /// Directory
  Directory,
  /// Symbolic link
  SymbolicLink,
  Other(u8),
}

impl EntryType {
  #[must_use]
  pub fn is_regular_file(self) -> bool {
    matches!(self, Self::RegularFile | Self::AlternateRegularFile)
  }

  #[must_use]
  pub fn is_directory(self) -> bool {
    self == Self::Directory
  }

  #[must_use]
  pub fn is_symbolic_link(self) -> bool {
    self == Self::SymbolicLink
  }
}

impl From<u8> for EntryType {
  fn from(value: u8) -> Self {
    match value {
      b'0' => Self::RegularFile,
      b'\0' => Self::AlternateRegularFile,
      b'2' => Self::SymbolicLink,
      b'5' => Self::Directory,
      _ => Self::Other(value),
    }
  }
}

impl From<EntryType> for u8 {
  fn from(value: EntryType) -> Self {
    match value {
      EntryType::RegularFile => b'0',
      EntryType::AlternateRegularFile => b'\0',
      EntryType::SymbolicLink => b'2',
      EntryType::Directory => b'5',
      EntryType::Other(value) => value,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_align_to_block_size() {
    assert_eq!(align_to_block_size(0), Some(0));
    assert_eq!(align_to_block_size(1), Some(512));
    assert_eq!(align_to_block_size(511), Some(512));
    assert_eq!(align_to_block_size(512), Some(512));
    assert_eq!(align_to_block_size(513), Some(1024));
    assert_eq!(align_to_block_size(usize::MAX), None);
  }

  #[test]
  fn test_typeflag_mapping() {
    assert_eq!(EntryType::from(b'0'), EntryType::RegularFile);
    assert_eq!(EntryType::from(b'\0'), EntryType::AlternateRegularFile);
    assert_eq!(EntryType::from(b'1'), EntryType::Other(b'1'));
    assert!(EntryType::from(b'\0').is_regular_file());
    assert!(!EntryType::Directory.is_regular_file());
    for flag in [b'0', b'\0', b'2', b'5', b'7', b'x'] {
      assert_eq!(u8::from(EntryType::from(flag)), flag);
    }
  }
}
