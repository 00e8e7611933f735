use core::{fmt, str};

use alloc::{
  string::{String, ToString as _},
  vec::Vec,
};

use zerocopy::{FromBytes, FromZeros as _, Immutable, IntoBytes, KnownLayout};

use crate::ustar::{
  errors::{HeaderError, HeaderField},
  octal::{ChecksumField, OctalField},
  tar_constants::{
    EntryType, BLOCK_SIZE, CHECKSUM_RANGE, PATH_CAPACITY, USTAR_MAGIC, USTAR_VERSION,
  },
};

/// One 512 byte USTAR header block.
///
/// | Offset | Size | Field    |
/// |--------|------|----------|
/// | 0      | 100  | name     |
/// | 124    | 12   | size     |
/// | 148    | 8    | checksum |
/// | 156    | 1    | typeflag |
/// | 157    | 100  | linkname |
/// | 257    | 6    | magic    |
/// | 263    | 2    | version  |
/// | 345    | 155  | prefix   |
///
/// The remaining fields are carried along untouched and zeroed for new entries.
#[derive(Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct UstarHeader {
  /// File name, null-terminated if shorter than 100 bytes
  pub name: [u8; 100],
  /// File mode (octal), stored as ASCII bytes
  pub mode: [u8; 8],
  /// User ID of file owner (octal), stored as ASCII bytes
  pub uid: [u8; 8],
  /// Group ID of file owner (octal), stored as ASCII bytes
  pub gid: [u8; 8],
  /// Content size in bytes (octal), stored as ASCII bytes
  pub size: [u8; 12],
  /// Modification time (epoch seconds, octal), stored as ASCII bytes
  pub mtime: [u8; 12],
  /// Header checksum, six octal digits, a NUL and a space
  pub checksum: [u8; 8],
  /// Entry type flag, see [`EntryType`]
  pub typeflag: u8,
  /// Target of a symbolic link relative to the archive root, null-terminated
  pub linkname: [u8; 100],
  /// `"ustar\0"`
  pub magic: [u8; 6],
  /// `"00"`
  pub version: [u8; 2],
  pub uname: [u8; 32],
  pub gname: [u8; 32],
  pub dev_major: [u8; 8],
  pub dev_minor: [u8; 8],
  /// Path prefix joined to `name` with a `/`, null-terminated
  pub prefix: [u8; 155],
  /// Unused padding to fill the 512-byte header block
  pub padding: [u8; 12],
}

impl fmt::Debug for UstarHeader {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("UstarHeader")
      .field("name", &String::from_utf8_lossy(until_nul(&self.name)))
      .field("prefix", &String::from_utf8_lossy(until_nul(&self.prefix)))
      .field("typeflag", &self.entry_type())
      .field("size", &String::from_utf8_lossy(until_nul(&self.size)))
      .finish_non_exhaustive()
  }
}

fn until_nul(bytes: &[u8]) -> &[u8] {
  let end = bytes.iter().position(|&b| b == b'\0').unwrap_or(bytes.len());
  &bytes[..end]
}

fn parse_text_field(bytes: &[u8], field: HeaderField) -> Result<&str, HeaderError> {
  str::from_utf8(until_nul(bytes)).map_err(|source| HeaderError::InvalidUtf8 { field, source })
}

/// Joins `prefix` and `name` the way USTAR splits long paths.
///
/// Fails if the result plus a terminator would not fit `capacity` bytes.
pub(crate) fn join_path(prefix: &[u8], name: &[u8], capacity: usize) -> Result<Vec<u8>, HeaderError> {
  let length = if prefix.is_empty() {
    name.len()
  } else {
    prefix.len() + 1 + name.len()
  };
  if length >= capacity {
    return Err(HeaderError::PathTooLong { length, capacity });
  }

  let mut path = Vec::with_capacity(length);
  if !prefix.is_empty() {
    path.extend_from_slice(prefix);
    path.push(b'/');
  }
  path.extend_from_slice(name);
  Ok(path)
}

impl UstarHeader {
  /// Reinterprets a raw block without validating it.
  #[must_use]
  pub fn from_block(block: &[u8; BLOCK_SIZE]) -> Self {
    zerocopy::transmute!(*block)
  }

  #[must_use]
  pub fn as_block(&self) -> &[u8; BLOCK_SIZE] {
    zerocopy::transmute_ref!(self)
  }

  /// Decodes a raw block, checking magic, version and checksum in that order.
  pub fn decode(block: &[u8; BLOCK_SIZE]) -> Result<Self, HeaderError> {
    let header = Self::from_block(block);
    header.validate()?;
    Ok(header)
  }

  pub fn validate(&self) -> Result<(), HeaderError> {
    if &self.magic != USTAR_MAGIC {
      return Err(HeaderError::MagicMismatch { found: self.magic });
    }
    if &self.version != USTAR_VERSION {
      return Err(HeaderError::VersionMismatch {
        found: self.version,
      });
    }
    let stored = self.stored_checksum()?;
    let computed = self.computed_checksum();
    if stored != computed {
      return Err(HeaderError::ChecksumMismatch { stored, computed });
    }
    Ok(())
  }

  /// Builds the header of a new entry.
  ///
  /// Only name, size, typeflag, magic, version and checksum are set, everything else is zero.
  pub fn encode_new(name: &str, size: usize, entry_type: EntryType) -> Result<Self, HeaderError> {
    let invalid_name = |reason| HeaderError::InvalidName {
      name: name.to_string(),
      reason,
    };
    if name.is_empty() {
      return Err(invalid_name("name is empty"));
    }
    if name.len() > 100 {
      return Err(invalid_name("name is longer than 100 bytes"));
    }
    if name.as_bytes().contains(&b'\0') {
      return Err(invalid_name("name contains a NUL byte"));
    }

    let mut header = Self::new_zeroed();
    header.name[..name.len()].copy_from_slice(name.as_bytes());
    header.size = OctalField::<12>::encode(size as u64).map_err(|source| {
      HeaderError::Unencodable {
        field: HeaderField::Size,
        source,
      }
    })?;
    header.typeflag = entry_type.into();
    header.magic = *USTAR_MAGIC;
    header.version = *USTAR_VERSION;
    header.update_checksum();
    Ok(header)
  }

  /// Sums all header bytes with the checksum field counted as eight ASCII spaces.
  #[must_use]
  pub fn computed_checksum(&self) -> u32 {
    self
      .as_bytes()
      .iter()
      .enumerate()
      .map(|(i, &byte)| {
        if CHECKSUM_RANGE.contains(&i) {
          u32::from(b' ')
        } else {
          u32::from(byte)
        }
      })
      .sum()
  }

  pub fn stored_checksum(&self) -> Result<u32, HeaderError> {
    ChecksumField::parse(&self.checksum).map_err(|source| HeaderError::CorruptField {
      field: HeaderField::Checksum,
      source,
    })
  }

  /// Recomputes and stores the checksum, to be called after any field change.
  pub fn update_checksum(&mut self) {
    let checksum = self.computed_checksum();
    // 512 bytes of 0xff sum to 0o377000, which always fits six digits.
    if let Ok(field) = ChecksumField::encode(checksum) {
      self.checksum = field;
    }
  }

  #[must_use]
  pub fn entry_type(&self) -> EntryType {
    self.typeflag.into()
  }

  pub fn size(&self) -> Result<usize, HeaderError> {
    let size = OctalField::<12>::parse(&self.size).map_err(|source| HeaderError::CorruptField {
      field: HeaderField::Size,
      source,
    })?;
    usize::try_from(size).map_err(|_| HeaderError::CorruptField {
      field: HeaderField::Size,
      source: crate::ustar::octal::OctalError::Overflow {
        value: size,
        digits: OctalField::<12>::DIGITS,
      },
    })
  }

  pub fn name(&self) -> Result<&str, HeaderError> {
    parse_text_field(&self.name, HeaderField::Name)
  }

  pub fn prefix(&self) -> Result<&str, HeaderError> {
    parse_text_field(&self.prefix, HeaderField::Prefix)
  }

  pub fn link_name(&self) -> Result<&str, HeaderError> {
    parse_text_field(&self.linkname, HeaderField::LinkName)
  }

  /// Raw link target, whatever its encoding.
  #[must_use]
  pub fn link_name_bytes(&self) -> &[u8] {
    until_nul(&self.linkname)
  }

  /// The logical path as stored, whatever its encoding. Lookups compare these bytes.
  pub fn path_bytes(&self) -> Result<Vec<u8>, HeaderError> {
    join_path(until_nul(&self.prefix), until_nul(&self.name), PATH_CAPACITY)
  }

  /// The logical path of the entry: `name`, or `prefix/name` when a prefix is present.
  pub fn full_path(&self) -> Result<String, HeaderError> {
    let (prefix, name) = (self.prefix()?, self.name()?);
    let path = join_path(prefix.as_bytes(), name.as_bytes(), PATH_CAPACITY)?;
    Ok(String::from_utf8_lossy(&path).into_owned())
  }
}

#[cfg(test)]
mod tests {
  use zerocopy::FromZeros as _;

  use super::*;

  fn header_with_path(prefix: &str, name: &str) -> UstarHeader {
    let mut header = UstarHeader::new_zeroed();
    header.prefix[..prefix.len()].copy_from_slice(prefix.as_bytes());
    header.name[..name.len()].copy_from_slice(name.as_bytes());
    header
  }

  #[test]
  fn test_layout_offsets() {
    let mut header = UstarHeader::new_zeroed();
    header.size[0] = 1;
    header.checksum[0] = 2;
    header.typeflag = 3;
    header.linkname[0] = 4;
    header.magic[0] = 5;
    header.version[0] = 6;
    header.prefix[0] = 7;
    let block = header.as_block();
    assert_eq!(block[124], 1);
    assert_eq!(block[148], 2);
    assert_eq!(block[156], 3);
    assert_eq!(block[157], 4);
    assert_eq!(block[257], 5);
    assert_eq!(block[263], 6);
    assert_eq!(block[345], 7);
  }

  #[test]
  fn test_encode_new_sets_required_fields() {
    let header = UstarHeader::encode_new("x.txt", 3, EntryType::RegularFile).unwrap();
    assert_eq!(header.name().unwrap(), "x.txt");
    assert_eq!(&header.size, b"00000000003\0");
    assert_eq!(header.typeflag, b'0');
    assert_eq!(&header.magic, b"ustar\0");
    assert_eq!(&header.version, b"00");
    assert_eq!(header.checksum[6..], *b"\0 ");
    assert_eq!(header.mode, [0; 8]);
    assert_eq!(header.prefix, [0; 155]);
    assert_eq!(header.full_path().unwrap(), "x.txt");
    assert_eq!(header.size().unwrap(), 3);
  }

  #[test]
  fn test_encoded_checksum_round_trips() {
    for (name, size) in [("a", 0), ("some/longer/name.bin", 123_456), ("z", 1)] {
      let header = UstarHeader::encode_new(name, size, EntryType::RegularFile).unwrap();
      assert_eq!(header.stored_checksum().unwrap(), header.computed_checksum());
      assert_eq!(UstarHeader::decode(header.as_block()), Ok(header));
    }
  }

  #[test]
  fn test_encode_new_rejects_bad_names() {
    assert!(matches!(
      UstarHeader::encode_new("", 0, EntryType::RegularFile),
      Err(HeaderError::InvalidName { .. })
    ));
    let long_name = "n".repeat(101);
    assert!(matches!(
      UstarHeader::encode_new(&long_name, 0, EntryType::RegularFile),
      Err(HeaderError::InvalidName { .. })
    ));
    assert!(UstarHeader::encode_new(&long_name[..100], 0, EntryType::RegularFile).is_ok());
    assert!(matches!(
      UstarHeader::encode_new("a\0b", 0, EntryType::RegularFile),
      Err(HeaderError::InvalidName { .. })
    ));
  }

  #[test]
  fn test_decode_checks_magic_before_version_and_checksum() {
    let mut header = UstarHeader::encode_new("f", 0, EntryType::RegularFile).unwrap();
    header.magic = *b"ustar ";
    header.version = *b" \0";
    assert_eq!(
      UstarHeader::decode(header.as_block()),
      Err(HeaderError::MagicMismatch { found: *b"ustar " })
    );

    header.magic = *USTAR_MAGIC;
    assert_eq!(
      UstarHeader::decode(header.as_block()),
      Err(HeaderError::VersionMismatch { found: *b" \0" })
    );

    header.version = *USTAR_VERSION;
    let stored = header.stored_checksum().unwrap();
    header.name[0] = b'g';
    assert_eq!(
      UstarHeader::decode(header.as_block()),
      Err(HeaderError::ChecksumMismatch {
        stored,
        computed: stored + 1,
      })
    );
  }

  #[test]
  fn test_checksum_ignores_stored_checksum_bytes() {
    let mut header = UstarHeader::encode_new("f", 10, EntryType::Directory).unwrap();
    let computed = header.computed_checksum();
    header.checksum = [0xff; 8];
    assert_eq!(header.computed_checksum(), computed);
  }

  #[test]
  fn test_full_path_joins_prefix() {
    assert_eq!(header_with_path("", "a.txt").full_path().unwrap(), "a.txt");
    assert_eq!(
      header_with_path("dir/sub", "a.txt").full_path().unwrap(),
      "dir/sub/a.txt"
    );
    assert_eq!(header_with_path("dir", "sub/").full_path().unwrap(), "dir/sub/");
  }

  #[test]
  fn test_full_path_uses_all_field_bytes_without_nul() {
    let prefix = "p".repeat(155);
    let name = "n".repeat(100);
    let path = header_with_path(&prefix, &name).full_path().unwrap();
    assert_eq!(path.len(), 256);
    assert!(path.starts_with(&prefix));
    assert!(path.ends_with(&name));
  }

  #[test]
  fn test_join_path_respects_capacity() {
    assert_eq!(join_path(b"ab", b"cd", 6).unwrap(), b"ab/cd");
    assert_eq!(
      join_path(b"ab", b"cde", 6),
      Err(HeaderError::PathTooLong {
        length: 6,
        capacity: 6,
      })
    );
    assert_eq!(
      join_path(b"", b"abcdef", 6),
      Err(HeaderError::PathTooLong {
        length: 6,
        capacity: 6,
      })
    );
  }

  #[test]
  fn test_non_utf8_name_is_reported() {
    let mut header = UstarHeader::new_zeroed();
    header.name[0] = 0xff;
    assert!(matches!(
      header.full_path(),
      Err(HeaderError::InvalidUtf8 {
        field: HeaderField::Name,
        ..
      })
    ));
    header.name[1] = b'x';
    assert_eq!(header.path_bytes().unwrap(), [0xff, b'x']);
  }

  #[test]
  fn test_typeflags() {
    let mut header = UstarHeader::new_zeroed();
    assert_eq!(header.entry_type(), EntryType::AlternateRegularFile);
    header.typeflag = b'5';
    assert_eq!(header.entry_type(), EntryType::Directory);
    header.typeflag = b'2';
    assert_eq!(header.entry_type(), EntryType::SymbolicLink);
  }
}
