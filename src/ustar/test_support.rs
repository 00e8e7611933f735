//! Hand-assembled archives for tests, including layouts no well-behaved writer produces.

use alloc::vec::Vec;

use zerocopy::FromZeros as _;

use crate::{
  no_std_io::Cursor,
  ustar::{
    header::UstarHeader,
    octal::OctalField,
    tar_constants::{align_to_block_size, EntryType, USTAR_MAGIC, USTAR_VERSION, ZERO_BLOCK},
  },
};

#[derive(Default)]
pub struct ArchiveBuilder {
  bytes: Vec<u8>,
}

impl ArchiveBuilder {
  pub fn new() -> Self {
    Self::default()
  }

  /// Builds a valid header, splitting paths longer than 100 bytes at the last `/`.
  pub fn header(path: &str, entry_type: EntryType, size: usize, link_name: &str) -> UstarHeader {
    let mut header = UstarHeader::new_zeroed();
    let (prefix, name) = if path.len() > 100 {
      let split = path[..path.len() - 1].rfind('/').unwrap();
      (&path[..split], &path[split + 1..])
    } else {
      ("", path)
    };
    header.prefix[..prefix.len()].copy_from_slice(prefix.as_bytes());
    header.name[..name.len()].copy_from_slice(name.as_bytes());
    header.linkname[..link_name.len()].copy_from_slice(link_name.as_bytes());
    header.mode = OctalField::<8>::encode(0o644).unwrap();
    header.size = OctalField::<12>::encode(size as u64).unwrap();
    header.typeflag = entry_type.into();
    header.magic = *USTAR_MAGIC;
    header.version = *USTAR_VERSION;
    header.update_checksum();
    header
  }

  pub fn raw_header(mut self, header: &UstarHeader) -> Self {
    self.bytes.extend_from_slice(header.as_block());
    self
  }

  fn content(mut self, content: &[u8]) -> Self {
    self.bytes.extend_from_slice(content);
    let padded = align_to_block_size(self.bytes.len()).unwrap();
    self.bytes.resize(padded, 0);
    self
  }

  pub fn file(self, path: &str, content: &[u8]) -> Self {
    self
      .raw_header(&Self::header(path, EntryType::RegularFile, content.len(), ""))
      .content(content)
  }

  pub fn entry(self, path: &str, entry_type: EntryType, content: &[u8]) -> Self {
    self
      .raw_header(&Self::header(path, entry_type, content.len(), ""))
      .content(content)
  }

  pub fn dir(self, path: &str) -> Self {
    self.raw_header(&Self::header(path, EntryType::Directory, 0, ""))
  }

  pub fn symlink(self, path: &str, target: &str) -> Self {
    self.raw_header(&Self::header(path, EntryType::SymbolicLink, 0, target))
  }

  pub fn zero_block(mut self) -> Self {
    self.bytes.extend_from_slice(&ZERO_BLOCK);
    self
  }

  pub fn raw(mut self, bytes: &[u8]) -> Self {
    self.bytes.extend_from_slice(bytes);
    self
  }

  pub fn finish_without_terminator(self) -> Vec<u8> {
    self.bytes
  }

  pub fn finish(self) -> Vec<u8> {
    self.zero_block().zero_block().bytes
  }

  pub fn cursor(self) -> Cursor<Vec<u8>> {
    Cursor::new(self.finish())
  }
}
