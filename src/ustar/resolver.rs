//! Path lookup with symbolic links to directories followed.

use alloc::{string::String, vec::Vec};

use hashbrown::HashSet;
use log::{debug, trace};

use crate::ustar::{
  archive_io::ArchiveSource,
  block_walker::{BlockCursor, Entries, Entry},
  errors::ArchiveError,
  header::UstarHeader,
  tar_constants::EntryType,
};

/// An entry found by a lookup.
///
/// When the lookup went through symbolic links this is the entry at the end of the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEntry {
  /// The stored path, lossily decoded if it is not UTF-8.
  pub path: String,
  pub at: BlockCursor,
  pub header: UstarHeader,
  raw_path: Vec<u8>,
}

impl ResolvedEntry {
  fn from_entry(entry: Entry, raw_path: Vec<u8>) -> Self {
    Self {
      path: String::from_utf8_lossy(&raw_path).into_owned(),
      at: entry.at,
      header: entry.header,
      raw_path,
    }
  }

  /// The stored path as is.
  #[must_use]
  pub fn path_bytes(&self) -> &[u8] {
    &self.raw_path
  }

  #[must_use]
  pub fn entry_type(&self) -> EntryType {
    self.header.entry_type()
  }

  #[must_use]
  pub fn is_dir(&self) -> bool {
    self.entry_type().is_directory()
  }

  #[must_use]
  pub fn is_file(&self) -> bool {
    self.entry_type().is_regular_file()
  }

  #[must_use]
  pub fn is_symlink(&self) -> bool {
    self.entry_type().is_symbolic_link()
  }
}

/// `path` spelled as a directory, i.e. `target == path + "/"`.
fn matches_as_directory(path: &[u8], target: &[u8]) -> bool {
  target.len() == path.len() + 1 && target.starts_with(path) && target.ends_with(b"/")
}

pub struct Resolver<'a, S: ?Sized> {
  stream: &'a mut S,
  max_symlink_depth: usize,
  /// Links currently being expanded.
  following: HashSet<Vec<u8>>,
}

impl<'a, S: ArchiveSource + ?Sized> Resolver<'a, S> {
  pub fn new(stream: &'a mut S, max_symlink_depth: usize) -> Self {
    Self {
      stream,
      max_symlink_depth,
      following: HashSet::new(),
    }
  }

  /// Looks up `path`.
  ///
  /// An exact match is returned as is, even if it is a symbolic link. A target spelled as a
  /// directory (`"link/"`) that names a symbolic link `"link"` resolves to the link's target,
  /// looked up as written and, failing that, with a trailing `/`.
  pub fn find(&mut self, path: &str) -> Result<Option<ResolvedEntry>, ArchiveError> {
    self.find_bytes(path.as_bytes())
  }

  /// [`Resolver::find`] for paths in any encoding.
  pub fn find_bytes(&mut self, path: &[u8]) -> Result<Option<ResolvedEntry>, ArchiveError> {
    self.following.clear();
    self.resolve(path)
  }

  fn resolve(&mut self, target: &[u8]) -> Result<Option<ResolvedEntry>, ArchiveError> {
    let mut entries = Entries::new(&mut *self.stream);
    while let Some(entry) = entries.next_entry()? {
      let path = entry.path_bytes()?;
      let as_directory = matches_as_directory(&path, target);
      if as_directory || path == target {
        let found = ResolvedEntry::from_entry(entry, path);
        if as_directory && found.is_symlink() {
          return self.follow(found);
        }
        return Ok(Some(found));
      }
    }
    Ok(None)
  }

  fn follow(&mut self, link: ResolvedEntry) -> Result<Option<ResolvedEntry>, ArchiveError> {
    if self.following.len() >= self.max_symlink_depth || !self.following.insert(link.raw_path.clone()) {
      return Err(ArchiveError::SymlinkLoop { path: link.path });
    }
    let mut target = link.header.link_name_bytes().to_vec();
    trace!(
      "Following symbolic link {:?} to {:?}",
      link.path,
      String::from_utf8_lossy(&target)
    );

    let result = match self.resolve(&target) {
      Ok(None) => {
        target.push(b'/');
        self.resolve(&target)
      },
      other => other,
    };

    self.following.remove(&link.raw_path);
    result
  }

  /// Exact path match, no symbolic links are followed.
  pub fn exists(&mut self, path: &str) -> Result<bool, ArchiveError> {
    let lookup = self.find_exact(path).map(|found| found.is_some());
    fold_lookup_error(path, lookup)
  }

  fn find_exact(&mut self, path: &str) -> Result<Option<Entry>, ArchiveError> {
    let mut entries = Entries::new(&mut *self.stream);
    while let Some(entry) = entries.next_entry()? {
      if entry.path_bytes()? == path.as_bytes() {
        return Ok(Some(entry));
      }
    }
    Ok(None)
  }

  pub fn is_dir(&mut self, path: &str) -> Result<bool, ArchiveError> {
    self.has_type(path, EntryType::is_directory)
  }

  /// Regular files with either the `'0'` or the NUL typeflag.
  pub fn is_file(&mut self, path: &str) -> Result<bool, ArchiveError> {
    self.has_type(path, EntryType::is_regular_file)
  }

  pub fn is_symlink(&mut self, path: &str) -> Result<bool, ArchiveError> {
    self.has_type(path, EntryType::is_symbolic_link)
  }

  fn has_type(&mut self, path: &str, predicate: fn(EntryType) -> bool) -> Result<bool, ArchiveError> {
    let lookup = self
      .find(path)
      .map(|found| found.is_some_and(|entry| predicate(entry.entry_type())));
    fold_lookup_error(path, lookup)
  }
}

/// Predicates answer `false` for archives they cannot make sense of, stream failures still propagate.
fn fold_lookup_error(path: &str, lookup: Result<bool, ArchiveError>) -> Result<bool, ArchiveError> {
  match lookup {
    Err(ArchiveError::Io(e)) => Err(ArchiveError::Io(e)),
    Err(e) => {
      debug!("Lookup of {path:?} failed, treating it as absent: {e}");
      Ok(false)
    },
    ok => ok,
  }
}

#[cfg(test)]
mod tests {
  use alloc::vec::Vec;

  use super::*;
  use crate::{
    no_std_io::Cursor,
    ustar::{
      errors::{HeaderError, HeaderField, IoError},
      test_support::ArchiveBuilder,
    },
  };

  fn sample() -> Cursor<Vec<u8>> {
    ArchiveBuilder::new()
      .dir("dir/")
      .file("dir/a.txt", b"alpha")
      .file("top.txt", b"top")
      .entry("old.txt", EntryType::AlternateRegularFile, b"old")
      .symlink("link", "dir")
      .symlink("file_link", "top.txt")
      .symlink("dangling", "missing")
      .cursor()
  }

  #[test]
  fn test_find_exact() {
    let mut cursor = sample();
    let mut resolver = Resolver::new(&mut cursor, 40);
    let found = resolver.find("dir/a.txt").unwrap().unwrap();
    assert_eq!(found.path, "dir/a.txt");
    assert_eq!(found.header.size().unwrap(), 5);
    assert!(resolver.find("dir/a.tx").unwrap().is_none());
    assert!(resolver.find("missing").unwrap().is_none());
  }

  #[test]
  fn test_find_directory_without_trailing_slash_is_not_found() {
    let mut cursor = sample();
    let mut resolver = Resolver::new(&mut cursor, 40);
    assert!(resolver.find("dir").unwrap().is_none());
    assert_eq!(resolver.find("dir/").unwrap().unwrap().path, "dir/");
  }

  #[test]
  fn test_exact_symlink_match_is_not_followed() {
    let mut cursor = sample();
    let mut resolver = Resolver::new(&mut cursor, 40);
    let found = resolver.find("link").unwrap().unwrap();
    assert!(found.is_symlink());
    assert_eq!(found.path, "link");
  }

  #[test]
  fn test_symlink_spelled_as_directory_is_followed() {
    let mut cursor = sample();
    let mut resolver = Resolver::new(&mut cursor, 40);
    let found = resolver.find("link/").unwrap().unwrap();
    assert!(found.is_dir());
    assert_eq!(found.path, "dir/");

    let found = resolver.find("file_link/").unwrap().unwrap();
    assert!(found.is_file());
    assert_eq!(found.path, "top.txt");

    assert!(resolver.find("dangling/").unwrap().is_none());
  }

  #[test]
  fn test_symlink_loop_is_detected() {
    let mut cursor = ArchiveBuilder::new()
      .symlink("a", "b/")
      .symlink("b", "a/")
      .symlink("self", "self/")
      .cursor();
    let mut resolver = Resolver::new(&mut cursor, 40);
    assert_eq!(
      resolver.find("self/"),
      Err(ArchiveError::SymlinkLoop {
        path: String::from("self"),
      })
    );
    assert!(matches!(
      resolver.find("a/"),
      Err(ArchiveError::SymlinkLoop { .. })
    ));
    assert!(!resolver.is_dir("a/").unwrap());
  }

  #[test]
  fn test_symlink_depth_is_capped() {
    let mut cursor = ArchiveBuilder::new()
      .symlink("l1", "l2/")
      .symlink("l2", "l3/")
      .symlink("l3", "d/")
      .dir("d/")
      .cursor();
    let mut resolver = Resolver::new(&mut cursor, 3);
    assert_eq!(resolver.find("l1/").unwrap().unwrap().path, "d/");

    let mut resolver = Resolver::new(&mut cursor, 2);
    assert!(matches!(
      resolver.find("l1/"),
      Err(ArchiveError::SymlinkLoop { .. })
    ));
  }

  #[test]
  fn test_predicates() {
    let mut cursor = sample();
    let mut resolver = Resolver::new(&mut cursor, 40);
    assert!(resolver.is_dir("dir/").unwrap());
    assert!(resolver.is_dir("link/").unwrap());
    assert!(!resolver.is_dir("link").unwrap());
    assert!(!resolver.is_dir("top.txt").unwrap());

    assert!(resolver.is_file("top.txt").unwrap());
    assert!(resolver.is_file("old.txt").unwrap());
    assert!(!resolver.is_file("dir/").unwrap());
    assert!(!resolver.is_file("nope").unwrap());

    assert!(resolver.is_symlink("link").unwrap());
    assert!(!resolver.is_symlink("link/").unwrap());
    assert!(!resolver.is_symlink("top.txt").unwrap());
  }

  #[test]
  fn test_exists_is_exact() {
    let mut cursor = sample();
    let mut resolver = Resolver::new(&mut cursor, 40);
    for path in ["dir/", "dir/a.txt", "top.txt", "old.txt", "link", "dangling"] {
      assert!(resolver.exists(path).unwrap(), "{path}");
    }
    for path in ["dir", "dir/a.txt/", "top.tx", "link/", ""] {
      assert!(!resolver.exists(path).unwrap(), "{path}");
    }
  }

  #[test]
  fn test_predicates_propagate_stream_failures() {
    let mut cursor = Cursor::new(ArchiveBuilder::new().file("a", b"").finish_without_terminator());
    let mut resolver = Resolver::new(&mut cursor, 40);
    assert!(matches!(
      resolver.exists("b"),
      Err(ArchiveError::Io(IoError::UnexpectedEof { .. }))
    ));
    assert!(matches!(
      resolver.is_file("b"),
      Err(ArchiveError::Io(IoError::UnexpectedEof { .. }))
    ));
  }

  #[test]
  fn test_predicates_fold_corrupt_headers() {
    let mut header = ArchiveBuilder::header("bad", EntryType::RegularFile, 0, "");
    header.size = *b"zzzzzzzzzzz\0";
    header.update_checksum();
    let mut cursor = ArchiveBuilder::new().raw_header(&header).file("later", b"").cursor();
    let mut resolver = Resolver::new(&mut cursor, 40);
    assert!(matches!(
      resolver.find("later"),
      Err(ArchiveError::CorruptHeader { offset: 0, .. })
    ));
    assert!(!resolver.exists("later").unwrap());
    assert!(!resolver.is_file("later").unwrap());

    // The broken size only matters once the walk has to move past the entry.
    assert_eq!(resolver.find("bad").unwrap().unwrap().at, BlockCursor::START);
    assert!(resolver.exists("bad").unwrap());
    assert!(resolver.is_file("bad").unwrap());
  }

  #[test]
  fn test_non_utf8_names_do_not_hide_later_entries() {
    let mut latin1 = ArchiveBuilder::header("cafe", EntryType::RegularFile, 0, "");
    latin1.name[3] = 0xe9;
    latin1.update_checksum();
    let mut cursor = ArchiveBuilder::new()
      .raw_header(&latin1)
      .file("b.txt", b"b")
      .cursor();
    let mut resolver = Resolver::new(&mut cursor, 40);
    assert!(resolver.exists("b.txt").unwrap());
    assert!(resolver.is_file("b.txt").unwrap());
    assert!(!resolver.exists("cafe").unwrap());

    let found = resolver.find_bytes(b"caf\xe9").unwrap().unwrap();
    assert_eq!(found.path_bytes(), b"caf\xe9");
    assert_eq!(found.path, "caf\u{fffd}");
    assert!(found.is_file());
    assert!(found.header.name().is_err());
  }

  #[test]
  fn test_symlink_to_non_utf8_target_is_followed() {
    let mut link = ArchiveBuilder::header("link", EntryType::SymbolicLink, 0, "dir/");
    link.linkname[..4].copy_from_slice(b"d\xe9r/");
    link.update_checksum();
    let mut dir = ArchiveBuilder::header("dir/", EntryType::Directory, 0, "");
    dir.name[..4].copy_from_slice(b"d\xe9r/");
    dir.update_checksum();
    let mut cursor = ArchiveBuilder::new().raw_header(&dir).raw_header(&link).cursor();
    let mut resolver = Resolver::new(&mut cursor, 40);

    let found = resolver.find("link/").unwrap().unwrap();
    assert_eq!(found.path_bytes(), b"d\xe9r/");
    assert!(found.is_dir());
    assert_eq!(
      resolver.find("link").unwrap().unwrap().header.link_name(),
      Err(HeaderError::InvalidUtf8 {
        field: HeaderField::LinkName,
        source: core::str::from_utf8(b"d\xe9r/").unwrap_err(),
      })
    );
  }
}
