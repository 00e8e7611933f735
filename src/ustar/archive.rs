use alloc::string::String;

use crate::{
  limited_vec::LimitedVec,
  ustar::{
    appender,
    archive_io::{ArchiveSink, ArchiveSource},
    block_walker::{self, BlockCursor, Entries},
    errors::ArchiveError,
    lister::{self, EntrySink, Listing},
    options::ArchiveOptions,
    resolver::{ResolvedEntry, Resolver},
    validator::{self, ValidationError},
  },
};

/// A USTAR archive on top of a seekable stream.
///
/// Every operation walks the archive from its start, nothing is cached between calls. The stream
/// may therefore be modified externally in between, as long as it stays a valid archive.
///
/// ```
/// use ustar_inspect::{no_std_io::Cursor, Listing, UstarArchive};
///
/// let mut archive = UstarArchive::new(Cursor::new(vec![0u8; 1024]));
/// archive.append("hello.txt", b"hello").unwrap();
/// assert!(archive.is_file("hello.txt").unwrap());
///
/// let (listing, entries) = archive.list_bounded("", 8).unwrap();
/// assert_eq!(listing, Listing::Listed { count: 1 });
/// assert_eq!(entries.as_slice(), &["hello.txt"]);
/// ```
#[derive(Debug)]
pub struct UstarArchive<S> {
  stream: S,
  options: ArchiveOptions,
}

impl<S> UstarArchive<S> {
  pub fn new(stream: S) -> Self {
    Self::with_options(stream, ArchiveOptions::default())
  }

  pub fn with_options(stream: S, options: ArchiveOptions) -> Self {
    Self { stream, options }
  }

  #[must_use]
  pub fn options(&self) -> &ArchiveOptions {
    &self.options
  }

  #[must_use]
  pub fn get_ref(&self) -> &S {
    &self.stream
  }

  pub fn get_mut(&mut self) -> &mut S {
    &mut self.stream
  }

  #[must_use]
  pub fn into_inner(self) -> S {
    self.stream
  }

  fn resolver(&mut self) -> Resolver<'_, S>
  where
    S: ArchiveSource,
  {
    Resolver::new(&mut self.stream, self.options.max_symlink_depth)
  }
}

impl<S: ArchiveSource> UstarArchive<S> {
  /// Checks every header and returns their number.
  pub fn validate(&mut self) -> Result<usize, ValidationError> {
    validator::validate(&mut self.stream)
  }

  /// Walks the headers in archive order.
  pub fn entries(&mut self) -> Entries<'_, S> {
    Entries::new(&mut self.stream)
  }

  pub fn exists(&mut self, path: &str) -> Result<bool, ArchiveError> {
    self.resolver().exists(path)
  }

  pub fn find(&mut self, path: &str) -> Result<Option<ResolvedEntry>, ArchiveError> {
    self.resolver().find(path)
  }

  pub fn is_dir(&mut self, path: &str) -> Result<bool, ArchiveError> {
    self.resolver().is_dir(path)
  }

  pub fn is_file(&mut self, path: &str) -> Result<bool, ArchiveError> {
    self.resolver().is_file(path)
  }

  pub fn is_symlink(&mut self, path: &str) -> Result<bool, ArchiveError> {
    self.resolver().is_symlink(path)
  }

  pub fn list<K: EntrySink + ?Sized>(&mut self, path: &str, sink: &mut K) -> Result<Listing, ArchiveError> {
    lister::list(&mut self.stream, self.options.max_symlink_depth, path, sink)
  }

  /// Lists at most `max_entries` children of `path` into a fresh vector.
  pub fn list_bounded(
    &mut self,
    path: &str,
    max_entries: usize,
  ) -> Result<(Listing, LimitedVec<String>), ArchiveError> {
    let mut entries = LimitedVec::new(max_entries);
    let listing = self.list(path, &mut entries)?;
    Ok((listing, entries))
  }

  /// The offset new entries are written at.
  pub fn end_of_archive(&mut self) -> Result<BlockCursor, ArchiveError> {
    block_walker::end_of_archive(&mut self.stream)
  }
}

impl<S: ArchiveSink> UstarArchive<S> {
  /// Appends a regular file at the root of the archive, see [`appender::append`].
  pub fn append(&mut self, name: &str, content: &[u8]) -> Result<BlockCursor, ArchiveError> {
    appender::append(
      &mut self.stream,
      self.options.max_symlink_depth,
      self.options.sync_on_append,
      name,
      content,
    )
  }
}
