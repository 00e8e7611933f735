//! Non-recursive directory listings.

use alloc::{string::String, vec::Vec};

use log::debug;

use crate::{
  limited_vec::LimitedVec,
  ustar::{
    archive_io::ArchiveSource,
    block_walker::Entries,
    errors::ArchiveError,
    resolver::{ResolvedEntry, Resolver},
  },
};

/// Bounded destination for listed paths.
pub trait EntrySink {
  fn remaining_capacity(&self) -> usize;

  /// Stores `path`, returning `false` if the sink is already full.
  fn push_entry(&mut self, path: &str) -> bool;
}

impl<K: EntrySink + ?Sized> EntrySink for &mut K {
  fn remaining_capacity(&self) -> usize {
    (**self).remaining_capacity()
  }

  fn push_entry(&mut self, path: &str) -> bool {
    (**self).push_entry(path)
  }
}

impl EntrySink for LimitedVec<String> {
  fn remaining_capacity(&self) -> usize {
    self.remaining()
  }

  fn push_entry(&mut self, path: &str) -> bool {
    self.push(String::from(path)).is_ok()
  }
}

/// Writes into caller-owned strings, reusing their allocations.
pub struct SlotSink<'a> {
  slots: &'a mut [String],
  written: usize,
}

impl<'a> SlotSink<'a> {
  pub fn new(slots: &'a mut [String]) -> Self {
    Self { slots, written: 0 }
  }

  #[must_use]
  pub fn written(&self) -> usize {
    self.written
  }

  /// The slots filled so far.
  #[must_use]
  pub fn filled(&self) -> &[String] {
    &self.slots[..self.written]
  }
}

impl EntrySink for SlotSink<'_> {
  fn remaining_capacity(&self) -> usize {
    self.slots.len() - self.written
  }

  fn push_entry(&mut self, path: &str) -> bool {
    let Some(slot) = self.slots.get_mut(self.written) else {
      return false;
    };
    slot.clear();
    slot.push_str(path);
    self.written += 1;
    true
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Listing {
  Listed { count: usize },
  /// The path is neither the root nor resolves to a directory. Nothing was written.
  NoSuchDirectory,
}

/// Whether `file` sits directly inside `dir`.
///
/// `dir` is `""` for the root or ends with exactly one `/`. A child may carry a single trailing
/// `/` itself, which is how directories are spelled.
#[must_use]
pub fn is_direct_child(file: &str, dir: &str) -> bool {
  is_direct_child_bytes(file.as_bytes(), dir.as_bytes())
}

fn is_direct_child_bytes(file: &[u8], dir: &[u8]) -> bool {
  let rest = match file.strip_prefix(dir) {
    Some(rest) if !rest.is_empty() => rest,
    _ => return false,
  };
  match rest.iter().position(|&b| b == b'/') {
    None => true,
    Some(slash) => slash == rest.len() - 1,
  }
}

/// Lists the direct children of `path` into `sink`.
///
/// `""` lists the root. Otherwise `path` has to resolve to a directory, a symbolic link is
/// followed to its target first. Listing stops without error once `sink` is full.
///
/// Paths are matched as stored. Children whose path is not UTF-8 are handed to `sink` lossily
/// decoded.
pub fn list<S, K>(
  stream: &mut S,
  max_symlink_depth: usize,
  path: &str,
  sink: &mut K,
) -> Result<Listing, ArchiveError>
where
  S: ArchiveSource + ?Sized,
  K: EntrySink + ?Sized,
{
  let directory = if path.is_empty() {
    Vec::new()
  } else {
    match resolve_directory(&mut Resolver::new(&mut *stream, max_symlink_depth), path)? {
      Some(directory) => directory,
      None => {
        debug!("Not listing {path:?}, it is not a directory");
        return Ok(Listing::NoSuchDirectory);
      },
    }
  };

  let mut count = 0;
  let mut entries = Entries::new(stream);
  while sink.remaining_capacity() > 0 {
    let Some(entry) = entries.next_entry()? else {
      break;
    };
    let entry_path = entry.path_bytes()?;
    if is_direct_child_bytes(&entry_path, &directory)
      && sink.push_entry(&String::from_utf8_lossy(&entry_path))
    {
      count += 1;
    }
  }

  debug!(
    "Listed {count} entries of {:?}",
    String::from_utf8_lossy(&directory)
  );
  Ok(Listing::Listed { count })
}

/// Resolves `path` to the `/`-terminated stored path of a directory entry.
fn resolve_directory<S: ArchiveSource + ?Sized>(
  resolver: &mut Resolver<'_, S>,
  path: &str,
) -> Result<Option<Vec<u8>>, ArchiveError> {
  let found = match resolver.find(path) {
    Ok(Some(link)) if link.is_symlink() => {
      let mut link_as_directory = link.path_bytes().to_vec();
      link_as_directory.push(b'/');
      resolver.find_bytes(&link_as_directory)
    },
    other => other,
  };

  let found = match found {
    Ok(found) => found,
    Err(ArchiveError::SymlinkLoop { path }) => {
      debug!("Symbolic link loop at {path:?}");
      None
    },
    Err(e) => return Err(e),
  };

  Ok(found.filter(ResolvedEntry::is_dir).map(|directory| {
    let stored = directory.path_bytes();
    let end = stored.iter().rposition(|&b| b != b'/').map_or(0, |last| last + 1);
    let mut normalized = stored[..end].to_vec();
    if !normalized.is_empty() {
      normalized.push(b'/');
    }
    normalized
  }))
}
