#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveOptions {
  /// How many symbolic links a single lookup may pass through before it is treated as a loop.
  pub max_symlink_depth: usize,
  /// Whether the terminator written by an append carries the sync hint.
  ///
  /// The stream is flushed after every append regardless.
  pub sync_on_append: bool,
}

impl Default for ArchiveOptions {
  fn default() -> Self {
    Self {
      max_symlink_depth: 40,
      sync_on_append: true,
    }
  }
}
