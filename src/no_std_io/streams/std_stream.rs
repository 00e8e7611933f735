//! Adapter from `std::io` streams to the crate's stream traits.

use std::io::{self, ErrorKind};

use crate::no_std_io::{Read, Seek, SeekFrom, Write};

/// Wraps any `std::io` stream, e.g. a [`std::fs::File`], so it can back an archive.
#[derive(Debug)]
pub struct StdStream<T> {
  inner: T,
}

impl<T> StdStream<T> {
  #[must_use]
  pub fn new(inner: T) -> Self {
    Self { inner }
  }

  #[must_use]
  pub fn get_ref(&self) -> &T {
    &self.inner
  }

  pub fn get_mut(&mut self) -> &mut T {
    &mut self.inner
  }

  #[must_use]
  pub fn into_inner(self) -> T {
    self.inner
  }
}

impl<T: io::Read> Read for StdStream<T> {
  type ReadError = io::Error;

  fn read(&mut self, output_buffer: &mut [u8]) -> Result<usize, Self::ReadError> {
    loop {
      match self.inner.read(output_buffer) {
        Err(e) if e.kind() == ErrorKind::Interrupted => {},
        result => return result,
      }
    }
  }
}

impl<T: io::Write> Write for StdStream<T> {
  type WriteError = io::Error;
  type FlushError = io::Error;

  fn write(&mut self, input_buffer: &[u8], sync_hint: bool) -> Result<usize, Self::WriteError> {
    let written = loop {
      match self.inner.write(input_buffer) {
        Err(e) if e.kind() == ErrorKind::Interrupted => {},
        result => break result?,
      }
    };
    if sync_hint {
      self.inner.flush()?;
    }
    Ok(written)
  }

  fn flush(&mut self) -> Result<(), Self::FlushError> {
    self.inner.flush()
  }
}

impl<T: io::Seek> Seek for StdStream<T> {
  type SeekError = io::Error;

  fn seek(&mut self, offset: SeekFrom) -> Result<usize, Self::SeekError> {
    let style = match offset {
      SeekFrom::Start(n) => io::SeekFrom::Start(n as u64),
      SeekFrom::End(n) => io::SeekFrom::End(n as i64),
      SeekFrom::Current(n) => io::SeekFrom::Current(n as i64),
    };
    let position = self.inner.seek(style)?;
    usize::try_from(position).map_err(io::Error::other)
  }
}
