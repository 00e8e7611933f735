use core::convert::Infallible;

use thiserror::Error;

use crate::no_std_io::{BackingBuffer, Read, ResizeError, Seek, SeekFrom, Write};

/// An in-memory stream over a [`BackingBuffer`].
///
/// Reads past the end return EOF, writes past the end grow the buffer if it can grow.
pub struct Cursor<B> {
  backing_buffer: B,
  position: usize,
}

impl<B> Cursor<B> {
  #[must_use]
  pub fn new(backing_buffer: B) -> Self {
    Self {
      backing_buffer,
      position: 0,
    }
  }

  #[must_use]
  pub fn position(&self) -> usize {
    self.position
  }

  pub fn set_position(&mut self, position: usize) {
    self.position = position;
  }

  #[must_use]
  pub fn backing_buffer(&self) -> &B {
    &self.backing_buffer
  }

  pub fn backing_buffer_mut(&mut self) -> &mut B {
    &mut self.backing_buffer
  }

  #[must_use]
  pub fn into_inner(self) -> B {
    self.backing_buffer
  }
}

impl<B: AsRef<[u8]>> Cursor<B> {
  #[must_use]
  pub fn len(&self) -> usize {
    self.backing_buffer.as_ref().len()
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  #[must_use]
  pub fn remaining(&self) -> usize {
    self.len().saturating_sub(self.position)
  }

  #[must_use]
  pub fn full_buffer(&self) -> &[u8] {
    self.backing_buffer.as_ref()
  }

  #[must_use]
  pub fn split(&self) -> (&[u8], &[u8]) {
    let slice = self.backing_buffer.as_ref();
    let position = self.position.min(slice.len());
    slice.split_at(position)
  }

  #[must_use]
  pub fn before(&self) -> &[u8] {
    self.split().0
  }

  #[must_use]
  pub fn after(&self) -> &[u8] {
    self.split().1
  }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CursorSeekError {
  #[error("Seek {offset:?} out of bounds: position {position}, length {length}")]
  OutOfBounds {
    position: usize,
    length: usize,
    offset: SeekFrom,
  },
}

impl<B: AsRef<[u8]>> Seek for Cursor<B> {
  type SeekError = CursorSeekError;

  fn seek(&mut self, style: SeekFrom) -> Result<usize, Self::SeekError> {
    let (base_pos, offset) = match style {
      SeekFrom::Start(n) => {
        self.position = n;

        return Ok(n);
      },

      SeekFrom::End(n) => (self.backing_buffer.as_ref().len(), n),

      SeekFrom::Current(n) => (self.position, n),
    };

    match base_pos.checked_add_signed(offset) {
      Some(n) => {
        self.position = n;

        Ok(self.position)
      },

      None => Err(CursorSeekError::OutOfBounds {
        position: base_pos,
        length: self.backing_buffer.as_ref().len(),
        offset: style,
      }),
    }
  }
}

impl<B: AsRef<[u8]>> Read for Cursor<B> {
  type ReadError = Infallible;

  fn read(&mut self, output_buffer: &mut [u8]) -> Result<usize, Self::ReadError> {
    let n = Read::read(&mut self.after(), output_buffer)?;
    self.position += n;
    Ok(n)
  }
}

impl<B: BackingBuffer> Write for Cursor<B> {
  type WriteError = B::ResizeError;
  type FlushError = Infallible;

  fn write(&mut self, input_buffer: &[u8], _sync_hint: bool) -> Result<usize, Self::WriteError> {
    if input_buffer.is_empty() {
      return Ok(0);
    }

    let mut end_pos = self.position.saturating_add(input_buffer.len());

    // Resize if needed
    if end_pos > self.backing_buffer.as_ref().len() {
      let backing_buffer_size = match self.backing_buffer.try_resize(end_pos) {
        Ok(new_size) => new_size,
        Err(ResizeError {
          size_after_resize,
          resize_error,
        }) => {
          if size_after_resize <= self.position {
            return Err(resize_error);
          }
          size_after_resize
        },
      };

      end_pos = end_pos.min(backing_buffer_size);
    }

    let written = end_pos - self.position;
    let buffer = self.backing_buffer.as_mut();
    buffer[self.position..end_pos].copy_from_slice(&input_buffer[..written]);

    self.position = end_pos;
    Ok(written)
  }

  fn flush(&mut self) -> Result<(), Self::FlushError> {
    // No-op for in-memory buffer.
    Ok(())
  }
}
