use alloc::{boxed::Box, collections::TryReserveError, vec::Vec};

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Resize failed, buffer holds {size_after_resize} bytes: {resize_error:?}")]
pub struct ResizeError<U> {
  pub size_after_resize: usize,
  pub resize_error: U,
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Buffer has a fixed size of {fixed_buffer_size}, but requested size is {requested_size}")]
pub struct FixedSizeBufferError {
  pub fixed_buffer_size: usize,
  pub requested_size: usize,
}

pub trait BackingBuffer: AsMut<[u8]> + AsRef<[u8]> {
  type ResizeError;

  /// Returns the new size of the buffer after resizing.
  ///
  /// If a larger size is requested but no new items could be allocated,
  /// an error must be returned.
  fn try_resize(&mut self, requested_size: usize) -> Result<usize, ResizeError<Self::ResizeError>>;
}

impl<B: BackingBuffer + ?Sized> BackingBuffer for &mut B {
  type ResizeError = B::ResizeError;

  fn try_resize(&mut self, requested_size: usize) -> Result<usize, ResizeError<Self::ResizeError>> {
    (**self).try_resize(requested_size)
  }
}

impl BackingBuffer for Vec<u8> {
  type ResizeError = TryReserveError;

  fn try_resize(&mut self, requested_size: usize) -> Result<usize, ResizeError<Self::ResizeError>> {
    let len = self.len();
    if requested_size <= len {
      // Archives are never shrunk by a write.
      return Ok(len);
    }
    self
      .try_reserve(requested_size - len)
      .map_err(|e| ResizeError {
        size_after_resize: len,
        resize_error: e,
      })?;
    self.resize(requested_size, 0);
    Ok(requested_size)
  }
}

fn fixed_size_resize(len: usize, requested_size: usize) -> Result<usize, ResizeError<FixedSizeBufferError>> {
  if requested_size > len {
    return Err(ResizeError {
      size_after_resize: len,
      resize_error: FixedSizeBufferError {
        fixed_buffer_size: len,
        requested_size,
      },
    });
  }
  Ok(len)
}

impl BackingBuffer for [u8] {
  type ResizeError = FixedSizeBufferError;

  fn try_resize(&mut self, requested_size: usize) -> Result<usize, ResizeError<Self::ResizeError>> {
    fixed_size_resize(self.len(), requested_size)
  }
}

impl<const N: usize> BackingBuffer for [u8; N] {
  type ResizeError = FixedSizeBufferError;

  fn try_resize(&mut self, requested_size: usize) -> Result<usize, ResizeError<Self::ResizeError>> {
    fixed_size_resize(N, requested_size)
  }
}

impl BackingBuffer for Box<[u8]> {
  type ResizeError = FixedSizeBufferError;

  fn try_resize(&mut self, requested_size: usize) -> Result<usize, ResizeError<Self::ResizeError>> {
    // A boxed slice keeps its allocation; use Vec<u8> for a growing archive.
    fixed_size_resize(self.len(), requested_size)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_vec_grows_but_never_shrinks() {
    let mut buffer = alloc::vec![1u8, 2, 3];
    assert_eq!(buffer.try_resize(5).unwrap(), 5);
    assert_eq!(buffer, [1, 2, 3, 0, 0]);
    assert_eq!(buffer.try_resize(2).unwrap(), 5);
    assert_eq!(buffer.len(), 5);
  }

  #[test]
  fn test_array_has_fixed_size() {
    let mut buffer = [0u8; 4];
    assert_eq!(buffer.try_resize(4).unwrap(), 4);
    assert_eq!(
      buffer.try_resize(6).unwrap_err(),
      ResizeError {
        size_after_resize: 4,
        resize_error: FixedSizeBufferError {
          fixed_buffer_size: 4,
          requested_size: 6,
        },
      }
    );
  }
}
