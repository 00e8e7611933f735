use thiserror::Error;

/// Trait for reading bytes.
pub trait Read {
  type ReadError;

  /// Read up to `output_buffer.len()` bytes into `output_buffer`.
  /// Providing an empty `output_buffer` is valid and will return 0 bytes read.
  ///
  /// Returns number of bytes read.
  /// On EOF, it returns 0 bytes read.
  /// Any further reads after EOF return 0 bytes read.
  fn read(&mut self, output_buffer: &mut [u8]) -> Result<usize, Self::ReadError>;
}

impl Read for &[u8] {
  type ReadError = core::convert::Infallible;

  fn read(&mut self, output_buffer: &mut [u8]) -> Result<usize, Self::ReadError> {
    let n = core::cmp::min(output_buffer.len(), self.len());
    output_buffer[..n].copy_from_slice(&self[..n]);
    *self = &self[n..];
    Ok(n)
  }
}

impl<R: Read + ?Sized> Read for &mut R {
  type ReadError = R::ReadError;

  fn read(&mut self, output_buffer: &mut [u8]) -> Result<usize, Self::ReadError> {
    (**self).read(output_buffer)
  }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ReadExactError<U> {
  #[error("Unexpected EOF after {bytes_read} of {bytes_requested} bytes")]
  UnexpectedEof {
    bytes_read: usize,
    bytes_requested: usize,
  },
  #[error("Underlying read error: {0:?}")]
  Io(#[from] U),
}

/// Extension trait that provides a `read_exact` method for any `Read` implementor.
pub trait ReadExact: Read {
  /// Fills the entire `output_buffer`, retrying partial reads.
  ///
  /// Hitting EOF before the buffer is full is an error.
  fn read_exact(&mut self, output_buffer: &mut [u8])
    -> Result<(), ReadExactError<Self::ReadError>>;
}

impl<T: Read + ?Sized> ReadExact for T {
  fn read_exact(
    &mut self,
    output_buffer: &mut [u8],
  ) -> Result<(), ReadExactError<Self::ReadError>> {
    let mut bytes_read = 0;
    while bytes_read < output_buffer.len() {
      match self.read(&mut output_buffer[bytes_read..]) {
        Ok(0) => {
          return Err(ReadExactError::UnexpectedEof {
            bytes_read,
            bytes_requested: output_buffer.len(),
          });
        },
        Ok(n) => bytes_read += n,
        Err(e) => return Err(ReadExactError::Io(e)),
      }
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  /// Hands out at most `chunk` bytes per call.
  struct ChunkedReader<'a> {
    data: &'a [u8],
    chunk: usize,
  }

  impl Read for ChunkedReader<'_> {
    type ReadError = core::convert::Infallible;

    fn read(&mut self, output_buffer: &mut [u8]) -> Result<usize, Self::ReadError> {
      let n = self.chunk.min(output_buffer.len()).min(self.data.len());
      output_buffer[..n].copy_from_slice(&self.data[..n]);
      self.data = &self.data[n..];
      Ok(n)
    }
  }

  #[test]
  fn test_read_exact_retries_partial_reads() {
    let mut reader = ChunkedReader {
      data: b"abcdefgh",
      chunk: 3,
    };
    let mut buf = [0u8; 7];
    reader.read_exact(&mut buf).unwrap();
    assert_eq!(&buf, b"abcdefg");
  }

  #[test]
  fn test_read_exact_reports_short_source() {
    let mut reader: &[u8] = b"abc";
    let mut buf = [0u8; 5];
    assert_eq!(
      reader.read_exact(&mut buf),
      Err(ReadExactError::UnexpectedEof {
        bytes_read: 3,
        bytes_requested: 5,
      })
    );
  }
}
