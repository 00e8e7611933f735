//! Fixed-width octal ASCII integer fields, as used by the `size` and `checksum` header fields.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OctalError {
  #[error("Invalid byte {byte:#04x} at position {position} of octal field")]
  InvalidDigit { byte: u8, position: usize },
  #[error("Value {value} does not fit into {digits} octal digits")]
  Overflow { value: u64, digits: usize },
}

/// Codec for an `N` byte octal field: `N - 1` zero padded digits followed by a NUL.
pub struct OctalField<const N: usize>;

impl<const N: usize> OctalField<N> {
  pub const DIGITS: usize = N - 1;
  pub const MAX_VALUE: u64 = (1 << (3 * Self::DIGITS)) - 1;

  /// Parses a field written by any common tar implementation.
  ///
  /// Leading spaces and NULs are skipped, digits are read up to the first NUL or space,
  /// and only NULs and spaces may follow. A field without digits reads as zero.
  pub fn parse(field: &[u8; N]) -> Result<u64, OctalError> {
    let mut value: u64 = 0;
    let mut position = field
      .iter()
      .position(|&b| b != b' ' && b != b'\0')
      .unwrap_or(N);

    while let Some(&(byte @ b'0'..=b'7')) = field.get(position) {
      // At most 21 digits fit in a u64, more would be a malformed field.
      value = value
        .checked_mul(8)
        .and_then(|v| v.checked_add(u64::from(byte - b'0')))
        .ok_or(OctalError::InvalidDigit { byte, position })?;
      position += 1;
    }

    if let Some(offset) = field[position..]
      .iter()
      .position(|&b| b != b' ' && b != b'\0')
    {
      return Err(OctalError::InvalidDigit {
        byte: field[position + offset],
        position: position + offset,
      });
    }

    Ok(value)
  }

  pub fn encode(value: u64) -> Result<[u8; N], OctalError> {
    let mut field = [0u8; N];
    write_octal_digits(&mut field[..Self::DIGITS], value)?;
    Ok(field)
  }
}

/// Codec for the 8 byte checksum field: six digits, a NUL and a space.
pub struct ChecksumField;

impl ChecksumField {
  pub const DIGITS: usize = 6;

  pub fn parse(field: &[u8; 8]) -> Result<u32, OctalError> {
    let value = OctalField::<8>::parse(field)?;
    u32::try_from(value).map_err(|_| OctalError::Overflow { value, digits: 7 })
  }

  pub fn encode(checksum: u32) -> Result<[u8; 8], OctalError> {
    let mut field = [0u8; 8];
    write_octal_digits(&mut field[..Self::DIGITS], u64::from(checksum))?;
    field[Self::DIGITS] = b'\0';
    field[Self::DIGITS + 1] = b' ';
    Ok(field)
  }
}

fn write_octal_digits(digits: &mut [u8], value: u64) -> Result<(), OctalError> {
  let mut remaining = value;
  for slot in digits.iter_mut().rev() {
    *slot = b'0' + (remaining & 0o7) as u8;
    remaining >>= 3;
  }
  if remaining != 0 {
    return Err(OctalError::Overflow {
      value,
      digits: digits.len(),
    });
  }
  Ok(())
}
