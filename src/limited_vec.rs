use core::ops::{Deref, Index};

use alloc::vec::{IntoIter, Vec};

use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Length limit of {0} elements exceeded")]
pub struct LengthLimitExceeded(pub usize);

/// A `Vec` that refuses to grow past `max_len` elements.
#[derive(Debug, Hash, Clone, PartialEq, Eq)]
pub struct LimitedVec<T> {
  vec: Vec<T>,
  max_len: usize,
}

impl<T> LimitedVec<T> {
  #[inline]
  #[must_use]
  pub const fn new(max_len: usize) -> Self {
    Self {
      vec: Vec::new(),
      max_len,
    }
  }

  #[inline]
  #[must_use]
  pub fn max_len(&self) -> usize {
    self.max_len
  }

  #[inline]
  #[must_use]
  pub fn remaining(&self) -> usize {
    self.max_len.saturating_sub(self.vec.len())
  }

  #[inline]
  #[must_use]
  pub fn is_full(&self) -> bool {
    self.remaining() == 0
  }

  #[inline]
  #[must_use]
  pub fn as_slice(&self) -> &[T] {
    self.vec.as_slice()
  }

  #[inline]
  #[must_use]
  pub fn into_vec(self) -> Vec<T> {
    self.vec
  }

  pub fn push(&mut self, value: T) -> Result<(), LengthLimitExceeded> {
    if self.vec.len() >= self.max_len {
      return Err(LengthLimitExceeded(self.max_len));
    }
    self.vec.push(value);
    Ok(())
  }

  #[inline]
  pub fn clear(&mut self) {
    self.vec.clear();
  }
}

impl<T> Deref for LimitedVec<T> {
  type Target = [T];

  fn deref(&self) -> &Self::Target {
    &self.vec
  }
}

impl<T> Index<usize> for LimitedVec<T> {
  type Output = T;

  fn index(&self, index: usize) -> &Self::Output {
    &self.vec[index]
  }
}

impl<T> IntoIterator for LimitedVec<T> {
  type Item = T;
  type IntoIter = IntoIter<T>;

  fn into_iter(self) -> Self::IntoIter {
    self.vec.into_iter()
  }
}

impl<'a, T> IntoIterator for &'a LimitedVec<T> {
  type Item = &'a T;
  type IntoIter = core::slice::Iter<'a, T>;

  fn into_iter(self) -> Self::IntoIter {
    self.vec.iter()
  }
}
