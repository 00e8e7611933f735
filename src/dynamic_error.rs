use core::{
  error::Error,
  fmt::{Debug, Display},
};

use alloc::{format, string::String};

/// An error from a stream whose concrete error type has been erased to its debug rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamicError(pub String);

impl DynamicError {
  #[must_use]
  pub fn from_debug<E: Debug + ?Sized>(error: &E) -> Self {
    Self(format!("{error:?}"))
  }
}

impl Error for DynamicError {
  fn source(&self) -> Option<&(dyn Error + 'static)> {
    None
  }
}

impl Display for DynamicError {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    write!(f, "DynamicError: {}", self.0)
  }
}
