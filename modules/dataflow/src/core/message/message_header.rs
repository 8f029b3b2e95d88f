use crate::core::error::ProtocolError;


/// Capability token naming one pending value offered by a block.
///
/// Holding a header is proof that the holder may try to reserve or consume that specific value.
/// Headers are valid only when their id is positive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageHeader {
  id: i64,
}

impl MessageHeader {
  /// Creates a header with the given id.
  #[must_use]
  pub const fn new(id: i64) -> Self {
    Self { id }
  }

  /// Returns the header id.
  #[must_use]
  pub const fn id(self) -> i64 {
    self.id
  }

  /// Returns `true` when the id is positive.
  #[must_use]
  pub const fn is_valid(self) -> bool {
    self.id > 0
  }

  /// Returns the header unchanged when it is valid.
  ///
  /// # Errors
  ///
  /// Returns [`ProtocolError::InvalidHeader`] when the id is zero or negative.
  pub const fn validate(self) -> Result<Self, ProtocolError> {
    if self.is_valid() { Ok(self) } else { Err(ProtocolError::InvalidHeader(self.id)) }
  }
}
