use crate::core::message::{BlockId, MessageHeader};

/// Identifies one reservation: a pending value and the target holding it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ReservationKey {
  header: MessageHeader,
  target: BlockId,
}

impl ReservationKey {
  /// Creates a key.
  #[must_use]
  pub const fn new(header: MessageHeader, target: BlockId) -> Self {
    Self { header, target }
  }

  /// Returns the reserved header.
  #[must_use]
  pub const fn header(&self) -> MessageHeader {
    self.header
  }

  /// Returns the holder.
  #[must_use]
  pub const fn target(&self) -> BlockId {
    self.target
  }
}
