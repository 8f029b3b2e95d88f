use alloc::sync::Arc;

use crate::core::{
  error::ProtocolError,
  message::{BlockId, MessageHeader},
};

/// Shared handle to a source, passed along with offers so targets can pull later.
pub type SourceRef<T> = Arc<dyn MessageSource<T>>;

/// Producer side of the reserve/consume/release contract.
///
/// A header names one pending value. Reservation is a compare-and-set: racing targets may all
/// try, exactly one wins.
pub trait MessageSource<T>: Send + Sync {
  /// Returns the identity of the producing block.
  fn source_id(&self) -> BlockId;

  /// Takes the value named by `header` for `target`.
  ///
  /// Succeeds for the reservation holder, or for any target while the value is unreserved and
  /// still pending. Returns `Ok(None)` when the value is no longer available to `target`.
  ///
  /// # Errors
  ///
  /// Returns [`ProtocolError::InvalidHeader`] for a header id that is not positive.
  fn consume_message(&self, header: MessageHeader, target: BlockId) -> Result<Option<T>, ProtocolError>;

  /// Claims the value named by `header` for `target`.
  ///
  /// # Errors
  ///
  /// Returns [`ProtocolError::InvalidHeader`] for a header id that is not positive.
  fn reserve_message(&self, header: MessageHeader, target: BlockId) -> Result<bool, ProtocolError>;

  /// Returns a reservation held by `target` without consuming the value.
  ///
  /// # Errors
  ///
  /// Returns [`ProtocolError::InvalidHeader`] for a header id that is not positive and
  /// [`ProtocolError::NotReserved`] when `target` does not hold the reservation.
  fn release_reservation(&self, header: MessageHeader, target: BlockId) -> Result<(), ProtocolError>;
}
