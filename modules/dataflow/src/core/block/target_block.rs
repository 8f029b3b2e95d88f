use alloc::sync::Arc;

use super::{DataflowBlock, SourceRef};
use crate::core::{
  error::ProtocolError,
  message::{MessageHeader, OfferStatus},
};

/// Shared handle to a target.
pub type TargetRef<T> = Arc<dyn TargetBlock<T>>;

/// Block that accepts offered values.
pub trait TargetBlock<T>: DataflowBlock {
  /// Offers the value named by `header`.
  ///
  /// With `consume_to_accept` the target never keeps `value` directly; it reserves and consumes
  /// the value from `source` instead, so exactly one of several targets offered the same value
  /// can win it.
  ///
  /// # Errors
  ///
  /// Returns [`ProtocolError::InvalidHeader`] for a header id that is not positive and
  /// [`ProtocolError::MissingSource`] when `consume_to_accept` is set without a source.
  fn offer(
    &self,
    header: MessageHeader,
    value: &T,
    source: Option<&SourceRef<T>>,
    consume_to_accept: bool,
  ) -> Result<OfferStatus, ProtocolError>;
}
