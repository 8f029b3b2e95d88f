use super::{DataflowBlock, LinkHandle, LinkOptions, MessageSource, TargetRef};
use crate::core::error::ProtocolError;

/// Block that produces values and distributes them to linked targets.
pub trait SourceBlock<T>: DataflowBlock + MessageSource<T> {
  /// Links `target` so it is offered produced values.
  ///
  /// # Errors
  ///
  /// Returns [`ProtocolError::SelfLink`] when `target` is this block.
  fn link_to(&self, target: TargetRef<T>, options: LinkOptions) -> Result<LinkHandle, ProtocolError>;

  /// Removes and returns the next value ready to be pulled, without linking.
  fn try_receive(&self) -> Option<T>;

  /// Returns the weighted number of values waiting to be delivered.
  fn output_count(&self) -> usize;
}
