use crate::core::{completion::CompletionHandle, error::BlockFault, message::BlockId};

/// Capabilities shared by every block.
pub trait DataflowBlock: Send + Sync {
  /// Returns the identity of this block.
  fn block_id(&self) -> BlockId;

  /// Signals that no more input will be offered. Idempotent.
  fn complete(&self);

  /// Requests abnormal termination with `fault`.
  fn fault(&self, fault: BlockFault);

  /// Returns a handle observing this block's completion.
  fn completion(&self) -> CompletionHandle;
}
