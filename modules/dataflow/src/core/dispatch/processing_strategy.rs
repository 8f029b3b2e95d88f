use core::num::NonZeroUsize;

use crate::core::error::BlockFault;

/// Processes one dequeued item of a mailbox.
///
/// The mailbox owns queueing, back-pressure, and scheduling; the strategy supplies what happens
/// to each item and how many workers may run at once.
pub trait ProcessingStrategy<T>: Send + Sync {
  /// Processes `item`, which was the `sequence`-th item accepted by the mailbox.
  ///
  /// # Errors
  ///
  /// Returns the [`BlockFault`] that terminates the block.
  fn process_one(&self, sequence: u64, item: T) -> Result<(), BlockFault>;

  /// Returns the maximum number of concurrent workers.
  fn parallelism(&self) -> NonZeroUsize;
}
