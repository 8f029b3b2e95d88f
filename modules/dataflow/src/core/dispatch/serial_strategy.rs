use core::{marker::PhantomData, num::NonZeroUsize};

use super::ProcessingStrategy;
use crate::core::error::BlockFault;


/// Runs an infallible policy closure for every item on a single worker.
///
/// Used by blocks whose per-item work is internal bookkeeping (for example moving an item into
/// the outgoing store) rather than user code.
pub struct SerialStrategy<T, F> {
  policy:  F,
  _marker: PhantomData<fn(T)>,
}

impl<T, F> SerialStrategy<T, F>
where
  F: Fn(T) + Send + Sync,
{
  /// Creates the strategy.
  #[must_use]
  pub const fn new(policy: F) -> Self {
    Self { policy, _marker: PhantomData }
  }
}

impl<T, F> ProcessingStrategy<T> for SerialStrategy<T, F>
where
  F: Fn(T) + Send + Sync,
{
  fn process_one(&self, _sequence: u64, item: T) -> Result<(), BlockFault> {
    (self.policy)(item);
    Ok(())
  }

  fn parallelism(&self) -> NonZeroUsize {
    NonZeroUsize::MIN
  }
}
