use core::{marker::PhantomData, num::NonZeroUsize};

use super::ProcessingStrategy;
use crate::core::error::BlockFault;


/// Runs a user action for every item, optionally on several workers at once.
pub struct ActionStrategy<T, F> {
  action:      F,
  parallelism: NonZeroUsize,
  _marker:     PhantomData<fn(T)>,
}

impl<T, F> ActionStrategy<T, F>
where
  F: Fn(T) -> Result<(), BlockFault> + Send + Sync,
{
  /// Creates a strategy running `action` on a single worker.
  #[must_use]
  pub const fn new(action: F) -> Self {
    Self { action, parallelism: NonZeroUsize::MIN, _marker: PhantomData }
  }

  /// Sets the maximum number of concurrent workers.
  #[must_use]
  pub fn with_parallelism(mut self, parallelism: NonZeroUsize) -> Self {
    self.parallelism = parallelism;
    self
  }
}

impl<T, F> ProcessingStrategy<T> for ActionStrategy<T, F>
where
  F: Fn(T) -> Result<(), BlockFault> + Send + Sync,
{
  fn process_one(&self, _sequence: u64, item: T) -> Result<(), BlockFault> {
    (self.action)(item)
  }

  fn parallelism(&self) -> NonZeroUsize {
    self.parallelism
  }
}
