use core::{future::Future, marker::PhantomData, num::NonZeroUsize};

use tokio::runtime::Handle;

use crate::core::{dispatch::ProcessingStrategy, error::BlockFault};


/// Runs an asynchronous action for every item.
///
/// A worker slot stays occupied until the action's future resolved, so the degree of
/// parallelism bounds the number of futures in flight. Workers drive the future with
/// [`Handle::block_on`]; run the owning block on an executor whose threads sit outside the
/// runtime's async context, such as [`TokioDispatchExecutor`](super::TokioDispatchExecutor).
pub struct AsyncActionStrategy<T, F> {
  handle:      Handle,
  action:      F,
  parallelism: NonZeroUsize,
  _marker:     PhantomData<fn(T)>,
}

impl<T, F, Fut> AsyncActionStrategy<T, F>
where
  F: Fn(T) -> Fut + Send + Sync,
  Fut: Future<Output = Result<(), BlockFault>>,
{
  /// Creates a strategy driving `action` on `handle` with a single worker.
  #[must_use]
  pub const fn new(handle: Handle, action: F) -> Self {
    Self { handle, action, parallelism: NonZeroUsize::MIN, _marker: PhantomData }
  }

  /// Sets the maximum number of concurrent futures.
  #[must_use]
  pub fn with_parallelism(mut self, parallelism: NonZeroUsize) -> Self {
    self.parallelism = parallelism;
    self
  }
}

impl<T, F, Fut> ProcessingStrategy<T> for AsyncActionStrategy<T, F>
where
  F: Fn(T) -> Fut + Send + Sync,
  Fut: Future<Output = Result<(), BlockFault>>,
{
  fn process_one(&self, _sequence: u64, item: T) -> Result<(), BlockFault> {
    self.handle.block_on((self.action)(item))
  }

  fn parallelism(&self) -> NonZeroUsize {
    self.parallelism
  }
}
