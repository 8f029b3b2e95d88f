use core::num::NonZeroUsize;

use crate::core::{
  completion::CancellationSignal,
  dispatch::ExecutorShared,
  mailbox::{CapacityRelease, MailboxConfig},
};

#[cfg(test)]
mod tests;

/// Construction options shared by the provided blocks.
///
/// The executor is always passed explicitly; there is no process-wide default.
#[derive(Clone)]
pub struct BlockOptions {
  executor:                  ExecutorShared,
  bounded_capacity:          Option<NonZeroUsize>,
  greedy:                    bool,
  max_degree_of_parallelism: NonZeroUsize,
  max_messages_per_task:     Option<NonZeroUsize>,
  cancellation:              Option<CancellationSignal>,
}

impl BlockOptions {
  /// Creates unbounded, greedy, single-worker options running on `executor`.
  #[must_use]
  pub const fn new(executor: ExecutorShared) -> Self {
    Self {
      executor,
      bounded_capacity: None,
      greedy: true,
      max_degree_of_parallelism: NonZeroUsize::MIN,
      max_messages_per_task: None,
      cancellation: None,
    }
  }

  /// Limits the number of items the block holds before applying back-pressure.
  #[must_use]
  pub fn with_bounded_capacity(mut self, capacity: NonZeroUsize) -> Self {
    self.bounded_capacity = Some(capacity);
    self
  }

  /// Sets whether offers are accepted eagerly.
  ///
  /// Non-greedy blocks postpone every offer that carries a source and pull it later.
  #[must_use]
  pub fn with_greedy(mut self, greedy: bool) -> Self {
    self.greedy = greedy;
    self
  }

  /// Sets the maximum number of concurrent workers running user code.
  #[must_use]
  pub fn with_max_degree_of_parallelism(mut self, parallelism: NonZeroUsize) -> Self {
    self.max_degree_of_parallelism = parallelism;
    self
  }

  /// Sets how many items one worker processes before yielding the executor thread.
  #[must_use]
  pub fn with_max_messages_per_task(mut self, budget: NonZeroUsize) -> Self {
    self.max_messages_per_task = Some(budget);
    self
  }

  /// Cancels the block when `signal` fires.
  #[must_use]
  pub fn with_cancellation(mut self, signal: CancellationSignal) -> Self {
    self.cancellation = Some(signal);
    self
  }

  /// Returns the executor.
  #[must_use]
  pub const fn executor(&self) -> &ExecutorShared {
    &self.executor
  }

  /// Returns the bounded capacity, if any.
  #[must_use]
  pub const fn bounded_capacity(&self) -> Option<NonZeroUsize> {
    self.bounded_capacity
  }

  /// Returns whether the block is greedy.
  #[must_use]
  pub const fn greedy(&self) -> bool {
    self.greedy
  }

  /// Returns the maximum degree of parallelism.
  #[must_use]
  pub const fn max_degree_of_parallelism(&self) -> NonZeroUsize {
    self.max_degree_of_parallelism
  }

  /// Returns the per-task item budget, if any.
  #[must_use]
  pub const fn max_messages_per_task(&self) -> Option<NonZeroUsize> {
    self.max_messages_per_task
  }

  /// Returns the cancellation signal, if any.
  #[must_use]
  pub const fn cancellation(&self) -> Option<&CancellationSignal> {
    self.cancellation.as_ref()
  }

  /// Derives the mailbox configuration for a block releasing capacity as described by `release`.
  #[must_use]
  pub const fn mailbox_config(&self, release: CapacityRelease) -> MailboxConfig {
    let mut config = MailboxConfig::new().with_greedy(self.greedy).with_capacity_release(release);
    if let Some(capacity) = self.bounded_capacity {
      config = config.with_bounded_capacity(capacity);
    }
    if let Some(budget) = self.max_messages_per_task {
      config = config.with_max_messages_per_task(budget);
    }
    config
  }
}
