use core::num::NonZeroUsize;

use super::CapacityRelease;

#[cfg(test)]
mod tests;

/// Admission and scheduling settings of a mailbox.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MailboxConfig {
  bounded_capacity:      Option<NonZeroUsize>,
  greedy:                bool,
  max_messages_per_task: Option<NonZeroUsize>,
  capacity_release:      CapacityRelease,
}

impl MailboxConfig {
  /// Creates an unbounded greedy configuration without a per-task budget.
  #[must_use]
  pub const fn new() -> Self {
    Self {
      bounded_capacity:      None,
      greedy:                true,
      max_messages_per_task: None,
      capacity_release:      CapacityRelease::OnProcessed,
    }
  }

  /// Limits the number of items held by the block.
  #[must_use]
  pub const fn with_bounded_capacity(mut self, capacity: NonZeroUsize) -> Self {
    self.bounded_capacity = Some(capacity);
    self
  }

  /// Sets whether offers are accepted eagerly.
  ///
  /// A non-greedy mailbox postpones every offer that carries a source and pulls it on the next
  /// retry pass with a plain consume, without reserving first. Non-greedy therefore defers the
  /// accept rather than coordinating it with other inputs; there is no join-style
  /// reserve-all-then-consume.
  #[must_use]
  pub const fn with_greedy(mut self, greedy: bool) -> Self {
    self.greedy = greedy;
    self
  }

  /// Sets the number of items a worker processes before yielding.
  #[must_use]
  pub const fn with_max_messages_per_task(mut self, budget: NonZeroUsize) -> Self {
    self.max_messages_per_task = Some(budget);
    self
  }

  /// Sets when capacity is released.
  #[must_use]
  pub const fn with_capacity_release(mut self, release: CapacityRelease) -> Self {
    self.capacity_release = release;
    self
  }

  /// Returns the bounded capacity.
  #[must_use]
  pub const fn bounded_capacity(&self) -> Option<NonZeroUsize> {
    self.bounded_capacity
  }

  /// Returns whether the mailbox is greedy.
  #[must_use]
  pub const fn greedy(&self) -> bool {
    self.greedy
  }

  /// Returns the per-task budget.
  #[must_use]
  pub const fn max_messages_per_task(&self) -> Option<NonZeroUsize> {
    self.max_messages_per_task
  }

  /// Returns the capacity release mode.
  #[must_use]
  pub const fn capacity_release(&self) -> CapacityRelease {
    self.capacity_release
  }

  pub(crate) const fn task_budget(&self) -> usize {
    match self.max_messages_per_task {
      | Some(budget) => budget.get(),
      | None => usize::MAX,
    }
  }

  pub(crate) const fn has_room(&self, item_count: usize) -> bool {
    match self.bounded_capacity {
      | Some(capacity) => item_count < capacity.get(),
      | None => true,
    }
  }
}

impl Default for MailboxConfig {
  fn default() -> Self {
    Self::new()
  }
}
