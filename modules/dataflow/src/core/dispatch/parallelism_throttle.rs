use core::num::NonZeroUsize;

use portable_atomic::{AtomicUsize, Ordering};


const FLAG_PENDING: usize = 1;
const SLOT: usize = 2;

/// Bounds the number of concurrent workers of a block with one atomic word.
///
/// Bit 0 marks a worker that was scheduled but has not started; the remaining bits count
/// running workers scaled by two. Only one worker can be pending at a time, so the block never
/// floods the executor with workers that would find nothing to do.
pub struct ParallelismThrottle {
  state: AtomicUsize,
  limit: usize,
}

impl ParallelismThrottle {
  /// Creates an idle throttle allowing `limit` concurrent workers.
  #[must_use]
  pub const fn new(limit: NonZeroUsize) -> Self {
    Self { state: AtomicUsize::new(0), limit: limit.get() }
  }

  /// Tries to reserve the right to schedule a worker.
  ///
  /// Succeeds only while no worker is pending and fewer than `limit` workers are running.
  #[must_use]
  pub fn try_schedule(&self) -> bool {
    let mut current = self.state.load(Ordering::Acquire);
    loop {
      if current & FLAG_PENDING != 0 || current / SLOT >= self.limit {
        return false;
      }
      match self.state.compare_exchange_weak(current, current | FLAG_PENDING, Ordering::AcqRel, Ordering::Acquire) {
        | Ok(_) => return true,
        | Err(observed) => current = observed,
      }
    }
  }

  /// Turns the pending worker into a running one.
  pub fn worker_started(&self) {
    self.state.fetch_add(FLAG_PENDING, Ordering::AcqRel);
  }

  /// Records that a running worker finished.
  ///
  /// Returns `true` when no worker is running or pending afterwards.
  #[must_use]
  pub fn worker_finished(&self) -> bool {
    self.state.fetch_sub(SLOT, Ordering::AcqRel) == SLOT
  }

  /// Rolls back a reservation whose worker could not be submitted.
  ///
  /// Returns `true` when the throttle is idle afterwards.
  #[must_use]
  pub fn schedule_failed(&self) -> bool {
    self.state.fetch_sub(FLAG_PENDING, Ordering::AcqRel) == FLAG_PENDING
  }

  /// Returns `true` when no worker is running or pending.
  #[must_use]
  pub fn is_idle(&self) -> bool {
    self.state.load(Ordering::Acquire) == 0
  }

  /// Returns `true` while a scheduled worker has not started yet.
  #[must_use]
  pub fn is_pending(&self) -> bool {
    self.state.load(Ordering::Acquire) & FLAG_PENDING != 0
  }

  /// Returns the number of running workers.
  #[must_use]
  pub fn running(&self) -> usize {
    self.state.load(Ordering::Acquire) / SLOT
  }

  /// Returns the configured worker limit.
  #[must_use]
  pub const fn limit(&self) -> usize {
    self.limit
  }
}
