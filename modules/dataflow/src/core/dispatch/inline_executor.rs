use alloc::{collections::VecDeque, sync::Arc};

use portable_atomic::{AtomicBool, Ordering};
use spin::Mutex;

use super::{DispatchExecutor, DispatchTask, ExecutorShared};
use crate::core::error::DispatchError;

#[cfg(test)]
mod tests;

/// Executor that runs tasks on the submitting thread.
///
/// Submissions made while a task is running (re-entry) are queued and drained by the thread that
/// already owns the drain, so deep producer to consumer chains never grow the call stack.
pub struct InlineExecutor {
  queue:   Mutex<VecDeque<DispatchTask>>,
  running: AtomicBool,
}

impl InlineExecutor {
  /// Creates an idle executor.
  #[must_use]
  pub const fn new() -> Self {
    Self { queue: Mutex::new(VecDeque::new()), running: AtomicBool::new(false) }
  }

  /// Creates an executor wrapped for use in block options.
  #[must_use]
  pub fn shared() -> ExecutorShared {
    Arc::new(Self::new())
  }

  /// Returns the number of queued tasks.
  #[must_use]
  pub fn pending(&self) -> usize {
    self.queue.lock().len()
  }

  fn drain(&self) {
    loop {
      let task = self.queue.lock().pop_front();
      match task {
        | Some(task) => task(),
        | None => break,
      }
    }
  }
}

impl Default for InlineExecutor {
  fn default() -> Self {
    Self::new()
  }
}

impl DispatchExecutor for InlineExecutor {
  fn execute(&self, task: DispatchTask) -> Result<(), DispatchError> {
    self.queue.lock().push_back(task);
    loop {
      if self.running.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).is_err() {
        return Ok(());
      }
      self.drain();
      self.running.store(false, Ordering::Release);
      // a task may have been queued between the last pop and the release
      if self.queue.lock().is_empty() {
        return Ok(());
      }
    }
  }
}
