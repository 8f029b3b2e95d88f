use alloc::{boxed::Box, sync::Arc};

use crate::core::error::DispatchError;

/// Unit of work submitted to an executor.
pub type DispatchTask = Box<dyn FnOnce() + Send + 'static>;

/// Shared executor handle stored in block options.
pub type ExecutorShared = Arc<dyn DispatchExecutor>;

/// Abstraction over the thread pool that runs block workers and distribution rounds.
pub trait DispatchExecutor: Send + Sync {
  /// Submits a task for execution.
  ///
  /// # Errors
  ///
  /// Returns [`DispatchError`] when the executor refuses the task. The task is dropped without
  /// running in that case.
  fn execute(&self, task: DispatchTask) -> Result<(), DispatchError>;
}
