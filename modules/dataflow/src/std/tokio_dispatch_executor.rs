use alloc::sync::Arc;

use tokio::runtime::Handle;

use crate::core::{
  dispatch::{DispatchExecutor, DispatchTask, ExecutorShared},
  error::DispatchError,
};


/// [`DispatchExecutor`] that runs block work on the blocking pool of a Tokio runtime.
///
/// Workers run user callbacks to completion and may block, so they never occupy the runtime's
/// async worker threads.
pub struct TokioDispatchExecutor {
  handle: Handle,
}

impl TokioDispatchExecutor {
  /// Creates an executor using the provided Tokio runtime handle.
  #[must_use]
  pub const fn new(handle: Handle) -> Self {
    Self { handle }
  }

  /// Creates an executor bound to the runtime the caller runs in.
  ///
  /// # Errors
  ///
  /// Returns [`DispatchError::ExecutorUnavailable`] when called outside a Tokio runtime.
  pub fn current() -> Result<Self, DispatchError> {
    Handle::try_current().map(Self::new).map_err(|_| DispatchError::ExecutorUnavailable)
  }

  /// Wraps the executor for use in block options.
  #[must_use]
  pub fn shared(self) -> ExecutorShared {
    Arc::new(self)
  }

  /// Returns the internal Tokio runtime handle.
  #[must_use]
  pub const fn handle(&self) -> &Handle {
    &self.handle
  }
}

impl DispatchExecutor for TokioDispatchExecutor {
  fn execute(&self, task: DispatchTask) -> Result<(), DispatchError> {
    drop(self.handle.spawn_blocking(task));
    Ok(())
  }
}
