//! Errors returned by dispatch executors.


/// Error conditions produced when submitting work to an executor.
#[derive(Clone, Copy, Debug, thiserror::Error, PartialEq, Eq)]
pub enum DispatchError {
  /// Executor is temporarily unable to accept new work.
  #[error("rejected execution")]
  RejectedExecution,
  /// Executor cannot be used (e.g. its runtime has shut down).
  #[error("executor unavailable")]
  ExecutorUnavailable,
}
