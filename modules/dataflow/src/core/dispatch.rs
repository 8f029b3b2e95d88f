//! Execution seams: executors, the parallelism throttle, and processing strategies.

mod action_strategy;
mod dispatch_executor;
mod inline_executor;
mod parallelism_throttle;
mod processing_strategy;
mod serial_strategy;

pub use action_strategy::ActionStrategy;
pub use dispatch_executor::{DispatchExecutor, DispatchTask, ExecutorShared};
pub use inline_executor::InlineExecutor;
pub use parallelism_throttle::ParallelismThrottle;
pub use processing_strategy::ProcessingStrategy;
pub use serial_strategy::SerialStrategy;
