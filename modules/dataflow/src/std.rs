//! Tokio executor, async processing, and blocking waits for the standard toolbox.

mod async_action_strategy;
mod completion_wait_ext;
mod tokio_dispatch_executor;

pub use async_action_strategy::AsyncActionStrategy;
pub use completion_wait_ext::CompletionWaitExt;
pub use tokio_dispatch_executor::TokioDispatchExecutor;
