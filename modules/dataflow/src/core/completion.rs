//! Completion, fault, and cancellation tracking.
//!
//! Every block owns one [`CompletionAggregator`]. Faults and cancellation requests pass through
//! the same gate and settle the block at most once; requests arriving while the block is inside
//! an unsafe window are held back and replayed when the window closes.

mod cancellation_signal;
mod completion_aggregator;
mod completion_handle;
mod completion_state;
mod fault_disposition;

pub use cancellation_signal::CancellationSignal;
pub use completion_aggregator::CompletionAggregator;
pub use completion_handle::CompletionHandle;
pub use completion_state::CompletionState;
pub use fault_disposition::FaultDisposition;
