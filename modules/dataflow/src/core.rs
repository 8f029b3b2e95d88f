/// Message identity and offer outcomes.
pub mod message;

/// Usage errors and fault types.
pub mod error;

/// Completion aggregation, observation and cancellation.
pub mod completion;

/// Executors, the parallelism throttle and processing strategies.
pub mod dispatch;

/// Block capability traits and block options.
pub mod block;

/// Inbound mailbox.
pub mod mailbox;

/// Outbound distribution and target links.
pub mod distribution;

/// Reservation vault for contested single-value handoffs.
pub mod vault;

/// Reference blocks built on the core.
pub mod blocks;

#[cfg(test)]
mod testing;
