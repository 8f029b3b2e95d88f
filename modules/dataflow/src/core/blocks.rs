//! Reference blocks built on the mailbox and the source core.
//!
//! The blocks hold no concurrency logic of their own; they wire policy closures into the core
//! components and forward the block capabilities to them.

mod action_block;
mod broadcast_block;
mod buffer_block;
mod cancellation;
mod reorder_buffer;
mod transform_block;

pub use action_block::ActionBlock;
pub use broadcast_block::BroadcastBlock;
pub use buffer_block::BufferBlock;
pub use reorder_buffer::ReorderBuffer;
pub use transform_block::TransformBlock;
