//! Block capabilities, options, and link handles.
//!
//! Targets accept offers; sources hand out pending values through the reserve/consume/release
//! contract and fan them out to linked targets.

mod block_options;
mod dataflow_block;
mod link_handle;
mod link_options;
mod link_position;
mod link_registry;
mod message_source;
mod source_block;
mod target_block;

pub use block_options::BlockOptions;
pub use dataflow_block::DataflowBlock;
pub use link_handle::LinkHandle;
pub use link_options::LinkOptions;
pub use link_position::LinkPosition;
pub use link_registry::LinkRegistry;
pub use message_source::{MessageSource, SourceRef};
pub use source_block::SourceBlock;
pub use target_block::{TargetBlock, TargetRef};
