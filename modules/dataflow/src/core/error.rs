//! Error taxonomy shared by every block.

mod aggregate_fault;
mod block_fault;
mod dispatch_error;
mod protocol_error;

pub use aggregate_fault::AggregateFault;
pub use block_fault::BlockFault;
pub use dispatch_error::DispatchError;
pub use protocol_error::ProtocolError;
