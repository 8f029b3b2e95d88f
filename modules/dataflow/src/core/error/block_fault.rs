use alloc::string::String;

use super::{AggregateFault, DispatchError};
use crate::core::completion::FaultDisposition;


/// Fault recorded against a block.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum BlockFault {
  /// A user callback returned an error.
  #[error("callback failed: {0}")]
  Callback(String),
  /// The block was faulted from outside through `DataflowBlock::fault`.
  #[error("faulted externally: {0}")]
  External(String),
  /// A linked source faulted and propagated its faults.
  #[error("upstream faulted: {0}")]
  Upstream(AggregateFault),
  /// The executor refused to run the block's work.
  #[error("dispatch failed: {0}")]
  Dispatch(#[from] DispatchError),
}

impl BlockFault {
  /// Creates a callback fault with the given message.
  #[must_use]
  pub fn callback(message: impl Into<String>) -> Self {
    Self::Callback(message.into())
  }

  /// Creates an external fault with the given message.
  #[must_use]
  pub fn external(message: impl Into<String>) -> Self {
    Self::External(message.into())
  }

  /// Returns how the completion aggregator treats this fault.
  ///
  /// Faults that merely echo an upstream failure are dropped once the block has a fault of its
  /// own.
  #[must_use]
  pub const fn disposition(&self) -> FaultDisposition {
    match self {
      | BlockFault::Upstream(_) => FaultDisposition::IgnorableIfSuperseded,
      | _ => FaultDisposition::Retain,
    }
  }
}
