use alloc::vec::Vec;
use core::fmt;

use super::BlockFault;


/// Ordered list of the faults that settled a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateFault {
  faults: Vec<BlockFault>,
}

impl AggregateFault {
  /// Creates an aggregate from faults in report order.
  #[must_use]
  pub const fn new(faults: Vec<BlockFault>) -> Self {
    Self { faults }
  }

  /// Returns the recorded faults in report order.
  #[must_use]
  pub fn faults(&self) -> &[BlockFault] {
    &self.faults
  }

  /// Returns the number of recorded faults.
  #[must_use]
  pub fn len(&self) -> usize {
    self.faults.len()
  }

  /// Returns `true` when no fault is recorded.
  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.faults.is_empty()
  }

  /// Consumes the aggregate and returns its faults.
  #[must_use]
  pub fn into_faults(self) -> Vec<BlockFault> {
    self.faults
  }
}

impl fmt::Display for AggregateFault {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} fault(s)", self.faults.len())?;
    for (index, fault) in self.faults.iter().enumerate() {
      let separator = if index == 0 { ": " } else { "; " };
      write!(f, "{separator}{fault}")?;
    }
    Ok(())
  }
}

impl core::error::Error for AggregateFault {}
