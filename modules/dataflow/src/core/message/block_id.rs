use core::fmt;

use portable_atomic::{AtomicU64, Ordering};


static NEXT_BLOCK_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a block taking part in the handoff protocol.
///
/// Sources record postponements against it and reservations are keyed by it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(u64);

impl BlockId {
  /// Allocates a fresh identifier, unique for the lifetime of the process.
  #[must_use]
  pub fn allocate() -> Self {
    Self(NEXT_BLOCK_ID.fetch_add(1, Ordering::Relaxed))
  }

  /// Wraps a raw identifier value.
  #[must_use]
  pub const fn from_raw(value: u64) -> Self {
    Self(value)
  }

  /// Returns the raw identifier value.
  #[must_use]
  pub const fn value(self) -> u64 {
    self.0
  }
}

impl fmt::Display for BlockId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "block-{}", self.0)
  }
}
