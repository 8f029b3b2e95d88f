use portable_atomic::{AtomicI64, Ordering};

use super::MessageHeader;


/// Monotonic header allocator owned by an emitting block.
pub struct HeaderSequence {
  next: AtomicI64,
}

impl HeaderSequence {
  /// Creates a sequence whose first header has id `1`.
  #[must_use]
  pub const fn new() -> Self {
    Self { next: AtomicI64::new(1) }
  }

  /// Allocates the next header.
  #[must_use]
  pub fn next_header(&self) -> MessageHeader {
    MessageHeader::new(self.next.fetch_add(1, Ordering::AcqRel))
  }

  /// Returns the id the next allocation will use.
  #[must_use]
  pub fn peek(&self) -> i64 {
    self.next.load(Ordering::Acquire)
  }
}

impl Default for HeaderSequence {
  fn default() -> Self {
    Self::new()
  }
}
