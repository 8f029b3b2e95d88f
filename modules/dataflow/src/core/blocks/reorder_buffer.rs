use alloc::{collections::BTreeMap, vec::Vec};


/// Restores input order for results produced by parallel workers.
///
/// Results are keyed by the sequence number of the input that produced them; a result is
/// released only after every earlier sequence has been released or skipped.
pub struct ReorderBuffer<T> {
  next:    u64,
  pending: BTreeMap<u64, Option<T>>,
}

impl<T> ReorderBuffer<T> {
  /// Creates a buffer expecting sequence `0` first.
  #[must_use]
  pub const fn new() -> Self {
    Self { next: 0, pending: BTreeMap::new() }
  }

  /// Records the result for `sequence` and returns every result now in order.
  pub fn push(&mut self, sequence: u64, item: T) -> Vec<T> {
    self.insert(sequence, Some(item))
  }

  /// Records that `sequence` produced nothing and returns every result now in order.
  pub fn skip(&mut self, sequence: u64) -> Vec<T> {
    self.insert(sequence, None)
  }

  /// Returns the number of results waiting for an earlier sequence.
  #[must_use]
  pub fn waiting(&self) -> usize {
    self.pending.len()
  }

  /// Returns the next sequence to be released.
  #[must_use]
  pub const fn next_sequence(&self) -> u64 {
    self.next
  }

  fn insert(&mut self, sequence: u64, item: Option<T>) -> Vec<T> {
    if sequence < self.next {
      return Vec::new();
    }
    self.pending.insert(sequence, item);
    let mut ready = Vec::new();
    while let Some(item) = self.pending.remove(&self.next) {
      self.next += 1;
      ready.extend(item);
    }
    ready
  }
}

impl<T> Default for ReorderBuffer<T> {
  fn default() -> Self {
    Self::new()
  }
}
