use alloc::{collections::VecDeque, vec::Vec};

use hashbrown::HashMap;

use crate::core::{
  block::SourceRef,
  message::{BlockId, MessageHeader},
};


/// Offers a mailbox promised to reconsider, at most one per source, in arrival order.
pub(crate) struct PostponedOffers<T> {
  entries: HashMap<BlockId, (SourceRef<T>, MessageHeader)>,
  order:   VecDeque<BlockId>,
}

impl<T> PostponedOffers<T> {
  pub(crate) fn new() -> Self {
    Self { entries: HashMap::new(), order: VecDeque::new() }
  }

  /// Records `header` against `source`; a newer header replaces the old one in place.
  pub(crate) fn push(&mut self, source: SourceRef<T>, header: MessageHeader) {
    let id = source.source_id();
    if self.entries.insert(id, (source, header)).is_none() {
      self.order.push_back(id);
    }
  }

  pub(crate) fn remove(&mut self, source: BlockId) -> Option<(SourceRef<T>, MessageHeader)> {
    let removed = self.entries.remove(&source);
    if removed.is_some() {
      self.order.retain(|id| *id != source);
    }
    removed
  }

  pub(crate) fn pop_front(&mut self) -> Option<(SourceRef<T>, MessageHeader)> {
    while let Some(id) = self.order.pop_front() {
      if let Some(entry) = self.entries.remove(&id) {
        return Some(entry);
      }
    }
    None
  }

  pub(crate) fn take_all(&mut self) -> Vec<(SourceRef<T>, MessageHeader)> {
    let mut drained = Vec::with_capacity(self.entries.len());
    while let Some(entry) = self.pop_front() {
      drained.push(entry);
    }
    drained
  }

  pub(crate) fn len(&self) -> usize {
    self.entries.len()
  }

  pub(crate) fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}
