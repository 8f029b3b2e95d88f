use alloc::{collections::VecDeque, vec::Vec};

use hashbrown::HashSet;

use super::{TargetRegistration, target_registry::TargetRegistry};
use crate::core::message::{BlockId, MessageHeader};

/// Mutable state of a source core, guarded by its lock.
pub(crate) struct OutgoingState<T> {
  pub(crate) messages:             VecDeque<(MessageHeader, T)>,
  pub(crate) weight:               usize,
  pub(crate) next_header:          i64,
  pub(crate) reserved_for:         Option<BlockId>,
  pub(crate) in_flight_to:         Option<BlockId>,
  pub(crate) registry:             TargetRegistry<T>,
  pub(crate) pass_head:            Option<MessageHeader>,
  pub(crate) pass:                 VecDeque<BlockId>,
  pub(crate) postponed:            HashSet<BlockId>,
  pub(crate) retry:                VecDeque<BlockId>,
  pub(crate) delivered:            HashSet<BlockId>,
  pub(crate) completion_requested: bool,
  pub(crate) terminated:           bool,
  pub(crate) next_link_id:         u64,
}

impl<T> OutgoingState<T> {
  pub(crate) fn new() -> Self {
    Self {
      messages:             VecDeque::new(),
      weight:               0,
      next_header:          1,
      reserved_for:         None,
      in_flight_to:         None,
      registry:             TargetRegistry::new(),
      pass_head:            None,
      pass:                 VecDeque::new(),
      postponed:            HashSet::new(),
      retry:                VecDeque::new(),
      delivered:            HashSet::new(),
      completion_requested: false,
      terminated:           false,
      next_link_id:         1,
    }
  }

  pub(crate) fn head_header(&self) -> Option<MessageHeader> {
    self.messages.front().map(|(header, _)| *header)
  }

  pub(crate) fn allocate_header(&mut self) -> MessageHeader {
    let header = MessageHeader::new(self.next_header);
    self.next_header += 1;
    header
  }

  /// Returns `true` while a pass for the current head exists.
  pub(crate) fn head_is_current(&self) -> bool {
    self.pass_head.is_some() && self.pass_head == self.head_header()
  }

  /// Starts a fresh pass when the head changed since the last step.
  pub(crate) fn sync_pass(&mut self) {
    if self.head_is_current() {
      return;
    }
    self.pass_head = self.head_header();
    self.reserved_for = None;
    self.postponed.clear();
    self.retry.clear();
    self.delivered.clear();
    self.registry.clear_staged();
    self.pass = self.registry.order();
  }

  /// Offers the head again to every target that has not taken it or postponed it.
  pub(crate) fn rebuild_pass(&mut self) {
    self.registry.clear_staged();
    let mut pass = self.registry.order();
    pass.retain(|id| !self.postponed.contains(id) && !self.delivered.contains(id) && !self.retry.contains(id));
    self.pass = pass;
  }

  /// Moves a target whose pull failed to the retry queue.
  pub(crate) fn schedule_retry(&mut self, target_id: BlockId) {
    if !self.registry.contains_target(target_id) {
      return;
    }
    self.postponed.remove(&target_id);
    if !self.retry.contains(&target_id) {
      self.retry.push_back(target_id);
    }
  }

  pub(crate) fn forget_target(&mut self, target_id: BlockId) {
    self.postponed.remove(&target_id);
    self.delivered.remove(&target_id);
    self.retry.retain(|id| *id != target_id);
    self.pass.retain(|id| *id != target_id);
    if self.reserved_for == Some(target_id) {
      self.reserved_for = None;
    }
  }

  /// Picks the next target to offer the head to: retries first, then the pass.
  pub(crate) fn next_candidate(&mut self) -> Option<BlockId> {
    let staged = self.registry.take_staged();
    self.pass.extend(staged);
    while let Some(id) = self.retry.pop_front() {
      if self.registry.contains_target(id) && !self.delivered.contains(&id) {
        return Some(id);
      }
    }
    while let Some(id) = self.pass.pop_front() {
      if self.registry.contains_target(id) && !self.postponed.contains(&id) && !self.delivered.contains(&id) {
        return Some(id);
      }
    }
    None
  }

  /// Counts a delivery to `target_id`; removes the link when its message budget is used up.
  pub(crate) fn record_delivery(&mut self, target_id: BlockId) -> Option<TargetRegistration<T>> {
    let exhausted = self.registry.get_mut(target_id).is_some_and(TargetRegistration::record_delivery);
    if !exhausted {
      return None;
    }
    self.forget_target(target_id);
    self.registry.remove_target(target_id)
  }

  /// Returns `true` when every linked target took or declined the broadcast head.
  pub(crate) fn broadcast_head_done(&self) -> bool {
    !self.registry.is_empty() && self.registry.target_ids().all(|id| self.delivered.contains(&id))
  }

  pub(crate) fn pop_head(&mut self, weight: impl Fn(&T) -> usize) -> Option<T> {
    let (_, item) = self.messages.pop_front()?;
    self.weight = self.weight.saturating_sub(weight(&item));
    self.reserved_for = None;
    if self.messages.is_empty() {
      self.pass_head = None;
    }
    Some(item)
  }

  pub(crate) fn take_all(&mut self) -> Vec<T> {
    self.weight = 0;
    self.reserved_for = None;
    self.pass_head = None;
    self.messages.drain(..).map(|(_, item)| item).collect()
  }
}
