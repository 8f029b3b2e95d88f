use alloc::{collections::VecDeque, vec::Vec};

use super::TargetRegistration;
use crate::core::{block::LinkPosition, message::BlockId};


/// Linked targets of a source in offer order, plus the links made while a head was current.
pub(crate) struct TargetRegistry<T> {
  links:          VecDeque<TargetRegistration<T>>,
  staged_prepend: VecDeque<BlockId>,
  staged_append:  VecDeque<BlockId>,
}

impl<T> TargetRegistry<T> {
  pub(crate) const fn new() -> Self {
    Self { links: VecDeque::new(), staged_prepend: VecDeque::new(), staged_append: VecDeque::new() }
  }

  /// Adds a link; `staged` links join the pass of the current head after the existing ones.
  pub(crate) fn add(&mut self, registration: TargetRegistration<T>, position: LinkPosition, staged: bool) {
    let target_id = registration.target_id();
    match position {
      | LinkPosition::Prepend => {
        self.links.push_front(registration);
        if staged {
          self.staged_prepend.push_front(target_id);
        }
      },
      | LinkPosition::Append => {
        self.links.push_back(registration);
        if staged {
          self.staged_append.push_back(target_id);
        }
      },
    }
  }

  pub(crate) fn remove_link(&mut self, link_id: u64) -> Option<TargetRegistration<T>> {
    let index = self.links.iter().position(|registration| registration.link_id() == link_id)?;
    let removed = self.links.remove(index)?;
    self.forget_staged(removed.target_id());
    Some(removed)
  }

  pub(crate) fn remove_target(&mut self, target_id: BlockId) -> Option<TargetRegistration<T>> {
    let link_id = self.get(target_id)?.link_id();
    self.remove_link(link_id)
  }

  pub(crate) fn get(&self, target_id: BlockId) -> Option<&TargetRegistration<T>> {
    self.links.iter().find(|registration| registration.target_id() == target_id)
  }

  pub(crate) fn get_mut(&mut self, target_id: BlockId) -> Option<&mut TargetRegistration<T>> {
    self.links.iter_mut().find(|registration| registration.target_id() == target_id)
  }

  pub(crate) fn contains_link(&self, link_id: u64) -> bool {
    self.links.iter().any(|registration| registration.link_id() == link_id)
  }

  pub(crate) fn contains_target(&self, target_id: BlockId) -> bool {
    self.get(target_id).is_some()
  }

  /// Returns the target ids in offer order.
  pub(crate) fn order(&self) -> VecDeque<BlockId> {
    self.links.iter().map(TargetRegistration::target_id).collect()
  }

  pub(crate) fn target_ids(&self) -> impl Iterator<Item = BlockId> + '_ {
    self.links.iter().map(TargetRegistration::target_id)
  }

  /// Takes staged links: most recent prepends first, then appends in link order.
  pub(crate) fn take_staged(&mut self) -> Vec<BlockId> {
    let mut staged: Vec<BlockId> = self.staged_prepend.drain(..).collect();
    staged.extend(self.staged_append.drain(..));
    staged
  }

  pub(crate) fn clear_staged(&mut self) {
    self.staged_prepend.clear();
    self.staged_append.clear();
  }

  pub(crate) fn drain(&mut self) -> Vec<TargetRegistration<T>> {
    self.clear_staged();
    self.links.drain(..).collect()
  }

  pub(crate) fn len(&self) -> usize {
    self.links.len()
  }

  pub(crate) fn is_empty(&self) -> bool {
    self.links.is_empty()
  }

  fn forget_staged(&mut self, target_id: BlockId) {
    self.staged_prepend.retain(|id| *id != target_id);
    self.staged_append.retain(|id| *id != target_id);
  }
}
