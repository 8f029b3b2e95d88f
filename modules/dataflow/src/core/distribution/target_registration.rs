use crate::core::{block::TargetRef, message::BlockId};

/// One linked target of a source.
pub struct TargetRegistration<T> {
  link_id:              u64,
  target:               TargetRef<T>,
  target_id:            BlockId,
  remaining:            Option<usize>,
  propagate_completion: bool,
}

impl<T> TargetRegistration<T> {
  pub(crate) fn new(link_id: u64, target: TargetRef<T>, remaining: Option<usize>, propagate_completion: bool) -> Self {
    let target_id = target.block_id();
    Self { link_id, target, target_id, remaining, propagate_completion }
  }

  /// Returns the link id.
  #[must_use]
  pub const fn link_id(&self) -> u64 {
    self.link_id
  }

  /// Returns the linked target.
  #[must_use]
  pub const fn target(&self) -> &TargetRef<T> {
    &self.target
  }

  /// Returns the identity of the linked target.
  #[must_use]
  pub const fn target_id(&self) -> BlockId {
    self.target_id
  }

  /// Returns the number of messages left before the link removes itself.
  #[must_use]
  pub const fn remaining(&self) -> Option<usize> {
    self.remaining
  }

  /// Returns whether completion is forwarded to the target.
  #[must_use]
  pub const fn propagate_completion(&self) -> bool {
    self.propagate_completion
  }

  /// Counts one delivered message; returns `true` when the link is used up.
  pub(crate) fn record_delivery(&mut self) -> bool {
    match &mut self.remaining {
      | Some(remaining) => {
        *remaining = remaining.saturating_sub(1);
        *remaining == 0
      },
      | None => false,
    }
  }
}
