use core::num::NonZeroUsize;

use super::LinkPosition;


/// Options applied to one link between a source and a target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LinkOptions {
  propagate_completion: bool,
  max_messages:         Option<NonZeroUsize>,
  position:             LinkPosition,
}

impl LinkOptions {
  /// Creates options for an unbounded appended link without completion propagation.
  #[must_use]
  pub const fn new() -> Self {
    Self { propagate_completion: false, max_messages: None, position: LinkPosition::Append }
  }

  /// Sets whether the source's completion or fault is forwarded to the target.
  #[must_use]
  pub const fn with_propagate_completion(mut self, propagate: bool) -> Self {
    self.propagate_completion = propagate;
    self
  }

  /// Unlinks automatically after `max` delivered messages.
  #[must_use]
  pub const fn with_max_messages(mut self, max: NonZeroUsize) -> Self {
    self.max_messages = Some(max);
    self
  }

  /// Sets the position of the link in the offer order.
  #[must_use]
  pub const fn with_position(mut self, position: LinkPosition) -> Self {
    self.position = position;
    self
  }

  /// Returns whether completion is propagated.
  #[must_use]
  pub const fn propagate_completion(&self) -> bool {
    self.propagate_completion
  }

  /// Returns the message limit, if any.
  #[must_use]
  pub const fn max_messages(&self) -> Option<NonZeroUsize> {
    self.max_messages
  }

  /// Returns the link position.
  #[must_use]
  pub const fn position(&self) -> LinkPosition {
    self.position
  }
}
