use alloc::sync::Arc;

use super::DistributionMode;


/// Weight of one produced value in `output_count`.
pub type ItemWeight<T> = Arc<dyn Fn(&T) -> usize + Send + Sync>;

/// Called with the number of values that left the outgoing store.
pub type ItemsRemovedHook = Arc<dyn Fn(usize) + Send + Sync>;

/// Settings of a [`SourceCore`](super::SourceCore).
pub struct SourceCoreConfig<T> {
  mode:             DistributionMode<T>,
  item_weight:      Option<ItemWeight<T>>,
  on_items_removed: Option<ItemsRemovedHook>,
}

impl<T> SourceCoreConfig<T> {
  /// Creates an exclusive configuration where every value weighs one.
  #[must_use]
  pub const fn new() -> Self {
    Self { mode: DistributionMode::Exclusive, item_weight: None, on_items_removed: None }
  }

  /// Sets the distribution mode.
  #[must_use]
  pub fn with_mode(mut self, mode: DistributionMode<T>) -> Self {
    self.mode = mode;
    self
  }

  /// Sets the weight function used by `output_count`.
  #[must_use]
  pub fn with_item_weight(mut self, weight: ItemWeight<T>) -> Self {
    self.item_weight = Some(weight);
    self
  }

  /// Sets the hook notified when values leave the store.
  #[must_use]
  pub fn with_on_items_removed(mut self, hook: ItemsRemovedHook) -> Self {
    self.on_items_removed = Some(hook);
    self
  }

  /// Returns the distribution mode.
  #[must_use]
  pub const fn mode(&self) -> &DistributionMode<T> {
    &self.mode
  }

  pub(crate) fn weight_of(&self, item: &T) -> usize {
    match &self.item_weight {
      | Some(weight) => weight(item),
      | None => 1,
    }
  }

  pub(crate) fn notify_removed(&self, count: usize) {
    if count == 0 {
      return;
    }
    if let Some(hook) = &self.on_items_removed {
      hook(count);
    }
  }
}

impl<T> Default for SourceCoreConfig<T> {
  fn default() -> Self {
    Self::new()
  }
}
