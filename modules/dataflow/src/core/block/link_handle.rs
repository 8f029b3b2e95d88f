use alloc::sync::Weak;

use super::LinkRegistry;


/// Handle returned by `link_to`.
///
/// Dropping the handle unlinks the target. Call [`LinkHandle::detach`] to keep the link for the
/// lifetime of the source.
pub struct LinkHandle {
  link_id:  u64,
  registry: Option<Weak<dyn LinkRegistry>>,
}

impl LinkHandle {
  pub(crate) fn new(link_id: u64, registry: Weak<dyn LinkRegistry>) -> Self {
    Self { link_id, registry: Some(registry) }
  }

  /// Handle for a link that was never registered, e.g. because the source already terminated.
  pub(crate) const fn inert() -> Self {
    Self { link_id: 0, registry: None }
  }

  /// Returns the link id.
  #[must_use]
  pub const fn link_id(&self) -> u64 {
    self.link_id
  }

  /// Removes the link; returns `false` when it was already gone.
  pub fn unlink(mut self) -> bool {
    match self.registry.take().and_then(|registry| registry.upgrade()) {
      | Some(registry) => registry.unlink(self.link_id),
      | None => false,
    }
  }

  /// Returns `true` while the link is registered.
  #[must_use]
  pub fn is_linked(&self) -> bool {
    match self.registry.as_ref().and_then(Weak::upgrade) {
      | Some(registry) => registry.is_linked(self.link_id),
      | None => false,
    }
  }

  /// Keeps the link alive after the handle is dropped.
  pub fn detach(mut self) {
    self.registry = None;
  }
}

impl Drop for LinkHandle {
  fn drop(&mut self) {
    if let Some(registry) = self.registry.take().and_then(|registry| registry.upgrade()) {
      registry.unlink(self.link_id);
    }
  }
}
