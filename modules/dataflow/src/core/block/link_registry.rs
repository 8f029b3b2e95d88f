/// Owner of link registrations, addressed by the id stored in a link handle.
pub trait LinkRegistry: Send + Sync {
  /// Removes the link; returns `false` when it was already gone.
  fn unlink(&self, link_id: u64) -> bool;

  /// Returns `true` while the link is registered.
  fn is_linked(&self, link_id: u64) -> bool;
}
