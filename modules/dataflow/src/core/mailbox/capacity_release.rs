/// When capacity taken by an accepted item is given back.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CapacityRelease {
  /// As soon as the processing strategy handled the item.
  #[default]
  OnProcessed,
  /// Only when the owning block calls `Mailbox::release_capacity`, e.g. once the item left the
  /// outgoing store.
  Manual,
}
