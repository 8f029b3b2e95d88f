use alloc::sync::Arc;

/// Produces the copy handed to one broadcast target.
pub type CopyFn<T> = Arc<dyn Fn(&T) -> T + Send + Sync>;

/// How the head value is handed to linked targets.
pub enum DistributionMode<T> {
  /// The head goes to the first target that takes it.
  Exclusive,
  /// Every linked target gets its own copy; the head is retired once each target took it or
  /// declined.
  ///
  /// With a copy function targets pull their copy through `consume_message`, so values are
  /// only copied for targets that actually take them.
  Broadcast {
    /// Optional copy function; values are cloned when absent.
    copy: Option<CopyFn<T>>,
  },
}

impl<T> DistributionMode<T> {
  /// Returns `true` for broadcast distribution.
  #[must_use]
  pub const fn is_broadcast(&self) -> bool {
    matches!(self, DistributionMode::Broadcast { .. })
  }
}

impl<T> Clone for DistributionMode<T> {
  fn clone(&self) -> Self {
    match self {
      | DistributionMode::Exclusive => DistributionMode::Exclusive,
      | DistributionMode::Broadcast { copy } => DistributionMode::Broadcast { copy: copy.clone() },
    }
  }
}
