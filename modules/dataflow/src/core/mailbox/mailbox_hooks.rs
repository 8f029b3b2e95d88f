use alloc::sync::Arc;

/// Final admission check applied to an offered value.
pub type AdmissionPredicate<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// Callback run once when the mailbox stopped accepting input and everything was processed.
pub type DrainedHook = Arc<dyn Fn() + Send + Sync>;

/// Policy closures supplied by the owning block.
pub struct MailboxHooks<T> {
  pub(crate) admission:  Option<AdmissionPredicate<T>>,
  pub(crate) on_drained: Option<DrainedHook>,
}

impl<T> MailboxHooks<T> {
  /// Creates hooks that admit everything and ignore draining.
  #[must_use]
  pub const fn new() -> Self {
    Self { admission: None, on_drained: None }
  }

  /// Vetoes values for which `predicate` returns `false`.
  ///
  /// A veto makes the block decline permanently.
  #[must_use]
  pub fn with_admission(mut self, predicate: AdmissionPredicate<T>) -> Self {
    self.admission = Some(predicate);
    self
  }

  /// Runs `hook` once the input is closed and fully processed.
  #[must_use]
  pub fn with_on_drained(mut self, hook: DrainedHook) -> Self {
    self.on_drained = Some(hook);
    self
  }
}

impl<T> Default for MailboxHooks<T> {
  fn default() -> Self {
    Self::new()
  }
}
