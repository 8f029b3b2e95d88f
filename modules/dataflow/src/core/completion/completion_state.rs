use crate::core::error::AggregateFault;


/// Terminal state of a block.
///
/// Once a block leaves [`CompletionState::Running`] the state never changes again.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CompletionState {
  /// The block has not settled yet.
  Running,
  /// The block finished normally.
  Completed,
  /// The block failed; all retained faults are listed in report order.
  Faulted(AggregateFault),
  /// The block was cancelled.
  Cancelled,
}

impl CompletionState {
  /// Returns `true` for any state other than [`CompletionState::Running`].
  #[must_use]
  pub const fn is_settled(&self) -> bool {
    !matches!(self, CompletionState::Running)
  }

  /// Returns `true` for [`CompletionState::Faulted`].
  #[must_use]
  pub const fn is_faulted(&self) -> bool {
    matches!(self, CompletionState::Faulted(_))
  }

  /// Returns the aggregate fault when the block faulted.
  #[must_use]
  pub const fn fault(&self) -> Option<&AggregateFault> {
    match self {
      | CompletionState::Faulted(aggregate) => Some(aggregate),
      | _ => None,
    }
  }
}
