use core::{
  future::Future,
  pin::Pin,
  task::{Context, Poll},
};

use super::{CompletionAggregator, CompletionState};
use crate::core::message::BlockId;


/// Observer of a block's completion.
///
/// The handle is a [`Future`] resolving to the settled [`CompletionState`]; it can be cloned and
/// awaited from several places.
#[derive(Clone)]
pub struct CompletionHandle {
  aggregator: CompletionAggregator,
}

impl CompletionHandle {
  pub(crate) const fn new(aggregator: CompletionAggregator) -> Self {
    Self { aggregator }
  }

  /// Returns the observed block.
  #[must_use]
  pub const fn block_id(&self) -> BlockId {
    self.aggregator.owner()
  }

  /// Returns the current state without waiting.
  #[must_use]
  pub fn state(&self) -> CompletionState {
    self.aggregator.state()
  }

  /// Returns `true` once the block settled.
  #[must_use]
  pub fn is_settled(&self) -> bool {
    self.aggregator.is_settled()
  }

  /// Registers a callback invoked once with the settled state.
  pub fn on_settled<F>(&self, listener: F)
  where
    F: FnOnce(&CompletionState) + Send + 'static, {
    self.aggregator.on_settled(listener);
  }
}

impl Future for CompletionHandle {
  type Output = CompletionState;

  fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
    self.aggregator.poll_settled(cx.waker())
  }
}
