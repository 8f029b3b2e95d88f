use alloc::{boxed::Box, sync::Arc, vec::Vec};
use core::mem;

use spin::Mutex;

#[cfg(test)]
mod tests;

type CancelCallback = Box<dyn FnOnce() + Send>;

struct SignalState {
  cancelled: bool,
  callbacks: Vec<CancelCallback>,
}

/// Cooperative cancellation signal that can be shared across blocks.
///
/// Cancelling runs every registered callback once; callbacks registered after cancellation run
/// immediately.
#[derive(Clone)]
pub struct CancellationSignal {
  state: Arc<Mutex<SignalState>>,
}

impl CancellationSignal {
  /// Creates a signal in the non-cancelled state.
  #[must_use]
  pub fn new() -> Self {
    Self { state: Arc::new(Mutex::new(SignalState { cancelled: false, callbacks: Vec::new() })) }
  }

  /// Cancels the signal.
  ///
  /// Returns `true` when this call performed the cancellation.
  pub fn cancel(&self) -> bool {
    let callbacks = {
      let mut state = self.state.lock();
      if state.cancelled {
        return false;
      }
      state.cancelled = true;
      mem::take(&mut state.callbacks)
    };
    for callback in callbacks {
      callback();
    }
    true
  }

  /// Returns `true` once cancelled.
  #[must_use]
  pub fn is_cancelled(&self) -> bool {
    self.state.lock().cancelled
  }

  /// Registers a callback run on cancellation.
  pub fn on_cancel<F>(&self, callback: F)
  where
    F: FnOnce() + Send + 'static, {
    {
      let mut state = self.state.lock();
      if !state.cancelled {
        state.callbacks.push(Box::new(callback));
        return;
      }
    }
    callback();
  }
}

impl Default for CancellationSignal {
  fn default() -> Self {
    Self::new()
  }
}
