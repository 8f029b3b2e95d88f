extern crate std;

use alloc::sync::Arc;
use core::time::Duration;
use std::sync::{Condvar, Mutex, PoisonError};

use crate::core::completion::{CompletionHandle, CompletionState};


/// Blocking waits on a block's completion, for callers outside an async context.
pub trait CompletionWaitExt {
  /// Blocks until the block settled and returns the final state.
  fn wait(&self) -> CompletionState;

  /// Blocks until the block settled or `timeout` elapsed; returns `None` on timeout.
  fn wait_timeout(&self, timeout: Duration) -> Option<CompletionState>;
}

type Settled = Arc<(Mutex<Option<CompletionState>>, Condvar)>;

fn register(handle: &CompletionHandle) -> Settled {
  let settled: Settled = Arc::new((Mutex::new(None), Condvar::new()));
  let signal = settled.clone();
  handle.on_settled(move |state| {
    let (slot, ready) = &*signal;
    *slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(state.clone());
    ready.notify_all();
  });
  settled
}

impl CompletionWaitExt for CompletionHandle {
  fn wait(&self) -> CompletionState {
    let settled = register(self);
    let (slot, ready) = &*settled;
    let guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
    let mut guard = ready.wait_while(guard, |state| state.is_none()).unwrap_or_else(PoisonError::into_inner);
    guard.take().unwrap_or_else(|| self.state())
  }

  fn wait_timeout(&self, timeout: Duration) -> Option<CompletionState> {
    let settled = register(self);
    let (slot, ready) = &*settled;
    let guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
    let (mut guard, _) =
      ready.wait_timeout_while(guard, timeout, |state| state.is_none()).unwrap_or_else(PoisonError::into_inner);
    guard.take()
  }
}
