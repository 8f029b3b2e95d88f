use alloc::{boxed::Box, sync::Arc, vec::Vec};
use core::{
  mem,
  task::{Poll, Waker},
};

use spin::Mutex;

use super::{CompletionHandle, CompletionState, FaultDisposition};
use crate::core::{
  error::{AggregateFault, BlockFault},
  message::BlockId,
};

#[cfg(test)]
mod tests;

type SettleListener = Box<dyn FnOnce(&CompletionState) + Send>;

struct AggregatorState {
  settled:            Option<CompletionState>,
  faults:             Vec<BlockFault>,
  cancel_requested:   bool,
  complete_requested: bool,
  unsafe_depth:       usize,
  listeners:          Vec<SettleListener>,
  wakers:             Vec<Waker>,
}

impl AggregatorState {
  const fn new() -> Self {
    Self {
      settled:            None,
      faults:             Vec::new(),
      cancel_requested:   false,
      complete_requested: false,
      unsafe_depth:       0,
      listeners:          Vec::new(),
      wakers:             Vec::new(),
    }
  }

  fn record_fault(&mut self, fault: BlockFault, disposition: FaultDisposition) -> bool {
    if !self.faults.is_empty() && disposition == FaultDisposition::IgnorableIfSuperseded {
      return false;
    }
    self.faults.push(fault);
    true
  }

  /// Settles when safe and something was requested; returns the notifications to run.
  fn try_settle(&mut self) -> Option<Settlement> {
    if self.settled.is_some() || self.unsafe_depth > 0 {
      return None;
    }
    let state = if !self.faults.is_empty() {
      CompletionState::Faulted(AggregateFault::new(mem::take(&mut self.faults)))
    } else if self.cancel_requested {
      CompletionState::Cancelled
    } else if self.complete_requested {
      CompletionState::Completed
    } else {
      return None;
    };
    self.settled = Some(state.clone());
    Some(Settlement { state, listeners: mem::take(&mut self.listeners), wakers: mem::take(&mut self.wakers) })
  }
}

struct Settlement {
  state:     CompletionState,
  listeners: Vec<SettleListener>,
  wakers:    Vec<Waker>,
}

/// Gate through which every termination request of a block passes.
///
/// The aggregator settles a block exactly once. Faults win over cancellation and cancellation
/// wins over normal completion. While the block is inside an unsafe window (a worker is running
/// user code) requests are recorded and replayed when the last window closes.
///
/// Fault aggregation keeps the first recorded fault unconditionally; later faults marked
/// [`FaultDisposition::IgnorableIfSuperseded`] are dropped, every other fault accumulates in
/// report order.
#[derive(Clone)]
pub struct CompletionAggregator {
  owner: BlockId,
  inner: Arc<Mutex<AggregatorState>>,
}

impl CompletionAggregator {
  /// Creates an aggregator for the given block.
  #[must_use]
  pub fn new(owner: BlockId) -> Self {
    Self { owner, inner: Arc::new(Mutex::new(AggregatorState::new())) }
  }

  /// Returns the block this aggregator belongs to.
  #[must_use]
  pub const fn owner(&self) -> BlockId {
    self.owner
  }

  /// Records a fault and settles the block when it is safe to do so.
  ///
  /// Returns `true` when the fault was retained.
  pub fn report_fault(&self, fault: BlockFault, disposition: FaultDisposition) -> bool {
    let (retained, settlement) = {
      let mut state = self.inner.lock();
      if state.settled.is_some() {
        (false, None)
      } else {
        let retained = state.record_fault(fault, disposition);
        (retained, state.try_settle())
      }
    };
    if retained {
      tracing::debug!(target: "fraktor::dataflow", block = %self.owner, "fault recorded");
    }
    self.notify(settlement);
    retained
  }

  /// Requests cooperative cancellation.
  pub fn request_cancel(&self) {
    let settlement = {
      let mut state = self.inner.lock();
      if state.settled.is_some() {
        return;
      }
      state.cancel_requested = true;
      state.try_settle()
    };
    self.notify(settlement);
  }

  /// Requests normal completion.
  ///
  /// Returns `false` when the block had already settled. A request made inside an unsafe window
  /// settles when the window closes unless a fault or cancellation takes precedence.
  pub fn try_complete(&self) -> bool {
    let settlement = {
      let mut state = self.inner.lock();
      if state.settled.is_some() {
        return false;
      }
      state.complete_requested = true;
      state.try_settle()
    };
    self.notify(settlement);
    true
  }

  /// Opens an unsafe window; settlement is deferred until every window is closed.
  pub fn enter_unsafe(&self) {
    self.inner.lock().unsafe_depth += 1;
  }

  /// Closes an unsafe window and replays deferred requests when it was the last one.
  pub fn leave_unsafe(&self) {
    let settlement = {
      let mut state = self.inner.lock();
      state.unsafe_depth = state.unsafe_depth.saturating_sub(1);
      state.try_settle()
    };
    self.notify(settlement);
  }

  /// Registers a listener invoked once with the settled state.
  ///
  /// The listener runs immediately on the calling thread when the block already settled.
  pub fn on_settled<F>(&self, listener: F)
  where
    F: FnOnce(&CompletionState) + Send + 'static, {
    let settled = {
      let mut state = self.inner.lock();
      match &state.settled {
        | Some(settled) => settled.clone(),
        | None => {
          state.listeners.push(Box::new(listener));
          return;
        },
      }
    };
    listener(&settled);
  }

  /// Polls for settlement, registering the waker when still running.
  pub fn poll_settled(&self, waker: &Waker) -> Poll<CompletionState> {
    let mut state = self.inner.lock();
    match &state.settled {
      | Some(settled) => Poll::Ready(settled.clone()),
      | None => {
        if !state.wakers.iter().any(|registered| registered.will_wake(waker)) {
          state.wakers.push(waker.clone());
        }
        Poll::Pending
      },
    }
  }

  /// Returns the current state.
  #[must_use]
  pub fn state(&self) -> CompletionState {
    self.inner.lock().settled.clone().unwrap_or(CompletionState::Running)
  }

  /// Returns `true` once the block settled.
  #[must_use]
  pub fn is_settled(&self) -> bool {
    self.inner.lock().settled.is_some()
  }

  /// Returns `true` when the block settled or a fault or cancellation is pending.
  ///
  /// Blocks stop accepting input as soon as this holds.
  #[must_use]
  pub fn termination_requested(&self) -> bool {
    let state = self.inner.lock();
    state.settled.is_some() || !state.faults.is_empty() || state.cancel_requested
  }

  /// Returns an observer handle for this aggregator.
  #[must_use]
  pub fn handle(&self) -> CompletionHandle {
    CompletionHandle::new(self.clone())
  }

  fn notify(&self, settlement: Option<Settlement>) {
    let Some(Settlement { state, listeners, wakers }) = settlement else {
      return;
    };
    match &state {
      | CompletionState::Faulted(aggregate) => {
        tracing::warn!(target: "fraktor::dataflow", block = %self.owner, faults = aggregate.len(), "block faulted");
      },
      | _ => {
        tracing::debug!(target: "fraktor::dataflow", block = %self.owner, state = ?state, "block settled");
      },
    }
    for listener in listeners {
      listener(&state);
    }
    for waker in wakers {
      waker.wake();
    }
  }
}
