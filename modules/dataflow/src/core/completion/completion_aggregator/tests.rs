use alloc::{sync::Arc, vec, vec::Vec};

use spin::Mutex;

use super::CompletionAggregator;
use crate::core::{
  completion::{CompletionState, FaultDisposition},
  error::{AggregateFault, BlockFault},
  message::BlockId,
};

fn aggregator() -> CompletionAggregator {
  CompletionAggregator::new(BlockId::allocate())
}

fn ignorable(name: &str) -> BlockFault {
  BlockFault::Upstream(AggregateFault::new(vec![BlockFault::callback(name)]))
}

#[test]
fn fault_settles_immediately_when_safe() {
  let aggregator = aggregator();
  let fault = BlockFault::callback("boom");
  assert!(aggregator.report_fault(fault.clone(), FaultDisposition::Retain));
  assert_eq!(aggregator.state(), CompletionState::Faulted(AggregateFault::new(vec![fault])));
}

#[test]
fn first_ignorable_fault_is_kept_before_a_retained_one() {
  let aggregator = aggregator();
  let first = ignorable("f1");
  let second = BlockFault::callback("f2");
  aggregator.enter_unsafe();
  assert!(aggregator.report_fault(first.clone(), FaultDisposition::IgnorableIfSuperseded));
  assert!(aggregator.report_fault(second.clone(), FaultDisposition::Retain));
  assert!(!aggregator.is_settled());
  aggregator.leave_unsafe();
  assert_eq!(aggregator.state(), CompletionState::Faulted(AggregateFault::new(vec![first, second])));
}

#[test]
fn later_ignorable_faults_are_dropped() {
  let aggregator = aggregator();
  let first = ignorable("f1");
  let second = ignorable("f2");
  let third = BlockFault::callback("f3");
  aggregator.enter_unsafe();
  aggregator.report_fault(first.clone(), FaultDisposition::IgnorableIfSuperseded);
  assert!(!aggregator.report_fault(second, FaultDisposition::IgnorableIfSuperseded));
  aggregator.report_fault(third.clone(), FaultDisposition::Retain);
  aggregator.leave_unsafe();
  assert_eq!(aggregator.state(), CompletionState::Faulted(AggregateFault::new(vec![first, third])));
}

#[test]
fn fault_wins_over_cancellation_and_completion() {
  let aggregator = aggregator();
  aggregator.enter_unsafe();
  aggregator.try_complete();
  aggregator.request_cancel();
  aggregator.report_fault(BlockFault::callback("x"), FaultDisposition::Retain);
  aggregator.leave_unsafe();
  assert!(aggregator.state().is_faulted());
}

#[test]
fn cancellation_wins_over_completion() {
  let aggregator = aggregator();
  aggregator.enter_unsafe();
  aggregator.try_complete();
  aggregator.request_cancel();
  assert!(aggregator.termination_requested());
  aggregator.leave_unsafe();
  assert_eq!(aggregator.state(), CompletionState::Cancelled);
}

#[test]
fn settled_state_never_changes() {
  let aggregator = aggregator();
  assert!(aggregator.try_complete());
  assert_eq!(aggregator.state(), CompletionState::Completed);
  assert!(!aggregator.try_complete());
  aggregator.request_cancel();
  assert!(!aggregator.report_fault(BlockFault::callback("late"), FaultDisposition::Retain));
  assert_eq!(aggregator.state(), CompletionState::Completed);
}

#[test]
fn nested_unsafe_windows_defer_until_outermost_closes() {
  let aggregator = aggregator();
  aggregator.enter_unsafe();
  aggregator.enter_unsafe();
  aggregator.request_cancel();
  aggregator.leave_unsafe();
  assert!(!aggregator.is_settled());
  aggregator.leave_unsafe();
  assert_eq!(aggregator.state(), CompletionState::Cancelled);
}

#[test]
fn listeners_run_once_and_late_listeners_run_immediately() {
  let aggregator = aggregator();
  let seen: Arc<Mutex<Vec<CompletionState>>> = Arc::new(Mutex::new(Vec::new()));
  let early = seen.clone();
  aggregator.on_settled(move |state| early.lock().push(state.clone()));
  aggregator.try_complete();
  let late = seen.clone();
  aggregator.on_settled(move |state| late.lock().push(state.clone()));
  assert_eq!(*seen.lock(), vec![CompletionState::Completed, CompletionState::Completed]);
}

#[test]
fn listener_may_reenter_the_aggregator() {
  let aggregator = aggregator();
  let reentrant = aggregator.clone();
  let observed = Arc::new(Mutex::new(None));
  let sink = observed.clone();
  aggregator.on_settled(move |_| {
    *sink.lock() = Some(reentrant.state());
  });
  aggregator.request_cancel();
  assert_eq!(*observed.lock(), Some(CompletionState::Cancelled));
}

#[test]
fn termination_is_not_requested_by_pending_completion() {
  let aggregator = aggregator();
  aggregator.enter_unsafe();
  aggregator.try_complete();
  assert!(!aggregator.termination_requested());
  aggregator.leave_unsafe();
  assert!(aggregator.termination_requested());
}
