use alloc::sync::Arc;

use portable_atomic::{AtomicUsize, Ordering};

use super::CancellationSignal;

#[test]
fn cancel_runs_callbacks_once() {
  let signal = CancellationSignal::new();
  let calls = Arc::new(AtomicUsize::new(0));
  let counter = calls.clone();
  signal.on_cancel(move || {
    counter.fetch_add(1, Ordering::SeqCst);
  });
  assert!(signal.cancel());
  assert!(!signal.cancel());
  assert!(signal.is_cancelled());
  assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn late_registration_runs_immediately() {
  let signal = CancellationSignal::new();
  signal.cancel();
  let calls = Arc::new(AtomicUsize::new(0));
  let counter = calls.clone();
  signal.on_cancel(move || {
    counter.fetch_add(1, Ordering::SeqCst);
  });
  assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn clones_share_state() {
  let signal = CancellationSignal::new();
  let clone = signal.clone();
  clone.cancel();
  assert!(signal.is_cancelled());
}
