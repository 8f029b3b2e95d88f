use alloc::{boxed::Box, sync::Arc, vec, vec::Vec};

use spin::Mutex;

use super::InlineExecutor;
use crate::core::dispatch::DispatchExecutor;

#[test]
fn runs_task_on_caller() {
  let executor = InlineExecutor::new();
  let log = Arc::new(Mutex::new(Vec::new()));
  let sink = log.clone();
  executor.execute(Box::new(move || sink.lock().push(1))).unwrap();
  assert_eq!(*log.lock(), vec![1]);
  assert_eq!(executor.pending(), 0);
}

#[test]
fn reentrant_submissions_run_after_current_task() {
  let executor = Arc::new(InlineExecutor::new());
  let log = Arc::new(Mutex::new(Vec::new()));
  let outer_log = log.clone();
  let inner_executor = executor.clone();
  executor
    .execute(Box::new(move || {
      let inner_log = outer_log.clone();
      inner_executor.execute(Box::new(move || inner_log.lock().push("inner"))).unwrap();
      outer_log.lock().push("outer");
    }))
    .unwrap();
  assert_eq!(*log.lock(), vec!["outer", "inner"]);
}
