use core::num::NonZeroUsize;

use super::BlockOptions;
use crate::core::{
  completion::CancellationSignal,
  dispatch::InlineExecutor,
  mailbox::CapacityRelease,
};

fn nz(value: usize) -> NonZeroUsize {
  NonZeroUsize::new(value).unwrap()
}

#[test]
fn defaults_are_unbounded_greedy_and_serial() {
  let options = BlockOptions::new(InlineExecutor::shared());
  assert_eq!(options.bounded_capacity(), None);
  assert!(options.greedy());
  assert_eq!(options.max_degree_of_parallelism().get(), 1);
  assert_eq!(options.max_messages_per_task(), None);
  assert!(options.cancellation().is_none());
}

#[test]
fn mailbox_config_mirrors_options() {
  let options = BlockOptions::new(InlineExecutor::shared())
    .with_bounded_capacity(nz(2))
    .with_greedy(false)
    .with_max_messages_per_task(nz(8))
    .with_max_degree_of_parallelism(nz(3))
    .with_cancellation(CancellationSignal::new());
  let config = options.mailbox_config(CapacityRelease::Manual);
  assert_eq!(config.bounded_capacity(), Some(nz(2)));
  assert!(!config.greedy());
  assert_eq!(config.max_messages_per_task(), Some(nz(8)));
  assert_eq!(config.capacity_release(), CapacityRelease::Manual);
  assert_eq!(options.max_degree_of_parallelism().get(), 3);
  assert!(options.cancellation().is_some());
}
