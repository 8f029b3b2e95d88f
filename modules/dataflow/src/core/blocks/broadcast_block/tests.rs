use alloc::{sync::Arc, vec};

use super::BroadcastBlock;
use crate::core::{
  block::{BlockOptions, DataflowBlock, LinkOptions, SourceBlock, TargetRef},
  completion::CompletionState,
  dispatch::InlineExecutor,
  testing::RecordingTarget,
};

fn link(block: &BroadcastBlock<u32>, target: &Arc<RecordingTarget<u32>>) {
  let target: TargetRef<u32> = target.clone();
  block.link_to(target, LinkOptions::new().with_propagate_completion(true)).expect("link").detach();
}

#[test]
fn every_target_receives_every_value() {
  let block = BroadcastBlock::new(BlockOptions::new(InlineExecutor::shared()));
  let first = RecordingTarget::accepting("first");
  let second = RecordingTarget::accepting("second");
  link(&block, &first);
  link(&block, &second);

  assert!(block.post(1));
  assert!(block.post(2));
  block.complete();
  assert_eq!(first.received(), vec![1, 2]);
  assert_eq!(second.received(), vec![1, 2]);
  assert_eq!(block.completion().state(), CompletionState::Completed);
  assert!(first.is_completed() && second.is_completed());
}

#[test]
fn copy_function_produces_each_targets_value() {
  let block = BroadcastBlock::with_copy(Arc::new(|value: &u32| value + 1), BlockOptions::new(InlineExecutor::shared()));
  let first = RecordingTarget::accepting("first");
  let second = RecordingTarget::accepting("second");
  link(&block, &first);
  link(&block, &second);

  assert!(block.post(10));
  assert_eq!(first.received(), vec![11]);
  assert_eq!(second.received(), vec![11]);
  assert_eq!(block.output_count(), 0);
}

#[test]
fn head_stays_readable_without_targets() {
  let block = BroadcastBlock::new(BlockOptions::new(InlineExecutor::shared()));
  assert!(block.post(3));
  assert_eq!(block.try_receive(), Some(3));
  assert_eq!(block.try_receive(), Some(3));
  assert_eq!(block.output_count(), 1);
}
