use alloc::sync::{Arc, Weak};

use super::cancellation::wire_cancellation;
use crate::core::{
  block::{BlockOptions, DataflowBlock, LinkHandle, LinkOptions, MessageSource, SourceBlock, SourceRef, TargetBlock, TargetRef},
  completion::{CompletionAggregator, CompletionHandle},
  dispatch::{ProcessingStrategy, SerialStrategy},
  distribution::{CopyFn, DistributionMode, SourceCore, SourceCoreConfig},
  error::{BlockFault, ProtocolError},
  mailbox::{CapacityRelease, Mailbox, MailboxHooks},
  message::{BlockId, HeaderSequence, MessageHeader, OfferStatus},
};

#[cfg(test)]
mod tests;

/// Block handing every value to each linked target.
///
/// A value stays at the head until every linked target took its copy or declined it.
pub struct BroadcastBlock<T> {
  id:           BlockId,
  aggregator:   CompletionAggregator,
  mailbox:      Arc<Mailbox<T>>,
  output:       Arc<SourceCore<T>>,
  post_headers: HeaderSequence,
}

impl<T> BroadcastBlock<T>
where
  T: Clone + Send + 'static,
{
  /// Creates a broadcast block that clones values for each target.
  #[must_use]
  pub fn new(options: BlockOptions) -> Arc<Self> {
    Self::build(None, options)
  }

  /// Creates a broadcast block producing each target's copy with `copy`.
  #[must_use]
  pub fn with_copy(copy: CopyFn<T>, options: BlockOptions) -> Arc<Self> {
    Self::build(Some(copy), options)
  }

  fn build(copy: Option<CopyFn<T>>, options: BlockOptions) -> Arc<Self> {
    let id = BlockId::allocate();
    let aggregator = CompletionAggregator::new(id);
    let block = Arc::new_cyclic(|this: &Weak<Self>| {
      let source: Weak<dyn MessageSource<T>> = this.clone();
      let released = this.clone();
      let config = SourceCoreConfig::new().with_mode(DistributionMode::Broadcast { copy }).with_on_items_removed(Arc::new(
        move |count| {
          if let Some(block) = released.upgrade() {
            block.mailbox.release_capacity(count);
          }
        },
      ));
      let output = SourceCore::new(source, config, options.executor().clone(), aggregator.clone());
      let forward = Arc::downgrade(&output);
      let strategy: Arc<dyn ProcessingStrategy<T>> = Arc::new(SerialStrategy::new(move |item: T| {
        if let Some(output) = forward.upgrade() {
          output.post(item);
        }
      }));
      let drained = Arc::downgrade(&output);
      let hooks = MailboxHooks::new().with_on_drained(Arc::new(move || {
        if let Some(output) = drained.upgrade() {
          output.complete();
        }
      }));
      let mailbox = Mailbox::new(
        options.mailbox_config(CapacityRelease::Manual),
        options.executor().clone(),
        aggregator.clone(),
        strategy,
        hooks,
      );
      Self { id, aggregator, mailbox, output, post_headers: HeaderSequence::new() }
    });
    wire_cancellation(&options, &block.mailbox);
    block
  }

  /// Offers `value` without a source; returns `true` when it was accepted.
  pub fn post(&self, value: T) -> bool {
    matches!(self.mailbox.offer(self.post_headers.next_header(), &value, None, false), Ok(OfferStatus::Accepted))
  }
}

impl<T> DataflowBlock for BroadcastBlock<T>
where
  T: Clone + Send + 'static,
{
  fn block_id(&self) -> BlockId {
    self.id
  }

  fn complete(&self) {
    self.mailbox.complete();
  }

  fn fault(&self, fault: BlockFault) {
    self.mailbox.fault(fault);
  }

  fn completion(&self) -> CompletionHandle {
    self.aggregator.handle()
  }
}

impl<T> TargetBlock<T> for BroadcastBlock<T>
where
  T: Clone + Send + 'static,
{
  fn offer(
    &self,
    header: MessageHeader,
    value: &T,
    source: Option<&SourceRef<T>>,
    consume_to_accept: bool,
  ) -> Result<OfferStatus, ProtocolError> {
    self.mailbox.offer(header, value, source, consume_to_accept)
  }
}

impl<T> MessageSource<T> for BroadcastBlock<T>
where
  T: Clone + Send + 'static,
{
  fn source_id(&self) -> BlockId {
    self.id
  }

  fn consume_message(&self, header: MessageHeader, target: BlockId) -> Result<Option<T>, ProtocolError> {
    self.output.consume_message(header, target)
  }

  fn reserve_message(&self, header: MessageHeader, target: BlockId) -> Result<bool, ProtocolError> {
    self.output.reserve_message(header, target)
  }

  fn release_reservation(&self, header: MessageHeader, target: BlockId) -> Result<(), ProtocolError> {
    self.output.release_reservation(header, target)
  }
}

impl<T> SourceBlock<T> for BroadcastBlock<T>
where
  T: Clone + Send + 'static,
{
  fn link_to(&self, target: TargetRef<T>, options: LinkOptions) -> Result<LinkHandle, ProtocolError> {
    self.output.link_to(target, options)
  }

  fn try_receive(&self) -> Option<T> {
    self.output.try_receive()
  }

  fn output_count(&self) -> usize {
    self.output.output_count()
  }
}
