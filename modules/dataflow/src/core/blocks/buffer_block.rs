use alloc::{
  sync::{Arc, Weak},
  vec::Vec,
};

use super::cancellation::wire_cancellation;
use crate::core::{
  block::{
    BlockOptions, DataflowBlock, LinkHandle, LinkOptions, MessageSource, SourceBlock, SourceRef, TargetBlock, TargetRef,
  },
  completion::{CompletionAggregator, CompletionHandle},
  dispatch::{ProcessingStrategy, SerialStrategy},
  distribution::{SourceCore, SourceCoreConfig},
  error::{BlockFault, ProtocolError},
  mailbox::{CapacityRelease, Mailbox, MailboxHooks},
  message::{BlockId, HeaderSequence, MessageHeader, OfferStatus},
};


/// FIFO block that stores values until a linked target or a receiver takes them.
///
/// Bounded capacity covers values in the block's input and output alike; a slot frees up once
/// the value left the block.
pub struct BufferBlock<T> {
  id:           BlockId,
  aggregator:   CompletionAggregator,
  mailbox:      Arc<Mailbox<T>>,
  output:       Arc<SourceCore<T>>,
  post_headers: HeaderSequence,
}

impl<T> BufferBlock<T>
where
  T: Clone + Send + 'static,
{
  /// Creates a buffer block.
  #[must_use]
  pub fn new(options: BlockOptions) -> Arc<Self> {
    let id = BlockId::allocate();
    let aggregator = CompletionAggregator::new(id);
    let block = Arc::new_cyclic(|this: &Weak<Self>| {
      let source: Weak<dyn MessageSource<T>> = this.clone();
      let released = this.clone();
      let config = SourceCoreConfig::new().with_on_items_removed(Arc::new(move |count| {
        if let Some(block) = released.upgrade() {
          block.mailbox.release_capacity(count);
        }
      }));
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

  /// Takes every stored value without linking.
  pub fn try_receive_all(&self) -> Vec<T> {
    self.output.try_receive_all()
  }

  /// Returns the number of values counted against the bounded capacity.
  #[must_use]
  pub fn input_count(&self) -> usize {
    self.mailbox.item_count()
  }

  /// Returns the number of postponed offers waiting to be pulled.
  #[must_use]
  pub fn postponed_count(&self) -> usize {
    self.mailbox.postponed_count()
  }
}

impl<T> DataflowBlock for BufferBlock<T>
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

impl<T> TargetBlock<T> for BufferBlock<T>
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

impl<T> MessageSource<T> for BufferBlock<T>
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

impl<T> SourceBlock<T> for BufferBlock<T>
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
