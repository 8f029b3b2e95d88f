use alloc::{
  sync::{Arc, Weak},
  vec::Vec,
};
use core::{marker::PhantomData, num::NonZeroUsize};

use spin::Mutex;

use super::{ReorderBuffer, cancellation::wire_cancellation};
use crate::core::{
  block::{BlockOptions, DataflowBlock, LinkHandle, LinkOptions, MessageSource, SourceBlock, SourceRef, TargetBlock, TargetRef},
  completion::{CompletionAggregator, CompletionHandle},
  dispatch::ProcessingStrategy,
  distribution::{SourceCore, SourceCoreConfig},
  error::{BlockFault, ProtocolError},
  mailbox::{CapacityRelease, Mailbox, MailboxHooks},
  message::{BlockId, HeaderSequence, MessageHeader, OfferStatus},
};


struct TransformStrategy<I, O, F> {
  transform:   F,
  parallelism: NonZeroUsize,
  reorder:     Mutex<ReorderBuffer<O>>,
  output:      Weak<SourceCore<O>>,
  _marker:     PhantomData<fn(I)>,
}

impl<I, O, F> ProcessingStrategy<I> for TransformStrategy<I, O, F>
where
  O: Clone + Send + 'static,
  F: Fn(I) -> Result<O, BlockFault> + Send + Sync,
{
  fn process_one(&self, sequence: u64, item: I) -> Result<(), BlockFault> {
    let result = (self.transform)(item);
    let Some(output) = self.output.upgrade() else {
      return result.map(drop);
    };
    let stored = {
      let mut reorder = self.reorder.lock();
      match result {
        | Ok(value) => {
          let ready = reorder.push(sequence, value);
          // stored under the reorder lock so concurrent workers cannot interleave releases
          !ready.is_empty() && output.store_all(ready)
        },
        | Err(fault) => {
          reorder.skip(sequence);
          return Err(fault);
        },
      }
    };
    if stored {
      output.flush();
    }
    Ok(())
  }

  fn parallelism(&self) -> NonZeroUsize {
    self.parallelism
  }
}

/// Block applying a user function to every value and emitting the results in input order,
/// even when several workers run the function concurrently.
pub struct TransformBlock<I, O> {
  id:           BlockId,
  aggregator:   CompletionAggregator,
  mailbox:      Arc<Mailbox<I>>,
  output:       Arc<SourceCore<O>>,
  post_headers: HeaderSequence,
}

impl<I, O> TransformBlock<I, O>
where
  I: Clone + Send + 'static,
  O: Clone + Send + 'static,
{
  /// Creates a block applying `transform` on up to `max_degree_of_parallelism` workers.
  #[must_use]
  pub fn new<F>(transform: F, options: BlockOptions) -> Arc<Self>
  where
    F: Fn(I) -> Result<O, BlockFault> + Send + Sync + 'static, {
    let id = BlockId::allocate();
    let aggregator = CompletionAggregator::new(id);
    let block = Arc::new_cyclic(|this: &Weak<Self>| {
      let source: Weak<dyn MessageSource<O>> = this.clone();
      let released = this.clone();
      let config = SourceCoreConfig::new().with_on_items_removed(Arc::new(move |count| {
        if let Some(block) = released.upgrade() {
          block.mailbox.release_capacity(count);
        }
      }));
      let output = SourceCore::new(source, config, options.executor().clone(), aggregator.clone());
      let strategy: Arc<dyn ProcessingStrategy<I>> = Arc::new(TransformStrategy {
        transform,
        parallelism: options.max_degree_of_parallelism(),
        reorder: Mutex::new(ReorderBuffer::new()),
        output: Arc::downgrade(&output),
        _marker: PhantomData,
      });
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
  pub fn post(&self, value: I) -> bool {
    matches!(self.mailbox.offer(self.post_headers.next_header(), &value, None, false), Ok(OfferStatus::Accepted))
  }

  /// Takes every produced value without linking.
  pub fn try_receive_all(&self) -> Vec<O> {
    self.output.try_receive_all()
  }
}

impl<I, O> DataflowBlock for TransformBlock<I, O>
where
  I: Clone + Send + 'static,
  O: Clone + Send + 'static,
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

impl<I, O> TargetBlock<I> for TransformBlock<I, O>
where
  I: Clone + Send + 'static,
  O: Clone + Send + 'static,
{
  fn offer(
    &self,
    header: MessageHeader,
    value: &I,
    source: Option<&SourceRef<I>>,
    consume_to_accept: bool,
  ) -> Result<OfferStatus, ProtocolError> {
    self.mailbox.offer(header, value, source, consume_to_accept)
  }
}

impl<I, O> MessageSource<O> for TransformBlock<I, O>
where
  I: Clone + Send + 'static,
  O: Clone + Send + 'static,
{
  fn source_id(&self) -> BlockId {
    self.id
  }

  fn consume_message(&self, header: MessageHeader, target: BlockId) -> Result<Option<O>, ProtocolError> {
    self.output.consume_message(header, target)
  }

  fn reserve_message(&self, header: MessageHeader, target: BlockId) -> Result<bool, ProtocolError> {
    self.output.reserve_message(header, target)
  }

  fn release_reservation(&self, header: MessageHeader, target: BlockId) -> Result<(), ProtocolError> {
    self.output.release_reservation(header, target)
  }
}

impl<I, O> SourceBlock<O> for TransformBlock<I, O>
where
  I: Clone + Send + 'static,
  O: Clone + Send + 'static,
{
  fn link_to(&self, target: TargetRef<O>, options: LinkOptions) -> Result<LinkHandle, ProtocolError> {
    self.output.link_to(target, options)
  }

  fn try_receive(&self) -> Option<O> {
    self.output.try_receive()
  }

  fn output_count(&self) -> usize {
    self.output.output_count()
  }
}
