use alloc::sync::Arc;

use super::cancellation::wire_cancellation;
use crate::core::{
  block::{BlockOptions, DataflowBlock, SourceRef, TargetBlock},
  completion::{CompletionAggregator, CompletionHandle},
  dispatch::{ActionStrategy, ProcessingStrategy},
  error::{BlockFault, ProtocolError},
  mailbox::{CapacityRelease, Mailbox, MailboxHooks},
  message::{BlockId, HeaderSequence, MessageHeader, OfferStatus},
};


/// Target block running a user action for every accepted value.
///
/// The block completes once it was completed and every accepted value was processed. The first
/// failing action faults it.
pub struct ActionBlock<T> {
  id:           BlockId,
  aggregator:   CompletionAggregator,
  mailbox:      Arc<Mailbox<T>>,
  post_headers: HeaderSequence,
}

impl<T> ActionBlock<T>
where
  T: Clone + Send + 'static,
{
  /// Creates a block running `action` on up to `max_degree_of_parallelism` workers.
  #[must_use]
  pub fn new<F>(action: F, options: BlockOptions) -> Arc<Self>
  where
    F: Fn(T) -> Result<(), BlockFault> + Send + Sync + 'static, {
    let strategy: ActionStrategy<T, F> = ActionStrategy::new(action).with_parallelism(options.max_degree_of_parallelism());
    Self::with_strategy(Arc::new(strategy), options)
  }

  /// Creates a block driven by a custom processing strategy.
  #[must_use]
  pub fn with_strategy(strategy: Arc<dyn ProcessingStrategy<T>>, options: BlockOptions) -> Arc<Self> {
    let id = BlockId::allocate();
    let aggregator = CompletionAggregator::new(id);
    let settle = aggregator.clone();
    let hooks = MailboxHooks::new().with_on_drained(Arc::new(move || {
      settle.try_complete();
    }));
    let mailbox = Mailbox::new(
      options.mailbox_config(CapacityRelease::OnProcessed),
      options.executor().clone(),
      aggregator.clone(),
      strategy,
      hooks,
    );
    let block = Arc::new(Self { id, aggregator, mailbox, post_headers: HeaderSequence::new() });
    wire_cancellation(&options, &block.mailbox);
    block
  }

  /// Offers `value` without a source; returns `true` when it was accepted.
  pub fn post(&self, value: T) -> bool {
    matches!(self.mailbox.offer(self.post_headers.next_header(), &value, None, false), Ok(OfferStatus::Accepted))
  }

  /// Returns the number of accepted values not yet processed.
  #[must_use]
  pub fn input_count(&self) -> usize {
    self.mailbox.item_count()
  }
}

impl<T> DataflowBlock for ActionBlock<T>
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

impl<T> TargetBlock<T> for ActionBlock<T>
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
