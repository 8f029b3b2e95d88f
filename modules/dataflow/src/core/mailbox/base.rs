use alloc::{
  boxed::Box,
  collections::VecDeque,
  sync::{Arc, Weak},
  vec::Vec,
};

use portable_atomic::{AtomicBool, Ordering};
use spin::Mutex;

use super::{CapacityRelease, MailboxConfig, MailboxHooks, postponed_offers::PostponedOffers};
use crate::core::{
  block::SourceRef,
  completion::CompletionAggregator,
  dispatch::{DispatchTask, ExecutorShared, ParallelismThrottle, ProcessingStrategy},
  error::{BlockFault, ProtocolError},
  message::{BlockId, MessageHeader, OfferStatus},
};


struct MailboxState<T> {
  queue:                 VecDeque<(u64, T)>,
  // queued items, items being processed, and items promised by an in-flight pull
  item_count:            usize,
  outstanding_transfers: usize,
  next_sequence:         u64,
  postponed:             PostponedOffers<T>,
  declining:             bool,
  drained_signalled:     bool,
}

impl<T> MailboxState<T> {
  fn new() -> Self {
    Self {
      queue:                 VecDeque::new(),
      item_count:            0,
      outstanding_transfers: 0,
      next_sequence:         0,
      postponed:             PostponedOffers::new(),
      declining:             false,
      drained_signalled:     false,
    }
  }

  fn enqueue(&mut self, item: T) {
    let sequence = self.next_sequence;
    self.next_sequence += 1;
    self.queue.push_back((sequence, item));
  }

  fn promise_slot(&mut self) {
    self.item_count += 1;
    self.outstanding_transfers += 1;
  }

  fn fulfil_slot(&mut self, item: T) {
    self.outstanding_transfers -= 1;
    self.enqueue(item);
  }

  fn cancel_slot(&mut self) {
    self.outstanding_transfers -= 1;
    self.item_count -= 1;
  }
}

enum Admission<T> {
  Status(OfferStatus),
  Veto,
  Postpone { kick: bool },
  Pull(SourceRef<T>),
  Enqueued,
}

/// Inbound mailbox of a block.
///
/// Offers run synchronously on the offering thread up to admission; processing always runs on
/// executor workers bounded by a [`ParallelismThrottle`]. No lock is held while calling the
/// executor, a source, the processing strategy, the admission predicate, or the drained hook.
pub struct Mailbox<T> {
  owner:      BlockId,
  config:     MailboxConfig,
  executor:   ExecutorShared,
  aggregator: CompletionAggregator,
  strategy:   Arc<dyn ProcessingStrategy<T>>,
  hooks:      MailboxHooks<T>,
  throttle:   ParallelismThrottle,
  state:      Mutex<MailboxState<T>>,
  draining:   AtomicBool,
  this:       Weak<Self>,
}

impl<T> Mailbox<T>
where
  T: Clone + Send + 'static,
{
  /// Creates a mailbox owned by the block whose completion is tracked by `aggregator`.
  #[must_use]
  pub fn new(
    config: MailboxConfig,
    executor: ExecutorShared,
    aggregator: CompletionAggregator,
    strategy: Arc<dyn ProcessingStrategy<T>>,
    hooks: MailboxHooks<T>,
  ) -> Arc<Self> {
    let throttle = ParallelismThrottle::new(strategy.parallelism());
    Arc::new_cyclic(|this| Self {
      owner: aggregator.owner(),
      config,
      executor,
      aggregator,
      strategy,
      hooks,
      throttle,
      state: Mutex::new(MailboxState::new()),
      draining: AtomicBool::new(false),
      this: this.clone(),
    })
  }

  /// Returns the owning block.
  #[must_use]
  pub const fn owner(&self) -> BlockId {
    self.owner
  }

  /// Handles an offer to the owning block.
  ///
  /// # Errors
  ///
  /// Returns [`ProtocolError::InvalidHeader`] for a header id that is not positive and
  /// [`ProtocolError::MissingSource`] when `consume_to_accept` is set without a source.
  pub fn offer(
    &self,
    header: MessageHeader,
    value: &T,
    source: Option<&SourceRef<T>>,
    consume_to_accept: bool,
  ) -> Result<OfferStatus, ProtocolError> {
    let header = header.validate()?;
    if consume_to_accept && source.is_none() {
      return Err(ProtocolError::MissingSource);
    }
    match self.admit(header, value, source, consume_to_accept) {
      | Admission::Status(status) => Ok(status),
      | Admission::Veto => {
        tracing::debug!(target: "fraktor::dataflow", block = %self.owner, header = header.id(), "admission vetoed");
        self.complete();
        Ok(OfferStatus::DecliningPermanently)
      },
      | Admission::Postpone { kick } => {
        if kick {
          self.dispatch(|mailbox| mailbox.drain_postponed());
        }
        Ok(OfferStatus::Postponed)
      },
      | Admission::Pull(source) => self.pull_offered(header, &source),
      | Admission::Enqueued => {
        self.schedule_worker();
        Ok(OfferStatus::Accepted)
      },
    }
  }

  fn admit(
    &self,
    header: MessageHeader,
    value: &T,
    source: Option<&SourceRef<T>>,
    consume_to_accept: bool,
  ) -> Admission<T> {
    let mut vetted = self.hooks.admission.is_none();
    loop {
      if self.aggregator.termination_requested() {
        return Admission::Status(OfferStatus::DecliningPermanently);
      }
      let mut state = self.state.lock();
      if state.declining {
        return Admission::Status(OfferStatus::DecliningPermanently);
      }
      if let Some(source) = source {
        state.postponed.remove(source.source_id());
      }
      let has_room = self.config.has_room(state.item_count);
      if !self.config.greedy() || !has_room || !state.postponed.is_empty() {
        return match source {
          | Some(source) => {
            state.postponed.push(source.clone(), header);
            Admission::Postpone { kick: has_room }
          },
          | None => Admission::Status(OfferStatus::Declined),
        };
      }
      if !vetted {
        // The predicate runs unlocked; the checks above are repeated once it returns.
        drop(state);
        if let Some(admission) = &self.hooks.admission {
          if !admission(value) {
            return Admission::Veto;
          }
        }
        vetted = true;
        continue;
      }
      if let (true, Some(source)) = (consume_to_accept, source) {
        state.promise_slot();
        return Admission::Pull(source.clone());
      }
      state.item_count += 1;
      state.enqueue(value.clone());
      return Admission::Enqueued;
    }
  }

  fn pull_offered(&self, header: MessageHeader, source: &SourceRef<T>) -> Result<OfferStatus, ProtocolError> {
    let pulled = match source.reserve_message(header, self.owner) {
      | Ok(true) => source.consume_message(header, self.owner),
      | Ok(false) => Ok(None),
      | Err(error) => Err(error),
    };
    match pulled {
      | Ok(Some(item)) => {
        self.state.lock().fulfil_slot(item);
        self.schedule_worker();
        Ok(OfferStatus::Accepted)
      },
      | Ok(None) => {
        self.state.lock().cancel_slot();
        self.check_drained();
        Ok(OfferStatus::NotAvailable)
      },
      | Err(error) => {
        self.state.lock().cancel_slot();
        self.check_drained();
        Err(error)
      },
    }
  }

  /// Stops accepting input; the drained hook runs once everything queued was processed.
  pub fn complete(&self) {
    let newly = {
      let mut state = self.state.lock();
      !core::mem::replace(&mut state.declining, true)
    };
    if newly {
      tracing::trace!(target: "fraktor::dataflow", block = %self.owner, "mailbox closed to new input");
    }
    self.check_drained();
  }

  /// Faults the owning block, dropping queued items and releasing postponed offers.
  pub fn fault(&self, fault: BlockFault) {
    self.shut_input();
    let disposition = fault.disposition();
    self.aggregator.report_fault(fault, disposition);
    self.check_drained();
  }

  /// Cancels the owning block, dropping queued items and releasing postponed offers.
  pub fn cancel(&self) {
    self.shut_input();
    self.aggregator.request_cancel();
    self.check_drained();
  }

  /// Gives back capacity held by `count` items and pulls postponed offers if room opened.
  pub fn release_capacity(&self, count: usize) {
    if count == 0 {
      return;
    }
    {
      let mut state = self.state.lock();
      state.item_count = state.item_count.saturating_sub(count);
    }
    self.drain_postponed();
  }

  /// Returns the number of items counted against the capacity.
  #[must_use]
  pub fn item_count(&self) -> usize {
    self.state.lock().item_count
  }

  /// Returns the number of queued items not yet handed to a worker.
  #[must_use]
  pub fn queued(&self) -> usize {
    self.state.lock().queue.len()
  }

  /// Returns the number of postponed offers.
  #[must_use]
  pub fn postponed_count(&self) -> usize {
    self.state.lock().postponed.len()
  }

  /// Returns `true` once the mailbox stopped accepting input.
  #[must_use]
  pub fn is_declining(&self) -> bool {
    self.state.lock().declining
  }

  /// Returns the worker throttle.
  #[must_use]
  pub const fn throttle(&self) -> &ParallelismThrottle {
    &self.throttle
  }

  fn shut_input(&self) {
    let released = {
      let mut state = self.state.lock();
      state.declining = true;
      let dropped = state.queue.len();
      state.queue.clear();
      state.item_count = state.item_count.saturating_sub(dropped);
      state.postponed.take_all()
    };
    self.release_postponed(released);
  }

  fn schedule_worker(&self) {
    if self.state.lock().queue.is_empty() || !self.throttle.try_schedule() {
      return;
    }
    let Some(this) = self.this.upgrade() else {
      if self.throttle.schedule_failed() {
        self.check_drained();
      }
      return;
    };
    let task: DispatchTask = Box::new(move || this.run_worker());
    if let Err(error) = self.executor.execute(task) {
      tracing::warn!(target: "fraktor::dataflow", block = %self.owner, %error, "worker rejected by executor");
      // fault() checks for draining itself.
      let _ = self.throttle.schedule_failed();
      self.fault(BlockFault::Dispatch(error));
    }
  }

  fn run_worker(&self) {
    self.throttle.worker_started();
    self.aggregator.enter_unsafe();
    self.schedule_worker();
    let budget = self.config.task_budget();
    let mut processed = 0;
    while processed < budget {
      let Some((sequence, item)) = self.state.lock().queue.pop_front() else {
        break;
      };
      processed += 1;
      match self.strategy.process_one(sequence, item) {
        | Ok(()) => self.item_processed(),
        | Err(fault) => {
          tracing::debug!(target: "fraktor::dataflow", block = %self.owner, %fault, "processing failed");
          self.fault(fault);
          self.item_processed();
          break;
        },
      }
    }
    self.aggregator.leave_unsafe();
    let idle = self.throttle.worker_finished();
    self.schedule_worker();
    // Only the worker that leaves the throttle idle can observe the mailbox drained.
    if idle {
      self.check_drained();
    }
  }

  fn item_processed(&self) {
    if self.config.capacity_release() == CapacityRelease::OnProcessed {
      self.release_capacity(1);
    }
  }

  fn drain_postponed(&self) {
    loop {
      if self.draining.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).is_err() {
        return;
      }
      self.aggregator.enter_unsafe();
      while let Some((source, header)) = self.next_postponed() {
        match source.consume_message(header, self.owner) {
          | Ok(Some(item)) => {
            self.state.lock().fulfil_slot(item);
            self.schedule_worker();
          },
          | Ok(None) => self.state.lock().cancel_slot(),
          | Err(error) => {
            tracing::warn!(target: "fraktor::dataflow", block = %self.owner, %error, "postponed pull rejected");
            self.state.lock().cancel_slot();
          },
        }
      }
      self.aggregator.leave_unsafe();
      self.draining.store(false, Ordering::Release);
      if !self.drain_wanted() {
        break;
      }
    }
    self.check_drained();
  }

  fn next_postponed(&self) -> Option<(SourceRef<T>, MessageHeader)> {
    let mut state = self.state.lock();
    if state.declining || !self.config.has_room(state.item_count) {
      return None;
    }
    let entry = state.postponed.pop_front()?;
    state.promise_slot();
    Some(entry)
  }

  fn drain_wanted(&self) -> bool {
    let state = self.state.lock();
    !state.declining && !state.postponed.is_empty() && self.config.has_room(state.item_count)
  }

  fn check_drained(&self) {
    let released = {
      let mut state = self.state.lock();
      if !state.declining
        || state.drained_signalled
        || !state.queue.is_empty()
        || state.outstanding_transfers > 0
        || !self.throttle.is_idle()
      {
        return;
      }
      state.drained_signalled = true;
      state.postponed.take_all()
    };
    self.release_postponed(released);
    tracing::trace!(target: "fraktor::dataflow", block = %self.owner, "mailbox drained");
    if let Some(hook) = &self.hooks.on_drained {
      hook();
    }
  }

  fn release_postponed(&self, entries: Vec<(SourceRef<T>, MessageHeader)>) {
    for (source, header) in entries {
      tracing::trace!(
        target: "fraktor::dataflow",
        block = %self.owner,
        source = %source.source_id(),
        header = header.id(),
        "releasing postponed offer"
      );
      if let Ok(true) = source.reserve_message(header, self.owner) {
        if let Err(error) = source.release_reservation(header, self.owner) {
          tracing::warn!(target: "fraktor::dataflow", block = %self.owner, %error, "postponed release rejected");
        }
      }
    }
  }

  fn dispatch(&self, task: fn(&Self)) {
    let Some(this) = self.this.upgrade() else {
      return;
    };
    if let Err(error) = self.executor.execute(Box::new(move || task(&this))) {
      tracing::warn!(target: "fraktor::dataflow", block = %self.owner, %error, "mailbox task rejected by executor");
      self.fault(BlockFault::Dispatch(error));
    }
  }
}
