use alloc::{
  boxed::Box,
  sync::{Arc, Weak},
  vec::Vec,
};
use core::num::NonZeroUsize;

use portable_atomic::{AtomicBool, Ordering};
use spin::Mutex;

use super::{DistributionMode, SourceCoreConfig, TargetRegistration, outgoing_state::OutgoingState};
use crate::core::{
  block::{LinkHandle, LinkOptions, LinkRegistry, MessageSource, TargetRef},
  completion::{CompletionAggregator, CompletionState, FaultDisposition},
  dispatch::ExecutorShared,
  error::{BlockFault, ProtocolError},
  message::{BlockId, MessageHeader, OfferStatus},
};


struct OfferPlan<T> {
  target:            TargetRef<T>,
  target_id:         BlockId,
  header:            MessageHeader,
  value:             T,
  consume_to_accept: bool,
}

enum Step<T> {
  Offer(OfferPlan<T>),
  Progress,
  Idle,
}

/// Outgoing store and distribution engine of a source block.
///
/// Only the head value is visible to targets. Offer rounds run on the executor, one at a time,
/// visiting the retry queue first, then the targets linked when the head became current, then
/// targets linked while the round was running. At most one target holds a reservation on the
/// head; while it is held, or while the head is being offered to a target, no other target can
/// reserve or consume it.
pub struct SourceCore<T> {
  owner:      BlockId,
  source:     Weak<dyn MessageSource<T>>,
  config:     SourceCoreConfig<T>,
  executor:   ExecutorShared,
  aggregator: CompletionAggregator,
  state:      Mutex<OutgoingState<T>>,
  offering:   AtomicBool,
  rerun:      AtomicBool,
  this:       Weak<Self>,
}

impl<T> SourceCore<T>
where
  T: Clone + Send + 'static,
{
  /// Creates the store for the block `source`, whose completion `aggregator` tracks.
  ///
  /// Settlement of the aggregator terminates the store and is forwarded to targets linked with
  /// completion propagation.
  #[must_use]
  pub fn new(
    source: Weak<dyn MessageSource<T>>,
    config: SourceCoreConfig<T>,
    executor: ExecutorShared,
    aggregator: CompletionAggregator,
  ) -> Arc<Self> {
    let core = Arc::new_cyclic(|this: &Weak<Self>| Self {
      owner: aggregator.owner(),
      source,
      config,
      executor,
      aggregator: aggregator.clone(),
      state: Mutex::new(OutgoingState::new()),
      offering: AtomicBool::new(false),
      rerun: AtomicBool::new(false),
      this: this.clone(),
    });
    let weak = Arc::downgrade(&core);
    aggregator.on_settled(move |state| {
      if let Some(core) = weak.upgrade() {
        core.terminate(state);
      }
    });
    core
  }

  /// Returns the owning block.
  #[must_use]
  pub const fn owner(&self) -> BlockId {
    self.owner
  }

  /// Adds a produced value; returns `false` when the store already terminated.
  pub fn post(&self, item: T) -> bool {
    self.post_all(core::iter::once(item))
  }

  /// Adds several produced values in order; returns `false` when the store already terminated.
  pub fn post_all(&self, items: impl IntoIterator<Item = T>) -> bool {
    let stored = self.store_all(items);
    if stored {
      self.schedule_round();
    }
    stored
  }

  /// Stores values without starting an offer round; callers follow up with [`SourceCore::flush`].
  pub(crate) fn store_all(&self, items: impl IntoIterator<Item = T>) -> bool {
    let mut state = self.state.lock();
    if state.terminated {
      return false;
    }
    for item in items {
      let header = state.allocate_header();
      state.weight += self.config.weight_of(&item);
      state.messages.push_back((header, item));
    }
    true
  }

  /// Starts an offer round for values stored with `store_all`.
  pub(crate) fn flush(&self) {
    self.schedule_round();
  }

  /// Links `target`.
  ///
  /// Linking to a terminated store forwards the final state right away when requested and
  /// returns an inert handle.
  ///
  /// # Errors
  ///
  /// Returns [`ProtocolError::SelfLink`] when `target` is the owning block.
  pub fn link_to(&self, target: TargetRef<T>, options: LinkOptions) -> Result<LinkHandle, ProtocolError> {
    if target.block_id() == self.owner {
      return Err(ProtocolError::SelfLink);
    }
    let link_id = {
      let mut state = self.state.lock();
      if state.terminated {
        None
      } else {
        let link_id = state.next_link_id;
        state.next_link_id += 1;
        let staged = state.head_is_current();
        let remaining = options.max_messages().map(NonZeroUsize::get);
        let registration = TargetRegistration::new(link_id, target.clone(), remaining, options.propagate_completion());
        state.registry.add(registration, options.position(), staged);
        Some(link_id)
      }
    };
    let Some(link_id) = link_id else {
      if options.propagate_completion() {
        self.propagate(Vec::from([target]), self.aggregator.state());
      }
      return Ok(LinkHandle::inert());
    };
    tracing::debug!(
      target: "fraktor::dataflow",
      block = %self.owner,
      target_block = %target.block_id(),
      link_id,
      position = ?options.position(),
      "target linked"
    );
    self.schedule_round();
    let registry: Weak<dyn LinkRegistry> = self.this.clone();
    Ok(LinkHandle::new(link_id, registry))
  }

  /// Requests completion once every stored value left the store.
  pub fn complete(&self) {
    self.state.lock().completion_requested = true;
    self.complete_if_possible();
  }

  /// Takes the head value without linking.
  ///
  /// Exclusive stores remove the head; broadcast stores return a copy. Returns `None` while the
  /// head is reserved or being offered.
  pub fn try_receive(&self) -> Option<T> {
    let item = {
      let mut state = self.state.lock();
      if state.terminated || state.reserved_for.is_some() || state.in_flight_to.is_some() {
        return None;
      }
      match self.config.mode() {
        | DistributionMode::Exclusive => state.pop_head(|item| self.config.weight_of(item))?,
        | DistributionMode::Broadcast { copy } => {
          let (_, head) = state.messages.front()?;
          copy.as_ref().map_or_else(|| head.clone(), |copy| copy(head))
        },
      }
    };
    if !self.config.mode().is_broadcast() {
      self.config.notify_removed(1);
      self.schedule_round();
      self.complete_if_possible();
    }
    Some(item)
  }

  /// Takes every stored value without linking.
  ///
  /// Broadcast stores return a copy of the head only.
  pub fn try_receive_all(&self) -> Vec<T> {
    if self.config.mode().is_broadcast() {
      return self.try_receive().into_iter().collect();
    }
    let items = {
      let mut state = self.state.lock();
      if state.terminated || state.reserved_for.is_some() || state.in_flight_to.is_some() {
        return Vec::new();
      }
      state.take_all()
    };
    self.config.notify_removed(items.len());
    self.complete_if_possible();
    items
  }

  /// Returns the weighted number of stored values.
  #[must_use]
  pub fn output_count(&self) -> usize {
    self.state.lock().weight
  }

  /// Returns the number of linked targets.
  #[must_use]
  pub fn link_count(&self) -> usize {
    self.state.lock().registry.len()
  }

  /// Handles `consume_message` for the owning block.
  ///
  /// # Errors
  ///
  /// Returns [`ProtocolError::InvalidHeader`] for a header id that is not positive.
  pub fn consume_message(&self, header: MessageHeader, target: BlockId) -> Result<Option<T>, ProtocolError> {
    let header = header.validate()?;
    let mut removed = 0;
    let item = {
      let mut state = self.state.lock();
      if Self::pull_blocked(&state, header, target) {
        state.schedule_retry(target);
        None
      } else {
        match self.config.mode() {
          | DistributionMode::Exclusive => {
            let item = state.pop_head(|item| self.config.weight_of(item));
            if item.is_some() {
              removed = 1;
              self.log_exhausted(state.record_delivery(target));
            }
            item
          },
          | DistributionMode::Broadcast { copy } => {
            let copied = state.messages.front().map(|(_, head)| copy.as_ref().map_or_else(|| head.clone(), |copy| copy(head)));
            state.reserved_for = None;
            state.postponed.remove(&target);
            if state.delivered.insert(target) {
              self.log_exhausted(state.record_delivery(target));
            }
            if state.broadcast_head_done() && state.in_flight_to.is_none() && state.pop_head(|item| self.config.weight_of(item)).is_some() {
              removed = 1;
            }
            copied
          },
        }
      }
    };
    self.config.notify_removed(removed);
    self.schedule_round();
    if removed > 0 {
      self.complete_if_possible();
    }
    Ok(item)
  }

  /// Handles `reserve_message` for the owning block.
  ///
  /// # Errors
  ///
  /// Returns [`ProtocolError::InvalidHeader`] for a header id that is not positive.
  pub fn reserve_message(&self, header: MessageHeader, target: BlockId) -> Result<bool, ProtocolError> {
    let header = header.validate()?;
    let reserved = {
      let mut state = self.state.lock();
      if Self::pull_blocked(&state, header, target) {
        state.schedule_retry(target);
        false
      } else {
        state.reserved_for = Some(target);
        true
      }
    };
    if !reserved {
      self.schedule_round();
    }
    Ok(reserved)
  }

  /// Handles `release_reservation` for the owning block.
  ///
  /// # Errors
  ///
  /// Returns [`ProtocolError::InvalidHeader`] for a header id that is not positive and
  /// [`ProtocolError::NotReserved`] when `target` does not hold the reservation on `header`.
  pub fn release_reservation(&self, header: MessageHeader, target: BlockId) -> Result<(), ProtocolError> {
    let header = header.validate()?;
    {
      let mut state = self.state.lock();
      if state.reserved_for != Some(target) || state.head_header() != Some(header) {
        return Err(ProtocolError::NotReserved { header_id: header.id(), target });
      }
      state.reserved_for = None;
      state.schedule_retry(target);
      state.rebuild_pass();
    }
    self.schedule_round();
    Ok(())
  }

  fn pull_blocked(state: &OutgoingState<T>, header: MessageHeader, target: BlockId) -> bool {
    state.terminated
      || state.head_header() != Some(header)
      || state.reserved_for.is_some_and(|holder| holder != target)
      || state.in_flight_to.is_some_and(|offered| offered != target)
  }

  fn schedule_round(&self) {
    // Published before ownership is tried: a finishing round either sees the request or has
    // already released `offering` for this caller to take.
    self.rerun.store(true, Ordering::SeqCst);
    if self.offering.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst).is_err() {
      return;
    }
    let Some(this) = self.this.upgrade() else {
      self.offering.store(false, Ordering::SeqCst);
      return;
    };
    if let Err(error) = self.executor.execute(Box::new(move || this.run_round())) {
      self.offering.store(false, Ordering::SeqCst);
      tracing::warn!(target: "fraktor::dataflow", block = %self.owner, %error, "offer round rejected by executor");
      self.aggregator.report_fault(BlockFault::Dispatch(error), FaultDisposition::Retain);
    }
  }

  fn run_round(&self) {
    loop {
      self.rerun.store(false, Ordering::SeqCst);
      self.aggregator.enter_unsafe();
      loop {
        match self.next_step() {
          | Step::Offer(plan) => self.offer_to(plan),
          | Step::Progress => {},
          | Step::Idle => break,
        }
      }
      self.aggregator.leave_unsafe();
      self.offering.store(false, Ordering::SeqCst);
      if !self.rerun.load(Ordering::SeqCst) {
        break;
      }
      // Lost the CAS: the winner owns the pending request.
      if self.offering.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst).is_err() {
        break;
      }
    }
    self.complete_if_possible();
  }

  fn next_step(&self) -> Step<T> {
    let mut removed = 0;
    let step = {
      let mut state = self.state.lock();
      self.plan_step(&mut state, &mut removed)
    };
    self.config.notify_removed(removed);
    step
  }

  fn plan_step(&self, state: &mut OutgoingState<T>, removed: &mut usize) -> Step<T> {
    if state.terminated || state.reserved_for.is_some() || state.messages.is_empty() {
      return Step::Idle;
    }
    state.sync_pass();
    if self.config.mode().is_broadcast() && state.broadcast_head_done() {
      state.pop_head(|item| self.config.weight_of(item));
      *removed += 1;
      return Step::Progress;
    }
    let Some(target_id) = state.next_candidate() else {
      return Step::Idle;
    };
    let (Some(header), Some(registration)) = (state.head_header(), state.registry.get(target_id)) else {
      return Step::Progress;
    };
    let target = registration.target().clone();
    let Some((_, value)) = state.messages.front() else {
      return Step::Idle;
    };
    let consume_to_accept = matches!(self.config.mode(), DistributionMode::Broadcast { copy: Some(_) });
    let value = value.clone();
    state.in_flight_to = Some(target_id);
    Step::Offer(OfferPlan { target, target_id, header, value, consume_to_accept })
  }

  fn offer_to(&self, plan: OfferPlan<T>) {
    let OfferPlan { target, target_id, header, value, consume_to_accept } = plan;
    let Some(source) = self.source.upgrade() else {
      self.state.lock().in_flight_to = None;
      return;
    };
    let status = target.offer(header, &value, Some(&source), consume_to_accept);
    drop(value);
    let mut removed = 0;
    {
      let mut state = self.state.lock();
      state.in_flight_to = None;
      if state.terminated {
        return;
      }
      let status = match status {
        | Ok(status) => status,
        | Err(error) => {
          tracing::warn!(
            target: "fraktor::dataflow",
            block = %self.owner,
            target_block = %target_id,
            %error,
            "offer rejected by target"
          );
          OfferStatus::Declined
        },
      };
      let head_still_current = state.head_header() == Some(header);
      match status {
        | OfferStatus::Accepted => {
          if !consume_to_accept && head_still_current {
            match self.config.mode() {
              | DistributionMode::Exclusive => {
                state.pop_head(|item| self.config.weight_of(item));
                removed = 1;
                self.log_exhausted(state.record_delivery(target_id));
              },
              | DistributionMode::Broadcast { .. } => {
                if state.delivered.insert(target_id) {
                  self.log_exhausted(state.record_delivery(target_id));
                }
              },
            }
          }
        },
        | OfferStatus::Postponed => {
          if head_still_current && !state.retry.contains(&target_id) {
            state.postponed.insert(target_id);
          }
        },
        | OfferStatus::Declined | OfferStatus::NotAvailable => {
          if head_still_current && self.config.mode().is_broadcast() {
            state.delivered.insert(target_id);
          }
        },
        | OfferStatus::DecliningPermanently => {
          state.forget_target(target_id);
          if state.registry.remove_target(target_id).is_some() {
            tracing::debug!(
              target: "fraktor::dataflow",
              block = %self.owner,
              target_block = %target_id,
              "target declined permanently, unlinked"
            );
          }
        },
      }
    }
    self.config.notify_removed(removed);
  }

  fn log_exhausted(&self, exhausted: Option<TargetRegistration<T>>) {
    if let Some(registration) = exhausted {
      tracing::debug!(
        target: "fraktor::dataflow",
        block = %self.owner,
        target_block = %registration.target_id(),
        link_id = registration.link_id(),
        "link reached its message limit, unlinked"
      );
    }
  }

  fn complete_if_possible(&self) {
    let ready = {
      let state = self.state.lock();
      state.completion_requested && !state.terminated && state.messages.is_empty()
    };
    if ready {
      self.aggregator.try_complete();
    }
  }

  fn terminate(&self, settled: &CompletionState) {
    let targets: Vec<TargetRef<T>> = {
      let mut state = self.state.lock();
      state.terminated = true;
      state.messages.clear();
      state.weight = 0;
      state.pass_head = None;
      state.reserved_for = None;
      state.pass.clear();
      state.retry.clear();
      state.postponed.clear();
      state.delivered.clear();
      state
        .registry
        .drain()
        .into_iter()
        .filter(TargetRegistration::propagate_completion)
        .map(|registration| registration.target().clone())
        .collect()
    };
    self.propagate(targets, settled.clone());
  }

  fn propagate(&self, targets: Vec<TargetRef<T>>, settled: CompletionState) {
    if targets.is_empty() || !settled.is_settled() {
      return;
    }
    let owner = self.owner;
    let task = Box::new(move || {
      for target in targets {
        tracing::trace!(target: "fraktor::dataflow", block = %owner, target_block = %target.block_id(), "propagating completion");
        match &settled {
          | CompletionState::Faulted(aggregate) => target.fault(BlockFault::Upstream(aggregate.clone())),
          | _ => target.complete(),
        }
      }
    });
    if let Err(error) = self.executor.execute(task) {
      tracing::warn!(target: "fraktor::dataflow", block = %self.owner, %error, "completion propagation rejected by executor");
    }
  }
}

impl<T> LinkRegistry for SourceCore<T>
where
  T: Clone + Send + 'static,
{
  fn unlink(&self, link_id: u64) -> bool {
    let removed = {
      let mut state = self.state.lock();
      let removed = state.registry.remove_link(link_id);
      if let Some(registration) = &removed {
        state.forget_target(registration.target_id());
      }
      removed
    };
    let Some(registration) = removed else {
      return false;
    };
    tracing::debug!(
      target: "fraktor::dataflow",
      block = %self.owner,
      target_block = %registration.target_id(),
      link_id,
      "target unlinked"
    );
    self.schedule_round();
    true
  }

  fn is_linked(&self, link_id: u64) -> bool {
    self.state.lock().registry.contains_link(link_id)
  }
}
