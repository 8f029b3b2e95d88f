//! Test doubles shared by the unit tests.

use alloc::{
  boxed::Box,
  collections::VecDeque,
  sync::{Arc, Weak},
  vec::Vec,
};

use hashbrown::HashMap;
use portable_atomic::{AtomicBool, AtomicUsize, Ordering};
use spin::Mutex;

use crate::core::{
  block::{DataflowBlock, MessageSource, SourceRef, TargetBlock},
  completion::{CompletionAggregator, CompletionHandle},
  dispatch::{DispatchExecutor, DispatchTask},
  error::{BlockFault, DispatchError, ProtocolError},
  message::{BlockId, MessageHeader, OfferStatus},
};

/// Executor that queues tasks until the test runs them.
pub(crate) struct ManualExecutor {
  tasks:     Mutex<VecDeque<DispatchTask>>,
  submitted: AtomicUsize,
}

impl ManualExecutor {
  pub(crate) fn new() -> Arc<Self> {
    Arc::new(Self { tasks: Mutex::new(VecDeque::new()), submitted: AtomicUsize::new(0) })
  }

  pub(crate) fn run_next(&self) -> bool {
    let task = self.tasks.lock().pop_front();
    match task {
      | Some(task) => {
        task();
        true
      },
      | None => false,
    }
  }

  pub(crate) fn run_all(&self) -> usize {
    let mut ran = 0;
    while self.run_next() {
      ran += 1;
    }
    ran
  }

  pub(crate) fn pending(&self) -> usize {
    self.tasks.lock().len()
  }

  pub(crate) fn submitted(&self) -> usize {
    self.submitted.load(Ordering::SeqCst)
  }
}

impl DispatchExecutor for ManualExecutor {
  fn execute(&self, task: DispatchTask) -> Result<(), DispatchError> {
    self.submitted.fetch_add(1, Ordering::SeqCst);
    self.tasks.lock().push_back(task);
    Ok(())
  }
}

/// Executor that runs every task on a fresh OS thread.
pub(crate) struct ThreadExecutor;

impl ThreadExecutor {
  pub(crate) fn shared() -> Arc<Self> {
    Arc::new(Self)
  }
}

impl DispatchExecutor for ThreadExecutor {
  fn execute(&self, task: DispatchTask) -> Result<(), DispatchError> {
    drop(std::thread::spawn(task));
    Ok(())
  }
}

/// Polls `condition` until it holds or five seconds pass.
pub(crate) fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
  let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
  while std::time::Instant::now() < deadline {
    if condition() {
      return true;
    }
    std::thread::sleep(std::time::Duration::from_millis(1));
  }
  condition()
}

/// Executor that refuses every task.
pub(crate) struct RejectingExecutor;

impl DispatchExecutor for RejectingExecutor {
  fn execute(&self, _task: DispatchTask) -> Result<(), DispatchError> {
    Err(DispatchError::RejectedExecution)
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SourceCall {
  Reserve(i64),
  Consume(i64),
  Release(i64),
}

struct StubState<T> {
  values:   HashMap<MessageHeader, T>,
  reserved: HashMap<MessageHeader, BlockId>,
  calls:    Vec<SourceCall>,
}

/// Source handing out values registered per header.
pub(crate) struct StubSource<T> {
  id:    BlockId,
  state: Mutex<StubState<T>>,
  this:  Weak<Self>,
}

impl<T: Send + 'static> StubSource<T> {
  pub(crate) fn new() -> Arc<Self> {
    Arc::new_cyclic(|this| Self {
      id:    BlockId::allocate(),
      state: Mutex::new(StubState { values: HashMap::new(), reserved: HashMap::new(), calls: Vec::new() }),
      this:  this.clone(),
    })
  }

  pub(crate) fn provide(&self, header: MessageHeader, value: T) {
    self.state.lock().values.insert(header, value);
  }

  pub(crate) fn source(&self) -> SourceRef<T> {
    let this: Arc<Self> = self.this.upgrade().expect("stub source alive");
    this
  }

  pub(crate) fn calls(&self) -> Vec<SourceCall> {
    self.state.lock().calls.clone()
  }

  pub(crate) fn remaining(&self) -> usize {
    self.state.lock().values.len()
  }
}

impl<T: Send + 'static> MessageSource<T> for StubSource<T> {
  fn source_id(&self) -> BlockId {
    self.id
  }

  fn consume_message(&self, header: MessageHeader, target: BlockId) -> Result<Option<T>, ProtocolError> {
    let header = header.validate()?;
    let mut state = self.state.lock();
    state.calls.push(SourceCall::Consume(header.id()));
    if state.reserved.get(&header).is_some_and(|holder| *holder != target) {
      return Ok(None);
    }
    state.reserved.remove(&header);
    Ok(state.values.remove(&header))
  }

  fn reserve_message(&self, header: MessageHeader, target: BlockId) -> Result<bool, ProtocolError> {
    let header = header.validate()?;
    let mut state = self.state.lock();
    state.calls.push(SourceCall::Reserve(header.id()));
    if !state.values.contains_key(&header) {
      return Ok(false);
    }
    if let Some(holder) = state.reserved.get(&header).copied() {
      return Ok(holder == target);
    }
    state.reserved.insert(header, target);
    Ok(true)
  }

  fn release_reservation(&self, header: MessageHeader, target: BlockId) -> Result<(), ProtocolError> {
    let header = header.validate()?;
    let mut state = self.state.lock();
    state.calls.push(SourceCall::Release(header.id()));
    if state.reserved.get(&header) != Some(&target) {
      return Err(ProtocolError::NotReserved { header_id: header.id(), target });
    }
    state.reserved.remove(&header);
    Ok(())
  }
}

type OfferHook = Box<dyn FnOnce() + Send>;

/// Offers seen by a group of recording targets, in the order they arrived.
pub(crate) type OfferLog<T> = Arc<Mutex<Vec<(&'static str, T)>>>;

/// Target answering offers from a script and recording everything it sees.
pub(crate) struct RecordingTarget<T> {
  id:         BlockId,
  name:       &'static str,
  script:     Mutex<VecDeque<OfferStatus>>,
  fallback:   OfferStatus,
  offers:     OfferLog<T>,
  received:   Mutex<Vec<T>>,
  postponed:  Mutex<Vec<(SourceRef<T>, MessageHeader)>>,
  hook:       Mutex<Option<OfferHook>>,
  completed:  AtomicBool,
  faults:     Mutex<Vec<BlockFault>>,
  aggregator: CompletionAggregator,
}

impl<T: Clone + Send + 'static> RecordingTarget<T> {
  pub(crate) fn new(name: &'static str, fallback: OfferStatus, offers: OfferLog<T>) -> Arc<Self> {
    Self::with_id(BlockId::allocate(), name, fallback, offers)
  }

  pub(crate) fn with_id(id: BlockId, name: &'static str, fallback: OfferStatus, offers: OfferLog<T>) -> Arc<Self> {
    Arc::new(Self {
      id,
      name,
      script: Mutex::new(VecDeque::new()),
      fallback,
      offers,
      received: Mutex::new(Vec::new()),
      postponed: Mutex::new(Vec::new()),
      hook: Mutex::new(None),
      completed: AtomicBool::new(false),
      faults: Mutex::new(Vec::new()),
      aggregator: CompletionAggregator::new(id),
    })
  }

  pub(crate) fn accepting(name: &'static str) -> Arc<Self> {
    Self::new(name, OfferStatus::Accepted, new_log())
  }

  /// Answers the next offers with `statuses` before falling back.
  pub(crate) fn script(&self, statuses: impl IntoIterator<Item = OfferStatus>) {
    self.script.lock().extend(statuses);
  }

  /// Runs `hook` at the start of the next offer.
  pub(crate) fn on_next_offer(&self, hook: impl FnOnce() + Send + 'static) {
    *self.hook.lock() = Some(Box::new(hook));
  }

  pub(crate) fn received(&self) -> Vec<T> {
    self.received.lock().clone()
  }

  pub(crate) fn postponed(&self) -> Vec<MessageHeader> {
    self.postponed.lock().iter().map(|(_, header)| *header).collect()
  }

  /// Consumes every postponed offer; returns what was obtained.
  pub(crate) fn pull_postponed(&self) -> Vec<T> {
    let entries: Vec<_> = self.postponed.lock().drain(..).collect();
    let mut pulled = Vec::new();
    for (source, header) in entries {
      if let Ok(Some(value)) = source.consume_message(header, self.id) {
        self.received.lock().push(value.clone());
        pulled.push(value);
      }
    }
    pulled
  }

  pub(crate) fn is_completed(&self) -> bool {
    self.completed.load(Ordering::SeqCst)
  }

  pub(crate) fn faults(&self) -> Vec<BlockFault> {
    self.faults.lock().clone()
  }
}

pub(crate) fn new_log<T>() -> OfferLog<T> {
  Arc::new(Mutex::new(Vec::new()))
}

impl<T: Clone + Send + 'static> DataflowBlock for RecordingTarget<T> {
  fn block_id(&self) -> BlockId {
    self.id
  }

  fn complete(&self) {
    self.completed.store(true, Ordering::SeqCst);
    self.aggregator.try_complete();
  }

  fn fault(&self, fault: BlockFault) {
    self.faults.lock().push(fault.clone());
    let disposition = fault.disposition();
    self.aggregator.report_fault(fault, disposition);
  }

  fn completion(&self) -> CompletionHandle {
    self.aggregator.handle()
  }
}

impl<T: Clone + Send + 'static> TargetBlock<T> for RecordingTarget<T> {
  fn offer(
    &self,
    header: MessageHeader,
    value: &T,
    source: Option<&SourceRef<T>>,
    consume_to_accept: bool,
  ) -> Result<OfferStatus, ProtocolError> {
    let header = header.validate()?;
    let hook = self.hook.lock().take();
    if let Some(hook) = hook {
      hook();
    }
    self.offers.lock().push((self.name, value.clone()));
    let status = self.script.lock().pop_front().unwrap_or(self.fallback);
    match (status, source) {
      | (OfferStatus::Accepted, Some(source)) if consume_to_accept => {
        if !source.reserve_message(header, self.id)? {
          return Ok(OfferStatus::NotAvailable);
        }
        match source.consume_message(header, self.id)? {
          | Some(value) => {
            self.received.lock().push(value);
            Ok(OfferStatus::Accepted)
          },
          | None => Ok(OfferStatus::NotAvailable),
        }
      },
      | (OfferStatus::Accepted, _) => {
        self.received.lock().push(value.clone());
        Ok(OfferStatus::Accepted)
      },
      | (OfferStatus::Postponed, Some(source)) => {
        self.postponed.lock().push((source.clone(), header));
        Ok(OfferStatus::Postponed)
      },
      | (OfferStatus::Postponed, None) => Ok(OfferStatus::Declined),
      | (status, _) => Ok(status),
    }
  }
}
