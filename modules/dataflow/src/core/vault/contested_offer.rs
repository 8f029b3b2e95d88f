use alloc::sync::{Arc, Weak};

use hashbrown::HashMap;
use spin::Mutex;

use super::{HandoffOutcome, ReservationVault};
use crate::core::{
  block::{MessageSource, SourceRef, TargetRef},
  error::ProtocolError,
  message::{BlockId, MessageHeader, OfferStatus},
};

#[cfg(test)]
mod tests;

struct ContestState<T> {
  vault:  ReservationVault<T>,
  // consumers of headers whose handoff is still running
  claims: HashMap<MessageHeader, Option<BlockId>>,
}

/// Offers one value to several targets so that exactly one of them gets it.
///
/// Targets are offered with `consume_to_accept`, so each one has to reserve and consume the
/// value through this source; the vault lets only the first reservation win.
pub struct ContestedOffer<T> {
  id:    BlockId,
  state: Mutex<ContestState<T>>,
  this:  Weak<Self>,
}

impl<T> ContestedOffer<T>
where
  T: Clone + Send + 'static,
{
  /// Creates an empty offer source.
  #[must_use]
  pub fn new() -> Arc<Self> {
    Arc::new_cyclic(|this| Self {
      id:    BlockId::allocate(),
      state: Mutex::new(ContestState { vault: ReservationVault::new(), claims: HashMap::new() }),
      this:  this.clone(),
    })
  }

  /// Offers `value` to `targets` in order until one consumes it.
  pub fn offer_to(&self, value: T, targets: &[TargetRef<T>]) -> HandoffOutcome<T> {
    let Some(this) = self.this.upgrade() else {
      return HandoffOutcome::Undelivered(value);
    };
    let source: SourceRef<T> = this;
    let header = {
      let mut state = self.state.lock();
      let header = state.vault.store(value.clone());
      state.claims.insert(header, None);
      header
    };
    let mut postponed = false;
    for target in targets {
      match target.offer(header, &value, Some(&source), true) {
        | Ok(OfferStatus::Accepted) => break,
        | Ok(OfferStatus::Postponed) => postponed = true,
        | Ok(_) => {},
        | Err(error) => {
          tracing::warn!(target: "fraktor::dataflow", block = %self.id, %error, "contested offer rejected");
        },
      }
    }
    let mut state = self.state.lock();
    if let Some(Some(consumer)) = state.claims.remove(&header) {
      return HandoffOutcome::Delivered(consumer);
    }
    if postponed && state.vault.contains(header) {
      return HandoffOutcome::Postponed(header);
    }
    HandoffOutcome::Undelivered(state.vault.withdraw(header).unwrap_or(value))
  }

  /// Withdraws a value left behind by a postponed handoff.
  pub fn retract(&self, header: MessageHeader) -> Option<T> {
    self.state.lock().vault.withdraw(header)
  }

  /// Returns the number of values still waiting for a consumer.
  #[must_use]
  pub fn pending(&self) -> usize {
    self.state.lock().vault.len()
  }
}

impl<T> MessageSource<T> for ContestedOffer<T>
where
  T: Clone + Send + 'static,
{
  fn source_id(&self) -> BlockId {
    self.id
  }

  fn consume_message(&self, header: MessageHeader, target: BlockId) -> Result<Option<T>, ProtocolError> {
    let header = header.validate()?;
    let mut state = self.state.lock();
    let consumed = state.vault.consume(header, target);
    if consumed.is_some() {
      if let Some(claim) = state.claims.get_mut(&header) {
        *claim = Some(target);
      }
    }
    Ok(consumed)
  }

  fn reserve_message(&self, header: MessageHeader, target: BlockId) -> Result<bool, ProtocolError> {
    let header = header.validate()?;
    Ok(self.state.lock().vault.reserve(header, target))
  }

  fn release_reservation(&self, header: MessageHeader, target: BlockId) -> Result<(), ProtocolError> {
    let header = header.validate()?;
    self.state.lock().vault.release(header, target)
  }
}
