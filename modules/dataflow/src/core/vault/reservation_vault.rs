use alloc::vec::Vec;

use hashbrown::{HashMap, HashSet};

use super::ReservationKey;
use crate::core::{
  error::ProtocolError,
  message::{BlockId, HeaderSequence, MessageHeader},
};

#[cfg(test)]
mod tests;

struct VaultEntry<T> {
  value:       T,
  reserved_by: Option<BlockId>,
}

/// Stored values awaiting exactly one consumer.
///
/// The first reservation on a header wins; only the holder may consume a reserved value, and an
/// unreserved value may be consumed directly by any target.
pub struct ReservationVault<T> {
  entries: HashMap<MessageHeader, VaultEntry<T>>,
  holds:   HashSet<ReservationKey>,
  headers: HeaderSequence,
}

impl<T> ReservationVault<T> {
  /// Creates an empty vault.
  #[must_use]
  pub fn new() -> Self {
    Self { entries: HashMap::new(), holds: HashSet::new(), headers: HeaderSequence::new() }
  }

  /// Stores `value` under a fresh header.
  pub fn store(&mut self, value: T) -> MessageHeader {
    let header = self.headers.next_header();
    self.entries.insert(header, VaultEntry { value, reserved_by: None });
    header
  }

  /// Claims the value for `target` when nobody else holds it.
  pub fn reserve(&mut self, header: MessageHeader, target: BlockId) -> bool {
    let Some(entry) = self.entries.get_mut(&header) else {
      return false;
    };
    match entry.reserved_by {
      | Some(holder) => holder == target,
      | None => {
        entry.reserved_by = Some(target);
        self.holds.insert(ReservationKey::new(header, target));
        true
      },
    }
  }

  /// Takes the value for the holder, or for anyone while it is unreserved.
  pub fn consume(&mut self, header: MessageHeader, target: BlockId) -> Option<T> {
    let entry = self.entries.get(&header)?;
    if entry.reserved_by.is_some_and(|holder| holder != target) {
      return None;
    }
    self.holds.remove(&ReservationKey::new(header, target));
    self.entries.remove(&header).map(|entry| entry.value)
  }

  /// Returns the reservation held by `target` to the unreserved state.
  ///
  /// # Errors
  ///
  /// Returns [`ProtocolError::NotReserved`] when `target` does not hold the reservation.
  pub fn release(&mut self, header: MessageHeader, target: BlockId) -> Result<(), ProtocolError> {
    if !self.holds.remove(&ReservationKey::new(header, target)) {
      return Err(ProtocolError::NotReserved { header_id: header.id(), target });
    }
    if let Some(entry) = self.entries.get_mut(&header) {
      entry.reserved_by = None;
    }
    Ok(())
  }

  /// Removes the value regardless of reservations.
  pub fn withdraw(&mut self, header: MessageHeader) -> Option<T> {
    let entry = self.entries.remove(&header)?;
    if let Some(holder) = entry.reserved_by {
      self.holds.remove(&ReservationKey::new(header, holder));
    }
    Some(entry.value)
  }

  /// Releases every reservation held by `target`; returns how many were released.
  pub fn release_all(&mut self, target: BlockId) -> usize {
    let held: Vec<ReservationKey> = self.holds.iter().filter(|key| key.target() == target).copied().collect();
    for key in &held {
      self.holds.remove(key);
      if let Some(entry) = self.entries.get_mut(&key.header()) {
        entry.reserved_by = None;
      }
    }
    held.len()
  }

  /// Returns the holder of the reservation on `header`.
  #[must_use]
  pub fn holder(&self, header: MessageHeader) -> Option<BlockId> {
    self.entries.get(&header).and_then(|entry| entry.reserved_by)
  }

  /// Returns `true` while a value is stored under `header`.
  #[must_use]
  pub fn contains(&self, header: MessageHeader) -> bool {
    self.entries.contains_key(&header)
  }

  /// Returns the number of stored values.
  #[must_use]
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  /// Returns `true` when nothing is stored.
  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

impl<T> Default for ReservationVault<T> {
  fn default() -> Self {
    Self::new()
  }
}
