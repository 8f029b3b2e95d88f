use super::ReservationVault;
use crate::core::{
  error::ProtocolError,
  message::{BlockId, MessageHeader},
};

#[test]
fn first_reservation_wins() {
  let mut vault = ReservationVault::new();
  let header = vault.store("value");
  let (first, second) = (BlockId::allocate(), BlockId::allocate());
  assert!(vault.reserve(header, first));
  assert!(vault.reserve(header, first));
  assert!(!vault.reserve(header, second));
  assert_eq!(vault.holder(header), Some(first));
  assert_eq!(vault.consume(header, second), None);
  assert_eq!(vault.consume(header, first), Some("value"));
  assert!(vault.is_empty());
}

#[test]
fn unreserved_value_can_be_consumed_directly() {
  let mut vault = ReservationVault::new();
  let header = vault.store(3);
  assert_eq!(vault.consume(header, BlockId::allocate()), Some(3));
  assert_eq!(vault.consume(header, BlockId::allocate()), None);
}

#[test]
fn release_requires_the_holder() {
  let mut vault = ReservationVault::new();
  let header = vault.store(1);
  let (holder, other) = (BlockId::allocate(), BlockId::allocate());
  assert_eq!(vault.release(header, holder), Err(ProtocolError::NotReserved { header_id: header.id(), target: holder }));
  assert!(vault.reserve(header, holder));
  assert!(vault.release(header, other).is_err());
  assert_eq!(vault.release(header, holder), Ok(()));
  assert!(vault.reserve(header, other));
}

#[test]
fn headers_are_distinct_and_tracked_independently() {
  let mut vault = ReservationVault::new();
  let a = vault.store('a');
  let b = vault.store('b');
  assert_ne!(a, b);
  let target = BlockId::allocate();
  assert!(vault.reserve(a, target));
  assert!(vault.reserve(b, target));
  assert_eq!(vault.release_all(target), 2);
  assert_eq!(vault.holder(a), None);
  assert_eq!(vault.len(), 2);
}

#[test]
fn withdraw_drops_reservations() {
  let mut vault = ReservationVault::new();
  let header = vault.store(9);
  let target = BlockId::allocate();
  vault.reserve(header, target);
  assert_eq!(vault.withdraw(header), Some(9));
  assert!(vault.release(header, target).is_err());
  assert_eq!(vault.withdraw(MessageHeader::new(42)), None);
}
