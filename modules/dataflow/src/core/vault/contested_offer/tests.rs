use alloc::{sync::Arc, vec, vec::Vec};

use super::ContestedOffer;
use crate::core::{
  block::{DataflowBlock, MessageSource, TargetRef},
  message::{BlockId, MessageHeader, OfferStatus},
  testing::{RecordingTarget, new_log},
  vault::HandoffOutcome,
};

fn targets(recorders: &[&Arc<RecordingTarget<u32>>]) -> Vec<TargetRef<u32>> {
  recorders
    .iter()
    .map(|recorder| {
      let target: TargetRef<u32> = (*recorder).clone();
      target
    })
    .collect()
}

#[test]
fn first_accepting_target_wins_the_value() {
  let log = new_log();
  let refuser = RecordingTarget::new("refuser", OfferStatus::Declined, log.clone());
  let winner = RecordingTarget::new("winner", OfferStatus::Accepted, log.clone());
  let loser = RecordingTarget::new("loser", OfferStatus::Accepted, log.clone());
  let offer = ContestedOffer::new();

  let outcome = offer.offer_to(6, &targets(&[&refuser, &winner, &loser]));
  assert!(matches!(outcome, HandoffOutcome::Delivered(id) if id == winner.block_id()));
  assert_eq!(winner.received(), vec![6]);
  assert!(loser.received().is_empty());
  assert_eq!(log.lock().len(), 2);
  assert_eq!(offer.pending(), 0);
}

#[test]
fn value_comes_back_when_nobody_takes_it() {
  let refuser = RecordingTarget::new("refuser", OfferStatus::Declined, new_log());
  let offer = ContestedOffer::new();
  let outcome = offer.offer_to(3, &targets(&[&refuser]));
  assert!(matches!(outcome, HandoffOutcome::Undelivered(3)));
  assert_eq!(offer.pending(), 0);
}

#[test]
fn postponed_value_stays_in_the_vault_until_pulled() {
  let target = RecordingTarget::new("later", OfferStatus::Postponed, new_log());
  let offer = ContestedOffer::new();

  let HandoffOutcome::Postponed(header) = offer.offer_to(12, &targets(&[&target])) else {
    panic!("expected a postponed handoff");
  };
  assert_eq!(offer.pending(), 1);
  assert_eq!(target.pull_postponed(), vec![12]);
  assert_eq!(offer.pending(), 0);
  assert!(offer.retract(header).is_none());
}

#[test]
fn retract_withdraws_a_postponed_value() {
  let target = RecordingTarget::new("later", OfferStatus::Postponed, new_log());
  let offer = ContestedOffer::new();
  let HandoffOutcome::Postponed(header) = offer.offer_to(4, &targets(&[&target])) else {
    panic!("expected a postponed handoff");
  };
  assert_eq!(offer.retract(header), Some(4));
  assert!(target.pull_postponed().is_empty());
}

#[test]
fn only_the_reservation_holder_may_consume() {
  let target = RecordingTarget::new("later", OfferStatus::Postponed, new_log());
  let offer = ContestedOffer::new();
  let HandoffOutcome::Postponed(header) = offer.offer_to(9, &targets(&[&target])) else {
    panic!("expected a postponed handoff");
  };
  let holder = BlockId::allocate();
  let other = BlockId::allocate();
  assert_eq!(offer.reserve_message(header, holder), Ok(true));
  assert_eq!(offer.reserve_message(header, other), Ok(false));
  assert_eq!(offer.consume_message(header, other), Ok(None));
  assert!(offer.release_reservation(header, other).is_err());
  assert_eq!(offer.consume_message(header, holder), Ok(Some(9)));
  assert!(offer.consume_message(MessageHeader::new(0), holder).is_err());
}
