/// Outcome of offering a value to a target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OfferStatus {
  /// The target took ownership of the value.
  Accepted,
  /// The target did not take the value; the offering side must retry on its own.
  Declined,
  /// The target recorded the header and will try to consume it later.
  Postponed,
  /// The target will never accept another value; the link should be dropped.
  DecliningPermanently,
  /// A consume-to-accept handoff found nothing to consume.
  NotAvailable,
}

impl OfferStatus {
  /// Returns `true` for [`OfferStatus::Accepted`].
  #[must_use]
  pub const fn is_accepted(self) -> bool {
    matches!(self, OfferStatus::Accepted)
  }
}
