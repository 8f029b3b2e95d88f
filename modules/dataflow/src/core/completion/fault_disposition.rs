/// How the aggregator treats a fault reported after another one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FaultDisposition {
  /// The fault is always kept.
  Retain,
  /// The fault is dropped when any fault is already recorded.
  ///
  /// The first recorded fault is kept even when it is ignorable.
  IgnorableIfSuperseded,
}
