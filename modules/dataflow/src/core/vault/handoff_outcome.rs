use crate::core::message::{BlockId, MessageHeader};

/// Result of offering one value to several targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandoffOutcome<T> {
  /// The named target consumed the value.
  Delivered(BlockId),
  /// At least one target postponed; the value stays stored under the header until pulled or
  /// withdrawn.
  Postponed(MessageHeader),
  /// Nobody took the value; it is handed back.
  Undelivered(T),
}
