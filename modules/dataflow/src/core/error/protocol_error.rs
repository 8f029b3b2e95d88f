//! Usage errors of the handoff protocol.

use crate::core::message::BlockId;


/// Errors returned synchronously when a caller violates the handoff protocol.
#[derive(Debug, Clone, Copy, thiserror::Error, PartialEq, Eq)]
pub enum ProtocolError {
  /// The header id is zero or negative.
  #[error("invalid message header id {0}")]
  InvalidHeader(i64),
  /// A consume-to-accept offer arrived without a source to consume from.
  #[error("consume-to-accept offer requires a source")]
  MissingSource,
  /// A reservation was released by a target that does not hold it.
  #[error("header {header_id} is not reserved by {target}")]
  NotReserved {
    /// Header id named in the release.
    header_id: i64,
    /// Target that attempted the release.
    target:    BlockId,
  },
  /// A block tried to link to itself.
  #[error("a block cannot be linked to itself")]
  SelfLink,
}
