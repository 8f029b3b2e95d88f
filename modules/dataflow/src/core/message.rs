//! Message identity package.
//!
//! Headers name one pending value offered by a block; block identifiers name the blocks taking
//! part in a handoff so postponements and reservations can be attributed.

mod block_id;
mod header_sequence;
mod message_header;
mod offer_status;

pub use block_id::BlockId;
pub use header_sequence::HeaderSequence;
pub use message_header::MessageHeader;
pub use offer_status::OfferStatus;
