//! Reservation vault for values offered to several targets at once.

mod contested_offer;
mod handoff_outcome;
mod reservation_key;
mod reservation_vault;

pub use contested_offer::ContestedOffer;
pub use handoff_outcome::HandoffOutcome;
pub use reservation_key::ReservationKey;
pub use reservation_vault::ReservationVault;
