//! Inbound side of a block.
//!
//! The mailbox admits offers under bounded capacity, records postponed offers against their
//! sources, and runs the block's processing strategy on throttled workers.

mod base;
mod capacity_release;
mod mailbox_config;
mod mailbox_hooks;
mod postponed_offers;

pub use base::Mailbox;
pub use capacity_release::CapacityRelease;
pub use mailbox_config::MailboxConfig;
pub use mailbox_hooks::{AdmissionPredicate, DrainedHook, MailboxHooks};
