//! Outbound side of a block.
//!
//! [`SourceCore`] owns the produced values and offers the head value to linked targets one at a
//! time, either handing it to exactly one target or, in broadcast mode, to every target.

mod distribution_mode;
mod outgoing_state;
mod source_core;
mod source_core_config;
mod target_registration;
mod target_registry;

pub use distribution_mode::{CopyFn, DistributionMode};
pub use source_core::SourceCore;
pub use source_core_config::{ItemWeight, ItemsRemovedHook, SourceCoreConfig};
pub use target_registration::TargetRegistration;
