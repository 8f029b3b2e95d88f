#![deny(missing_docs)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::redundant_clone))]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::missing_errors_doc)]
#![deny(clippy::missing_panics_doc)]
#![deny(clippy::redundant_field_names)]
#![deny(clippy::redundant_pattern)]
#![deny(clippy::needless_borrow)]
#![deny(clippy::manual_let_else)]
#![deny(clippy::unused_self)]
#![deny(clippy::unreachable)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
#![deny(clippy::print_stdout)]
#![deny(clippy::dbg_macro)]
#![deny(clippy::must_use_candidate)]
#![deny(clippy::clone_on_copy)]
#![deny(clippy::len_without_is_empty)]
#![deny(clippy::wrong_self_convention)]
#![deny(clippy::bool_comparison)]
#![deny(clippy::match_like_matches_macro)]
#![cfg_attr(not(test), no_std)]

//! Message-passing block engine.
//!
//! The `core` package holds the portable machinery every dataflow block is built from: the
//! offer/postpone/reserve/consume handoff, the inbound mailbox with bounded-capacity
//! back-pressure, the outgoing distributor that fans values out to linked targets, the
//! completion aggregator, and the parallelism throttle. It only needs `alloc`.
//!
//! The `std` package binds the core to Tokio and adds blocking conveniences.

extern crate alloc;

/// Portable block machinery (`no_std` + `alloc`).
pub mod core;
/// Standard runtime bindings.
#[cfg(feature = "std")]
pub mod std;
