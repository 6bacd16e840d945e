//! # Warden Subsystem
//!
//! The mute ledger: stacks independent "warrants" (mute orders) against a
//! user and reconciles them into a single mute/unmute action.
//!
//! ## Purpose
//!
//! Several subsystems may want the same user muted for different durations
//! and reasons at once - a case verdict, a manual moderation action, an
//! appeal stay. Each issuer appends a warrant and never coordinates with the
//! others; the per-user heartbeat reconciles the set into one booking state.
//!
//! ## Domain Invariants
//!
//! - A prisoner is booked (role snapshot taken, mute role applied) exactly
//!   while at least one warrant is neither frozen nor no-enforce.
//! - At most one warrant is active (has a non-null `expires`) at a time;
//!   warrants serialize, the next eligible one activates only after the
//!   current one is dropped.
//! - A prisoner with no remaining warrants and no stored role snapshot is
//!   archived (deleted) within one heartbeat.
//!
//! ## Module Structure
//!
//! ```text
//! domain/   - Warrant, Prisoner, the reconciliation step
//! ports/    - WardenApi (inbound); store/gateway/clock come from shared-types
//! service   - Warden: prisoner registry, booking I/O, persistence
//! ```

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::*;
pub use ports::WardenApi;
pub use service::{Warden, WardenConfig};
