//! Ports for the warden subsystem.
//!
//! Only the inbound API lives here; the warden's outbound dependencies
//! (document store, moderation gateway, clock) are the shared traits from
//! `shared-types`.

pub mod inbound;

pub use inbound::WardenApi;
