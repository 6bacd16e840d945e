//! # Gavel Runtime
//!
//! Wires the court core to its collaborators and keeps the clocks ticking.
//!
//! ## Modular Structure
//!
//! - `config` - runtime configuration with environment overrides
//! - `adapters` - document/blob store implementations (in-memory and JSON
//!   file), guild directory/gateway fakes, the tracing notifier, and the
//!   warden-backed sentence executor
//! - `scheduler` - interval loops invoking `tick_all` on both registries
//! - `wiring` - service construction and hydration

pub mod adapters;
pub mod config;
pub mod scheduler;
pub mod wiring;

pub use config::BotConfig;
pub use wiring::ServiceStack;
