//! Ports for the case manager subsystem.
//!
//! - `inbound` - the `CourtApi` trait the command surface drives
//! - `outbound` - notification fan-out and sentence hand-off dependencies

pub mod inbound;
pub mod outbound;

pub use inbound::CourtApi;
pub use outbound::{Notifier, NotifyError, Recipient, SentenceError, SentenceExecutor};
