//! Cross-subsystem integration flows.

mod court_flow;
mod persistence;
mod warden_flow;
