//! # Gavel Test Suite
//!
//! Cross-subsystem tests driving the court core through the wired service
//! stack, exactly as the runtime does.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs       # Harness: wired stack + guild fake + mock clock
//! └── integration/
//!     ├── court_flow.rs # filing → jury → motions → verdict scenarios
//!     ├── warden_flow.rs# warrant stacking and booking reconciliation
//!     └── persistence.rs# restart rehydration
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p gavel-tests
//! ```

#![allow(dead_code)]

pub mod fixtures;
pub mod integration;
