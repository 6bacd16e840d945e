//! # Case Manager Subsystem
//!
//! The court core: cases, their motion queues, the jury, and the penalties a
//! verdict carries.
//!
//! ## Purpose
//!
//! Members file cases against each other, a jury is recruited from eligible
//! members, motions are argued and voted on, and passed penalties are executed
//! automatically (warnings, platform bans, timed prison sentences handed to
//! the warden ledger).
//!
//! ## Domain Invariants
//!
//! - A case's stage advances 1 (Jury Selection) → 2 (Argumentation) only once
//!   the jury pool holds at least five seated jurors, and demotes 2 → 1 the
//!   moment it drops below five.
//! - At most one motion is in consideration at a time, and it is always the
//!   head of the motion queue.
//! - Motion ids are unique within a case and strictly increasing, never reused
//!   even after a motion is removed.
//! - A voter appears in at most one of a motion's Yes/No sets; a motion's vote
//!   sets are empty whenever it is not in consideration.
//! - Sealed evidence is visible only to the case's plaintiff, defense, and
//!   seated jurors.
//!
//! ## Module Structure
//!
//! ```text
//! domain/   - Case, Motion, Penalty, Evidence, events, jury eligibility
//! ports/    - CourtApi (inbound), Notifier and SentenceExecutor (outbound)
//! service   - CaseManager: active-case registry, tick orchestration,
//!             persistence, announce fan-out
//! config    - CourtConfig (jury rules, eligibility criteria, news wire)
//! ```
//!
//! ## Concurrency
//!
//! Every case lives behind its own `tokio::sync::Mutex`; a mutation, its
//! persistence write, and its announce fan-out complete under one lock hold so
//! no caller ever observes a half-updated case. The active-case registry map
//! is only written by case filing and case closing.

pub mod config;
pub mod domain;
pub mod ports;
pub mod service;

pub use config::CourtConfig;
pub use domain::*;
pub use ports::*;
pub use service::CaseManager;
