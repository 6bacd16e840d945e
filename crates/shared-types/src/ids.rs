//! Identifier newtypes shared across subsystems.
//!
//! Chat-platform identities (users, roles, channels) are opaque numeric ids;
//! the aggregates hold them as weak references and resolve display facts on
//! demand through the `UserDirectory` port. Case, motion, and evidence ids are
//! human-readable strings with a fixed scheme.

use serde::{Deserialize, Serialize};

/// Seconds since the UNIX epoch.
///
/// All durations in the court system are whole seconds; sub-second precision
/// buys nothing for a process ticked on a minutes-scale interval.
pub type Timestamp = u64;

/// A chat-platform user id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(pub u64);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A chat-platform role id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RoleId(pub u64);

/// A chat-platform channel id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChannelId(pub u64);

/// A case id: `YYYYMMDD-XXXX`, filing date plus a random suffix.
///
/// Unique among *active* cases; the factory re-rolls the suffix on collision.
pub type CaseId = String;

/// A motion id: `{case_id}-M{n}`.
///
/// `n` is the case's motion counter, strictly increasing and never reused,
/// even after the motion is removed from the queue.
pub type MotionId = String;

/// An evidence id: `{case_id}-{role}{n}` where role is one of P/D/J/N
/// (plaintiff, defense, juror, neither).
pub type EvidenceId = String;

/// Builds a motion id from its case and sequence number.
pub fn motion_id(case_id: &str, n: u64) -> MotionId {
    format!("{case_id}-M{n}")
}

/// Builds an evidence id from its case, submitter role tag, and sequence number.
pub fn evidence_id(case_id: &str, role_tag: char, n: u64) -> EvidenceId {
    format!("{case_id}-{role_tag}{n}")
}
