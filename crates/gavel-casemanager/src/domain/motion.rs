//! Motions: proposals placed before the jury.
//!
//! All subtypes share the queue/voting protocol; they differ only in payload
//! and in the side effect `Case::execute_motion` applies when they pass.
//!
//! ## Voting state machine
//!
//! ```text
//! [QUEUED] ──start_voting──→ [IN CONSIDERATION] ──close──→ passed → execute → removed
//!    ↑                              │                       failed → removed
//!    └──────── cancel_voting ───────┘   (votes cleared, expiry cleared)
//! ```
//!
//! A motion is "in consideration" exactly while `expiry` is set, and only the
//! queue head is ever in that state.

use crate::domain::penalty::Penalty;
use serde::{Deserialize, Serialize};
use serde_json::json;
use shared_types::{MotionId, Timestamp, UserId};
use std::collections::BTreeSet;

/// Jury ballot for one motion.
///
/// A voter id appears in at most one of the two sets.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Votes {
    pub yes: BTreeSet<UserId>,
    pub no: BTreeSet<UserId>,
}

impl Votes {
    pub fn total(&self) -> usize {
        self.yes.len() + self.no.len()
    }

    pub fn has_voted(&self, voter: UserId) -> bool {
        self.yes.contains(&voter) || self.no.contains(&voter)
    }

    pub fn cast(&mut self, voter: UserId, in_favor: bool) {
        if in_favor {
            self.yes.insert(voter);
        } else {
            self.no.insert(voter);
        }
    }

    pub fn clear(&mut self) {
        self.yes.clear();
        self.no.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.yes.is_empty() && self.no.is_empty()
    }
}

/// Motion payload, a closed set of subtypes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MotionKind {
    /// Emits an official case statement on passing; no other state change.
    Statement { text: String },
    /// Emits a binding order naming a target and directive. Enforcement is
    /// social, there is no automated follow-up.
    Order { target: UserId, directive: String },
    /// Reprioritizes an existing queued motion to the front and forces an
    /// immediate vote on itself.
    Rush { rushed_motion_id: MotionId },
    /// Resolves a batch of queued motions in one vote: every motion on the
    /// pass list is executed and closed, every motion on the deny list is
    /// closed without execution.
    BatchVote {
        pass: Vec<MotionId>,
        deny: Vec<MotionId>,
    },
    /// Atomically replaces the case's penalty set.
    AdjustPenalty { new_penalties: Vec<Penalty> },
}

impl MotionKind {
    /// Short label for summaries and logs.
    pub fn label(&self) -> &'static str {
        match self {
            MotionKind::Statement { .. } => "statement motion",
            MotionKind::Order { .. } => "order motion",
            MotionKind::Rush { .. } => "rush motion",
            MotionKind::BatchVote { .. } => "batch vote motion",
            MotionKind::AdjustPenalty { .. } => "penalty adjustment motion",
        }
    }
}

/// One queued proposal.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Motion {
    pub id: MotionId,
    pub author: UserId,
    pub created: Timestamp,
    pub votes: Votes,
    /// Voting deadline; set exactly while the motion is in consideration.
    pub expiry: Option<Timestamp>,
    pub kind: MotionKind,
}

impl Motion {
    pub fn new(id: MotionId, author: UserId, created: Timestamp, kind: MotionKind) -> Self {
        Self {
            id,
            author,
            created,
            votes: Votes::default(),
            expiry: None,
            kind,
        }
    }

    /// True while the motion is up for vote.
    pub fn in_consideration(&self) -> bool {
        self.expiry.is_some()
    }

    /// Promotes the motion to "in consideration" with the given deadline.
    pub fn start_voting(&mut self, now: Timestamp, window_secs: u64) {
        self.votes.clear();
        self.expiry = Some(now + window_secs);
    }

    /// Aborts voting: votes and deadline cleared, motion stays queued.
    pub fn cancel_voting(&mut self) {
        self.votes.clear();
        self.expiry = None;
    }

    /// A motion may close once every seated juror has voted or the deadline
    /// has passed, whichever comes first.
    pub fn ready_to_close(&self, jury_pool_size: usize, now: Timestamp) -> bool {
        if self.votes.total() >= jury_pool_size {
            return true;
        }
        matches!(self.expiry, Some(expiry) if now > expiry)
    }

    /// A strict Yes majority passes; a tie fails.
    pub fn passed(&self) -> bool {
        self.votes.yes.len() > self.votes.no.len()
    }

    /// Structured state snapshot for the audit log.
    pub fn audit_payload(&self) -> serde_json::Value {
        json!({
            "motion_id": &self.id,
            "author": self.author,
            "created": self.created,
            "kind": &self.kind,
            "votes_yes": &self.votes.yes,
            "votes_no": &self.votes.no,
            "expiry": self.expiry,
        })
    }
}
