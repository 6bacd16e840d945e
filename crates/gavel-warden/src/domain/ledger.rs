//! Warrants and the per-user reconciliation step.
//!
//! The ledger answers two separate questions: "why is this user muted"
//! (the warrant list, possibly several concurrent reasons) and "is this user
//! currently muted" (one boolean, recomputed from the set every heartbeat).
//! Issuers only ever append; reconciliation owns every transition.

use serde::{Deserialize, Serialize};
use shared_types::{RoleId, Timestamp, UserId};

/// `len_seconds` value denoting a stay: the warrant never activates a timer
/// but still counts toward enforcement while enforceable.
pub const STAY: i64 = -1;

/// One independent mute order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warrant {
    /// UUID v4.
    pub id: String,
    /// Issuing subsystem, e.g. "case" or "manual".
    pub category: String,
    pub description: String,
    /// Who ordered the mute.
    pub author: UserId,
    pub created: Timestamp,
    /// When the warrant's timer began, if it has.
    pub started: Option<Timestamp>,
    /// Non-null exactly while this warrant is the active one.
    pub expires: Option<Timestamp>,
    /// Sentence length; negative denotes a stay (see [`STAY`]).
    pub len_seconds: i64,
    /// Enforcement suspended, accounting kept (e.g. pending appeal).
    pub frozen: bool,
    /// Counted but never enforced.
    pub no_enforce: bool,
}

impl Warrant {
    pub fn new(
        id: String,
        category: String,
        description: String,
        author: UserId,
        len_seconds: i64,
        created: Timestamp,
    ) -> Self {
        Self {
            id,
            category,
            description,
            author,
            created,
            started: None,
            expires: None,
            len_seconds,
            frozen: false,
            no_enforce: false,
        }
    }

    pub fn is_stay(&self) -> bool {
        self.len_seconds < 0
    }

    /// Active means the timer is running.
    pub fn is_active(&self) -> bool {
        self.expires.is_some()
    }

    /// Counts toward "should be muted".
    pub fn enforceable(&self) -> bool {
        !self.frozen && !self.no_enforce
    }

    /// May have its timer started: enforceable, finite, not yet running.
    pub fn eligible_for_activation(&self) -> bool {
        self.enforceable() && !self.is_stay() && !self.is_active()
    }

    fn activate(&mut self, now: Timestamp) {
        self.started = Some(now);
        self.expires = Some(now + self.len_seconds.max(0) as u64);
    }
}

/// What one reconciliation step did.
#[derive(Debug, Default)]
pub struct LedgerStep {
    /// Warrants dropped because their timer ran out.
    pub expired: Vec<Warrant>,
    /// Id of the warrant whose timer was started this step.
    pub activated: Option<String>,
    /// Whether any enforceable warrant remains.
    pub should_be_muted: bool,
}

/// Per-user aggregate reconciling all warrants into one mute state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Prisoner {
    pub user_id: UserId,
    /// Ordered; the next eligible warrant activates first.
    pub warrants: Vec<Warrant>,
    /// Role snapshot taken at booking, restored at release.
    pub roles: Vec<RoleId>,
    /// When the user was first booked.
    pub committed: Timestamp,
    /// Mute currently applied.
    pub booked: bool,
}

impl Prisoner {
    pub fn new(user_id: UserId, now: Timestamp) -> Self {
        Self {
            user_id,
            warrants: Vec::new(),
            roles: Vec::new(),
            committed: now,
            booked: false,
        }
    }

    /// One reconciliation step:
    ///
    /// 1. drop warrants whose `expires` has passed,
    /// 2. if no warrant is active, start the timer on the next eligible one,
    /// 3. recompute whether the user should be muted.
    ///
    /// Booking I/O (role snapshot and swap) belongs to the service; the
    /// aggregate only reports `should_be_muted`.
    pub fn heartbeat(&mut self, now: Timestamp) -> LedgerStep {
        let mut step = LedgerStep::default();

        let mut kept = Vec::with_capacity(self.warrants.len());
        for warrant in self.warrants.drain(..) {
            if matches!(warrant.expires, Some(e) if now > e) {
                step.expired.push(warrant);
            } else {
                kept.push(warrant);
            }
        }
        self.warrants = kept;

        if !self.warrants.iter().any(Warrant::is_active) {
            if let Some(next) = self
                .warrants
                .iter_mut()
                .find(|w| w.eligible_for_activation())
            {
                next.activate(now);
                step.activated = Some(next.id.clone());
            }
        }

        step.should_be_muted = self.warrants.iter().any(Warrant::enforceable);
        step
    }

    /// Applies the booking snapshot.
    pub fn book(&mut self, snapshot: Vec<RoleId>, now: Timestamp) {
        self.roles = snapshot;
        self.booked = true;
        self.committed = now;
    }

    /// Clears the booking, handing back the snapshot to restore.
    pub fn release_roles(&mut self) -> Vec<RoleId> {
        self.booked = false;
        std::mem::take(&mut self.roles)
    }

    /// Empty ledger, nothing to restore: the record can be deleted.
    pub fn archivable(&self) -> bool {
        self.warrants.is_empty() && self.roles.is_empty() && !self.booked
    }

    pub fn warrant(&self, id: &str) -> Option<&Warrant> {
        self.warrants.iter().find(|w| w.id == id)
    }

    pub fn warrant_mut(&mut self, id: &str) -> Option<&mut Warrant> {
        self.warrants.iter_mut().find(|w| w.id == id)
    }

    pub fn remove_warrant(&mut self, id: &str) -> Option<Warrant> {
        let idx = self.warrants.iter().position(|w| w.id == id)?;
        Some(self.warrants.remove(idx))
    }
}
