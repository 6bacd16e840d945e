//! Inbound port: the court API the command surface calls.
//!
//! Slash-command handlers are thin adapters over this trait; they validate
//! nothing themselves beyond argument parsing. Every method here enforces its
//! own authorization against the case record.

use crate::domain::{Case, Evidence, MotionKind, Penalty, Result, Verdict};
use async_trait::async_trait;
use shared_types::{CaseId, EvidenceId, MotionId, Timestamp, UserId};

/// Primary API for the case manager subsystem.
#[async_trait]
pub trait CourtApi: Send + Sync {
    /// Files a new case and registers it with the active-case registry.
    async fn file_case(
        &self,
        title: String,
        description: String,
        plaintiff: UserId,
        defense: UserId,
    ) -> Result<CaseId>;

    /// Enqueues a motion; triggers an out-of-cycle tick so voting can start
    /// immediately.
    async fn submit_motion(
        &self,
        case_id: &str,
        author: UserId,
        kind: MotionKind,
    ) -> Result<MotionId>;

    /// Records a juror's ballot on the motion in consideration.
    async fn cast_vote(&self, case_id: &str, juror: UserId, in_favor: bool) -> Result<()>;

    /// Seats an invited juror.
    async fn join_jury(&self, case_id: &str, user: UserId) -> Result<()>;

    /// Removes a seated juror; re-selection begins on the immediate tick.
    async fn leave_jury(&self, case_id: &str, user: UserId) -> Result<()>;

    /// Uploads a file and attaches it to the case record.
    async fn submit_evidence(
        &self,
        case_id: &str,
        submitter: UserId,
        filename: String,
        bytes: Vec<u8>,
    ) -> Result<EvidenceId>;

    /// Marks evidence as withheld.
    async fn seal_evidence(
        &self,
        case_id: &str,
        evidence_id: &str,
        author: UserId,
        description: String,
    ) -> Result<()>;

    /// Evidence visible to `viewer` (sealed items filtered).
    async fn list_evidence(&self, case_id: &str, viewer: UserId) -> Result<Vec<Evidence>>;

    /// Files a party's personal statement.
    async fn submit_personal_statement(
        &self,
        case_id: &str,
        author: UserId,
        text: String,
    ) -> Result<()>;

    /// Posts to the juror deliberation log.
    async fn post_juror_message(&self, case_id: &str, author: UserId, text: String) -> Result<()>;

    /// Plaintiff offers a settlement penalty set.
    async fn offer_plea_deal(
        &self,
        case_id: &str,
        by: UserId,
        penalties: Vec<Penalty>,
        expires: Option<Timestamp>,
    ) -> Result<()>;

    /// Defense accepts the pending offer.
    async fn accept_plea_deal(&self, case_id: &str, by: UserId) -> Result<()>;

    /// Defense declines the pending offer.
    async fn decline_plea_deal(&self, case_id: &str, by: UserId) -> Result<()>;

    /// Freezes or thaws all heartbeat logic for a case.
    async fn set_case_frozen(&self, case_id: &str, frozen: bool) -> Result<()>;

    /// Closes a case: records the verdict, executes penalties when guilty,
    /// archives, and removes the case from the registry.
    async fn close_case(&self, case_id: &str, verdict: Verdict, reason: &str) -> Result<()>;

    /// A point-in-time copy of the case record.
    async fn case_snapshot(&self, case_id: &str) -> Result<Case>;

    /// Ids of all active cases.
    async fn active_case_ids(&self) -> Vec<CaseId>;

    /// Runs one heartbeat for a single case.
    async fn tick(&self, case_id: &str) -> Result<()>;

    /// Runs one heartbeat for every active case.
    async fn tick_all(&self);

    /// Remembers which case a user is currently viewing (cross-restart).
    async fn set_viewing(&self, user: UserId, case_id: Option<CaseId>) -> Result<()>;

    /// The case a user is currently viewing, if any.
    async fn viewing(&self, user: UserId) -> Result<Option<CaseId>>;
}
