//! The case aggregate and its stage state machine.
//!
//! ## Stage machine
//!
//! ```text
//! [1 Jury Selection] ──pool ≥ floor──→ [2 Argumentation] ──close──→ [3 Closed]
//!          ↑                                   │
//!          └───────── pool < floor ────────────┘   (all voting cancelled)
//! ```
//!
//! Transitions are evaluated on every heartbeat. Stage 3 is terminal.
//!
//! The aggregate owns its motions, evidence, penalties, and event log by
//! value; party and juror identities are raw ids resolved on demand by the
//! service layer. All methods here are synchronous and side-effect free
//! outside the aggregate itself: the service holds the case mutex, applies a
//! mutation, persists, and announces the returned events.

use crate::domain::errors::{CourtError, Result};
use crate::domain::events::{Audiences, CaseEvent, EventKind};
use crate::domain::evidence::Evidence;
use crate::domain::motion::{Motion, MotionKind};
use crate::domain::penalty::Penalty;
use serde::{Deserialize, Serialize};
use serde_json::json;
use shared_types::ids::{evidence_id, motion_id};
use shared_types::{CaseId, EvidenceId, MotionId, Timestamp, UserId};
use std::collections::{BTreeMap, BTreeSet};

/// Tunable case rules. The jury floor and vote window have fixed defaults;
/// the config layer may widen the window for slow communities.
#[derive(Clone, Copy, Debug)]
pub struct CaseRules {
    /// Minimum seated jurors for the case to proceed past jury selection.
    pub jury_floor: usize,
    /// Voting deadline applied at `start_voting`.
    pub vote_window_secs: u64,
}

impl Default for CaseRules {
    fn default() -> Self {
        Self {
            jury_floor: 5,
            vote_window_secs: 86_400,
        }
    }
}

/// Case stage. Persisted as its integer value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum CaseStage {
    JurySelection,
    Argumentation,
    Closed,
}

impl CaseStage {
    pub fn as_u8(self) -> u8 {
        match self {
            CaseStage::JurySelection => 1,
            CaseStage::Argumentation => 2,
            CaseStage::Closed => 3,
        }
    }

    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            1 => Some(CaseStage::JurySelection),
            2 => Some(CaseStage::Argumentation),
            3 => Some(CaseStage::Closed),
            _ => None,
        }
    }
}

impl std::fmt::Display for CaseStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CaseStage::JurySelection => "Jury Selection",
            CaseStage::Argumentation => "Argumentation",
            CaseStage::Closed => "Closed",
        };
        write!(f, "{name}")
    }
}

impl Serialize for CaseStage {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.as_u8())
    }
}

impl<'de> Deserialize<'de> for CaseStage {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let v = u8::deserialize(deserializer)?;
        CaseStage::from_u8(v)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid case stage {v}")))
    }
}

/// Outcome a closing case records.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Guilty,
    Dismissed,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Guilty => write!(f, "guilty"),
            Verdict::Dismissed => write!(f, "dismissed"),
        }
    }
}

/// A pending settlement offer from the plaintiff.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PleaDeal {
    pub penalties: Vec<Penalty>,
    pub offered_at: Timestamp,
    /// Offer lapses once this passes; checked on heartbeat.
    pub expires: Option<Timestamp>,
}

/// A party's free-form statement on the record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PersonalStatement {
    pub author: UserId,
    pub text: String,
    pub created: Timestamp,
}

/// One juror deliberation message.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub author: UserId,
    pub text: String,
    pub created: Timestamp,
}

/// A user's relationship to this case; tags evidence ids.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PartyRole {
    Plaintiff,
    Defense,
    Juror,
    Other,
}

impl PartyRole {
    pub fn tag(self) -> char {
        match self {
            PartyRole::Plaintiff => 'P',
            PartyRole::Defense => 'D',
            PartyRole::Juror => 'J',
            PartyRole::Other => 'N',
        }
    }
}

/// What a heartbeat did, and whether the service should recruit.
#[derive(Debug, Default)]
pub struct HeartbeatOutcome {
    pub events: Vec<CaseEvent>,
    /// Set when the pool is below the floor and invitations should go out.
    pub needs_invites: bool,
}

/// The aggregate root for one filed dispute.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Case {
    pub id: CaseId,
    pub title: String,
    pub description: String,
    /// Display string, updated on stage transitions.
    pub status: String,
    pub stage: CaseStage,
    pub created: Timestamp,
    pub plaintiff: UserId,
    pub defense: UserId,
    /// Append-only audit log.
    pub event_log: Vec<CaseEvent>,
    /// Head is the next (or active) motion.
    pub motion_queue: Vec<Motion>,
    /// Strictly increasing; never reused after removal.
    pub motion_counter: u64,
    pub jury_pool: BTreeSet<UserId>,
    pub jury_invites: BTreeSet<UserId>,
    pub personal_statements: Vec<PersonalStatement>,
    pub evidence: Vec<Evidence>,
    pub evidence_counter: u64,
    /// Current sanction set, executed on a guilty close.
    pub penalties: Vec<Penalty>,
    pub plea_deal: Option<PleaDeal>,
    /// Display name snapshots taken when users touch the case.
    pub known_users: BTreeMap<UserId, String>,
    /// Pseudonyms used on the public news wire.
    pub anonymization: BTreeMap<UserId, String>,
    pub juror_counter: u64,
    pub juror_chat_log: Vec<ChatMessage>,
    /// Freezes all heartbeat logic unconditionally.
    pub no_tick: bool,
}

impl Case {
    /// Creates a freshly filed case with its `case_filed` event recorded.
    ///
    /// Registration in the active-case registry and persistence are the
    /// service's responsibility.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: CaseId,
        title: String,
        description: String,
        plaintiff: UserId,
        defense: UserId,
        plaintiff_name: String,
        defense_name: String,
        now: Timestamp,
    ) -> Self {
        let mut known_users = BTreeMap::new();
        known_users.insert(plaintiff, plaintiff_name);
        known_users.insert(defense, defense_name);

        let mut anonymization = BTreeMap::new();
        anonymization.insert(plaintiff, "the plaintiff".to_string());
        anonymization.insert(defense, "the defendant".to_string());

        let mut case = Self {
            id: id.clone(),
            title: title.clone(),
            description,
            status: "Jury Selection - recruiting jurors".to_string(),
            stage: CaseStage::JurySelection,
            created: now,
            plaintiff,
            defense,
            event_log: Vec::new(),
            motion_queue: Vec::new(),
            motion_counter: 0,
            jury_pool: BTreeSet::new(),
            jury_invites: BTreeSet::new(),
            personal_statements: Vec::new(),
            evidence: Vec::new(),
            evidence_counter: 0,
            penalties: Vec::new(),
            plea_deal: None,
            known_users,
            anonymization,
            juror_counter: 0,
            juror_chat_log: Vec::new(),
            no_tick: false,
        };

        let summary = format!(
            "case {id} filed: {title} ({} v. {})",
            case.display_name(plaintiff),
            case.display_name(defense),
        );
        let public = format!("case {id} filed: {title}");
        let ev = CaseEvent::new(
            EventKind::CaseFiled,
            now,
            summary,
            json!({ "case_id": id, "plaintiff": plaintiff, "defense": defense }),
            Audiences::ALL,
        )
        .with_public_summary(public);
        case.record(ev);
        case
    }

    // ------------------------------------------------------------------
    // Identity helpers
    // ------------------------------------------------------------------

    pub fn party_role(&self, user: UserId) -> PartyRole {
        if user == self.plaintiff {
            PartyRole::Plaintiff
        } else if user == self.defense {
            PartyRole::Defense
        } else if self.jury_pool.contains(&user) {
            PartyRole::Juror
        } else {
            PartyRole::Other
        }
    }

    pub fn is_party(&self, user: UserId) -> bool {
        user == self.plaintiff || user == self.defense
    }

    pub fn is_juror(&self, user: UserId) -> bool {
        self.jury_pool.contains(&user)
    }

    /// Snapshotted display name, falling back to the raw id.
    pub fn display_name(&self, user: UserId) -> String {
        self.known_users
            .get(&user)
            .cloned()
            .unwrap_or_else(|| format!("user {user}"))
    }

    /// News-wire pseudonym.
    pub fn anonymous_name(&self, user: UserId) -> String {
        self.anonymization
            .get(&user)
            .cloned()
            .unwrap_or_else(|| "a community member".to_string())
    }

    /// Appends to the audit log and returns a copy for announcement.
    fn record(&mut self, event: CaseEvent) -> CaseEvent {
        self.event_log.push(event.clone());
        event
    }

    // ------------------------------------------------------------------
    // Motion queue
    // ------------------------------------------------------------------

    /// The motion currently up for vote, if any. Always the queue head.
    pub fn motion_in_consideration(&self) -> Option<&Motion> {
        self.motion_queue.first().filter(|m| m.in_consideration())
    }

    fn motion_index(&self, id: &str) -> Option<usize> {
        self.motion_queue.iter().position(|m| m.id == id)
    }

    /// Files a motion into the queue.
    ///
    /// Rush and batch motions validate their referenced ids at construction
    /// time and fail fast when one is missing. Insertion position depends on
    /// the subtype: rush motions take the head (cancelling all voting), batch
    /// motions splice in ahead of the earliest motion they reference, and
    /// everything else joins the tail.
    pub fn file_motion(
        &mut self,
        author: UserId,
        author_name: String,
        kind: MotionKind,
        now: Timestamp,
    ) -> Result<(MotionId, Vec<CaseEvent>)> {
        if self.stage == CaseStage::Closed {
            return Err(CourtError::InvalidState(
                "the case is closed; no further motions can be filed".into(),
            ));
        }
        if !self.is_party(author) && !self.is_juror(author) {
            return Err(CourtError::NotAuthorized {
                required: "a party to the case or a seated juror".into(),
            });
        }

        let mut events = Vec::new();
        let insert_at = match &kind {
            MotionKind::Rush { rushed_motion_id } => {
                if self.motion_index(rushed_motion_id).is_none() {
                    return Err(CourtError::MotionNotFound(rushed_motion_id.clone()));
                }
                events.extend(self.cancel_all_voting("a rush motion was filed", now));
                0
            }
            MotionKind::BatchVote { pass, deny } => {
                if pass.iter().any(|id| deny.contains(id)) {
                    return Err(CourtError::InvalidState(
                        "a motion id cannot appear on both the pass and deny lists".into(),
                    ));
                }
                if pass.is_empty() && deny.is_empty() {
                    return Err(CourtError::InvalidState(
                        "a batch vote must reference at least one motion".into(),
                    ));
                }
                let mut earliest = None;
                for id in pass.iter().chain(deny.iter()) {
                    match self.motion_index(id) {
                        None => return Err(CourtError::MotionNotFound(id.clone())),
                        Some(idx) => {
                            earliest = Some(earliest.map_or(idx, |e: usize| e.min(idx)));
                        }
                    }
                }
                let idx = earliest.unwrap_or(self.motion_queue.len());
                if idx == 0 {
                    if let Some(ev) =
                        self.cancel_voting_at(0, "a batch vote was filed ahead of it", now)
                    {
                        events.push(ev);
                    }
                }
                idx
            }
            _ => self.motion_queue.len(),
        };

        self.motion_counter += 1;
        let id = motion_id(&self.id, self.motion_counter);
        self.known_users.entry(author).or_insert(author_name);
        let motion = Motion::new(id.clone(), author, now, kind);

        let summary = format!(
            "{} {} proposed by {}",
            motion.kind.label(),
            id,
            self.display_name(author),
        );
        let public = format!(
            "{} {} proposed by {}",
            motion.kind.label(),
            id,
            self.anonymous_name(author),
        );
        let ev = CaseEvent::new(
            EventKind::MotionProposed,
            now,
            summary,
            motion.audit_payload(),
            Audiences::ALL,
        )
        .with_public_summary(public);
        events.push(self.record(ev));

        self.motion_queue.insert(insert_at, motion);
        Ok((id, events))
    }

    /// Puts the queue head up for vote.
    pub fn start_voting_head(&mut self, now: Timestamp, rules: &CaseRules) -> Vec<CaseEvent> {
        let Some(motion) = self.motion_queue.first_mut() else {
            return Vec::new();
        };
        motion.start_voting(now, rules.vote_window_secs);
        let id = motion.id.clone();
        let label = motion.kind.label();
        let expiry = motion.expiry;
        let ev = CaseEvent::new(
            EventKind::VotingStarted,
            now,
            format!("{label} {id} is now in consideration; jurors have 24 hours to vote"),
            json!({ "motion_id": id, "expiry": expiry }),
            Audiences::ALL,
        );
        vec![self.record(ev)]
    }

    fn cancel_voting_at(
        &mut self,
        idx: usize,
        reason: &str,
        now: Timestamp,
    ) -> Option<CaseEvent> {
        let motion = self.motion_queue.get_mut(idx)?;
        if !motion.in_consideration() {
            return None;
        }
        motion.cancel_voting();
        let id = motion.id.clone();
        let ev = CaseEvent::new(
            EventKind::VotingCancelled,
            now,
            format!("voting on motion {id} was cancelled: {reason}"),
            json!({ "motion_id": id, "reason": reason }),
            Audiences::INTERNAL,
        );
        Some(self.record(ev))
    }

    /// Cancels voting on every queued motion. Votes are cleared, deadlines
    /// dropped, queue order untouched.
    pub fn cancel_all_voting(&mut self, reason: &str, now: Timestamp) -> Vec<CaseEvent> {
        (0..self.motion_queue.len())
            .filter_map(|idx| self.cancel_voting_at(idx, reason, now))
            .collect()
    }

    /// Records a juror's ballot on the motion in consideration.
    pub fn cast_vote(
        &mut self,
        juror: UserId,
        in_favor: bool,
        now: Timestamp,
    ) -> Result<Vec<CaseEvent>> {
        if !self.is_juror(juror) {
            return Err(CourtError::NotAuthorized {
                required: "a seated juror on this case".into(),
            });
        }
        let Some(motion) = self.motion_queue.first_mut().filter(|m| m.in_consideration()) else {
            return Err(CourtError::InvalidState(
                "no motion is currently up for vote".into(),
            ));
        };
        if motion.votes.has_voted(juror) {
            return Err(CourtError::InvalidState(
                "you have already voted on this motion".into(),
            ));
        }
        motion.votes.cast(juror, in_favor);
        let id = motion.id.clone();
        let (yes, no) = (motion.votes.yes.len(), motion.votes.no.len());
        let ev = CaseEvent::new(
            EventKind::VoteCast,
            now,
            format!("a ballot was cast on motion {id} ({yes} yes / {no} no so far)"),
            json!({ "motion_id": id, "yes": yes, "no": no }),
            Audiences::JURY,
        );
        Ok(vec![self.record(ev)])
    }

    /// Closes the motion in consideration: tallies, records the resolution,
    /// removes it from the queue, and executes it if it passed.
    ///
    /// Returns `None` when no motion is in consideration.
    pub fn close_head_motion(
        &mut self,
        now: Timestamp,
        rules: &CaseRules,
    ) -> Option<(bool, Vec<CaseEvent>)> {
        if self.motion_in_consideration().is_none() {
            return None;
        }
        let motion = self.motion_queue.remove(0);
        let passed = motion.passed();
        let mut events = vec![self.resolution_event(&motion, passed, "by jury vote", now)];
        if passed {
            events.extend(self.execute_motion(&motion, now, rules));
        }
        Some((passed, events))
    }

    /// Removes a motion without executing it (deny-list handling, manual
    /// withdrawal). Votes are discarded.
    pub fn force_close_motion(&mut self, id: &str, reason: &str, now: Timestamp) -> Result<Vec<CaseEvent>> {
        let idx = self
            .motion_index(id)
            .ok_or_else(|| CourtError::MotionNotFound(id.to_string()))?;
        let motion = self.motion_queue.remove(idx);
        Ok(vec![self.resolution_event(&motion, false, reason, now)])
    }

    fn resolution_event(
        &mut self,
        motion: &Motion,
        passed: bool,
        how: &str,
        now: Timestamp,
    ) -> CaseEvent {
        let outcome = if passed { "passed" } else { "failed" };
        let ev = CaseEvent::new(
            EventKind::MotionResolved,
            now,
            format!(
                "{} {} {} {} ({} yes / {} no)",
                motion.kind.label(),
                motion.id,
                outcome,
                how,
                motion.votes.yes.len(),
                motion.votes.no.len(),
            ),
            json!({ "motion": motion.audit_payload(), "passed": passed, "how": how }),
            Audiences::ALL,
        );
        self.record(ev)
    }

    /// Applies a passed motion's side effect.
    pub fn execute_motion(
        &mut self,
        motion: &Motion,
        now: Timestamp,
        rules: &CaseRules,
    ) -> Vec<CaseEvent> {
        let mut events = Vec::new();
        match &motion.kind {
            MotionKind::Statement { text } => {
                let ev = CaseEvent::new(
                    EventKind::StatementIssued,
                    now,
                    format!("official case statement: {text}"),
                    json!({ "motion_id": &motion.id, "text": text }),
                    Audiences::ALL,
                );
                events.push(self.record(ev));
            }
            MotionKind::Order { target, directive } => {
                let summary = format!(
                    "the court orders {}: {directive}",
                    self.display_name(*target)
                );
                let public = format!(
                    "the court orders {}: {directive}",
                    self.anonymous_name(*target)
                );
                let ev = CaseEvent::new(
                    EventKind::OrderIssued,
                    now,
                    summary,
                    json!({ "motion_id": &motion.id, "target": target, "directive": directive }),
                    Audiences::ALL,
                )
                .with_public_summary(public);
                events.push(self.record(ev));
            }
            MotionKind::Rush { rushed_motion_id } => {
                match self.motion_index(rushed_motion_id) {
                    Some(idx) => {
                        let rushed = self.motion_queue.remove(idx);
                        events.extend(
                            self.cancel_all_voting("the queue was reordered by a rush", now),
                        );
                        self.motion_queue.insert(0, rushed);
                        events.extend(self.start_voting_head(now, rules));
                    }
                    None => {
                        // Validated at filing, but a batch may have resolved it since.
                        let ev = CaseEvent::new(
                            EventKind::AdministrativeNote,
                            now,
                            format!(
                                "rush motion {} had no effect: motion {rushed_motion_id} no longer exists",
                                motion.id
                            ),
                            json!({ "motion_id": &motion.id, "missing": rushed_motion_id }),
                            Audiences::INTERNAL,
                        );
                        events.push(self.record(ev));
                    }
                }
            }
            MotionKind::BatchVote { pass, deny } => {
                let mut not_found = Vec::new();
                for id in pass {
                    match self.motion_index(id) {
                        Some(idx) => {
                            let target = self.motion_queue.remove(idx);
                            events.push(self.resolution_event(
                                &target,
                                true,
                                &format!("by batch vote {}", motion.id),
                                now,
                            ));
                            events.extend(self.execute_motion(&target, now, rules));
                        }
                        None => not_found.push(id.clone()),
                    }
                }
                for id in deny {
                    match self.motion_index(id) {
                        Some(idx) => {
                            let target = self.motion_queue.remove(idx);
                            events.push(self.resolution_event(
                                &target,
                                false,
                                &format!("by batch vote {}", motion.id),
                                now,
                            ));
                        }
                        None => not_found.push(id.clone()),
                    }
                }
                if !not_found.is_empty() {
                    let ev = CaseEvent::new(
                        EventKind::AdministrativeNote,
                        now,
                        format!(
                            "batch vote {} could not resolve {} motion(s): {}",
                            motion.id,
                            not_found.len(),
                            not_found.join(", "),
                        ),
                        json!({ "motion_id": &motion.id, "not_found": not_found }),
                        Audiences::INTERNAL,
                    );
                    events.push(self.record(ev));
                }
            }
            MotionKind::AdjustPenalty { new_penalties } => {
                let before = Penalty::describe_set(&self.penalties);
                let after = Penalty::describe_set(new_penalties);
                self.penalties = new_penalties.clone();
                let ev = CaseEvent::new(
                    EventKind::PenaltiesAdjusted,
                    now,
                    format!("the penalty was adjusted from [{before}] to [{after}]"),
                    json!({ "motion_id": &motion.id, "before": before, "after": after }),
                    Audiences::ALL,
                );
                events.push(self.record(ev));
            }
        }
        events
    }

    // ------------------------------------------------------------------
    // Jury
    // ------------------------------------------------------------------

    /// Records invitations sent to candidate jurors.
    pub fn add_invites(&mut self, users: &[UserId], now: Timestamp) -> Vec<CaseEvent> {
        let mut events = Vec::new();
        for user in users {
            if self.jury_invites.insert(*user) {
                let ev = CaseEvent::new(
                    EventKind::JurorInvited,
                    now,
                    format!("a jury invitation was extended for case {}", self.id),
                    json!({ "user": user }),
                    Audiences::SILENT,
                );
                events.push(self.record(ev));
            }
        }
        events
    }

    /// Seats an invited juror.
    pub fn join_jury(
        &mut self,
        user: UserId,
        display_name: String,
        now: Timestamp,
    ) -> Result<Vec<CaseEvent>> {
        if self.stage == CaseStage::Closed {
            return Err(CourtError::InvalidState("the case is closed".into()));
        }
        if self.is_party(user) {
            return Err(CourtError::NotAuthorized {
                required: "a non-party (parties cannot sit on their own jury)".into(),
            });
        }
        if self.jury_pool.contains(&user) {
            return Err(CourtError::InvalidState(
                "you are already seated on this jury".into(),
            ));
        }
        if !self.jury_invites.remove(&user) {
            return Err(CourtError::InvalidState(
                "you have not been invited to this jury".into(),
            ));
        }
        self.jury_pool.insert(user);
        self.juror_counter += 1;
        self.known_users.insert(user, display_name);
        self.anonymization
            .insert(user, format!("Juror #{}", self.juror_counter));
        let ev = CaseEvent::new(
            EventKind::JurorJoined,
            now,
            format!(
                "{} was seated on the jury ({} juror(s) seated)",
                self.anonymous_name(user),
                self.jury_pool.len(),
            ),
            json!({ "user": user, "pool_size": self.jury_pool.len() }),
            Audiences::ALL,
        );
        Ok(vec![self.record(ev)])
    }

    /// Removes a seated juror.
    pub fn leave_jury(&mut self, user: UserId, reason: &str, now: Timestamp) -> Result<Vec<CaseEvent>> {
        if !self.jury_pool.remove(&user) {
            return Err(CourtError::InvalidState(
                "you are not seated on this jury".into(),
            ));
        }
        let ev = CaseEvent::new(
            EventKind::JurorLeft,
            now,
            format!("{} left the jury: {reason}", self.anonymous_name(user)),
            json!({ "user": user, "reason": reason, "pool_size": self.jury_pool.len() }),
            Audiences::INTERNAL,
        );
        Ok(vec![self.record(ev)])
    }

    // ------------------------------------------------------------------
    // Evidence, statements, deliberation
    // ------------------------------------------------------------------

    /// Attaches an uploaded file to the case record.
    pub fn attach_evidence(
        &mut self,
        submitter: UserId,
        filename: String,
        blob_id: String,
        digest: String,
        now: Timestamp,
    ) -> (EvidenceId, Vec<CaseEvent>) {
        self.evidence_counter += 1;
        let role = self.party_role(submitter);
        let id = evidence_id(&self.id, role.tag(), self.evidence_counter);
        self.evidence.push(Evidence {
            id: id.clone(),
            filename: filename.clone(),
            blob_id,
            submitter,
            created: now,
            digest,
            certified: true,
            seals: Vec::new(),
        });
        let ev = CaseEvent::new(
            EventKind::EvidenceSubmitted,
            now,
            format!("evidence {id} ({filename}) was submitted"),
            json!({ "evidence_id": &id, "filename": &filename, "submitter": submitter }),
            Audiences::INTERNAL,
        );
        let events = vec![self.record(ev)];
        (id, events)
    }

    /// Marks evidence as withheld.
    pub fn seal_evidence(
        &mut self,
        id: &str,
        author: UserId,
        description: String,
        now: Timestamp,
    ) -> Result<Vec<CaseEvent>> {
        if !self.is_party(author) && !self.is_juror(author) {
            return Err(CourtError::NotAuthorized {
                required: "a party to the case or a seated juror".into(),
            });
        }
        let item = self
            .evidence
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| CourtError::EvidenceNotFound(id.to_string()))?;
        let seal_id = item.add_seal(description.clone(), author, now);
        let ev = CaseEvent::new(
            EventKind::EvidenceSealed,
            now,
            format!("evidence {id} was sealed (seal {seal_id}): {description}"),
            json!({ "evidence_id": id, "seal_id": seal_id, "author": author }),
            Audiences::INTERNAL,
        );
        Ok(vec![self.record(ev)])
    }

    /// Evidence visible to `viewer`: sealed items are withheld from everyone
    /// but the parties and seated jurors.
    pub fn visible_evidence(&self, viewer: UserId) -> Vec<&Evidence> {
        let privileged = self.is_party(viewer) || self.is_juror(viewer);
        self.evidence
            .iter()
            .filter(|e| privileged || !e.is_sealed())
            .collect()
    }

    /// Files a party's personal statement.
    pub fn add_personal_statement(
        &mut self,
        author: UserId,
        text: String,
        now: Timestamp,
    ) -> Result<Vec<CaseEvent>> {
        if !self.is_party(author) {
            return Err(CourtError::NotAuthorized {
                required: "a party to the case".into(),
            });
        }
        self.personal_statements.push(PersonalStatement {
            author,
            text: text.clone(),
            created: now,
        });
        let summary = format!(
            "personal statement from {}: {text}",
            self.display_name(author)
        );
        let public = format!(
            "personal statement from {}: {text}",
            self.anonymous_name(author)
        );
        let ev = CaseEvent::new(
            EventKind::PersonalStatementFiled,
            now,
            summary,
            json!({ "author": author }),
            Audiences::ALL,
        )
        .with_public_summary(public);
        Ok(vec![self.record(ev)])
    }

    /// Relays a juror deliberation message.
    pub fn add_juror_message(
        &mut self,
        author: UserId,
        text: String,
        now: Timestamp,
    ) -> Result<Vec<CaseEvent>> {
        if !self.is_juror(author) {
            return Err(CourtError::NotAuthorized {
                required: "a seated juror on this case".into(),
            });
        }
        self.juror_chat_log.push(ChatMessage {
            author,
            text: text.clone(),
            created: now,
        });
        let ev = CaseEvent::new(
            EventKind::JurorMessage,
            now,
            format!("{}: {text}", self.anonymous_name(author)),
            json!({ "author": author }),
            Audiences::JURY,
        );
        Ok(vec![self.record(ev)])
    }

    // ------------------------------------------------------------------
    // Plea deals
    // ------------------------------------------------------------------

    /// The plaintiff offers a settlement penalty set.
    pub fn offer_plea(
        &mut self,
        by: UserId,
        penalties: Vec<Penalty>,
        expires: Option<Timestamp>,
        now: Timestamp,
    ) -> Result<Vec<CaseEvent>> {
        if by != self.plaintiff {
            return Err(CourtError::NotAuthorized {
                required: "the plaintiff".into(),
            });
        }
        if self.stage == CaseStage::Closed {
            return Err(CourtError::InvalidState("the case is closed".into()));
        }
        let described = Penalty::describe_set(&penalties);
        self.plea_deal = Some(PleaDeal {
            penalties,
            offered_at: now,
            expires,
        });
        let ev = CaseEvent::new(
            EventKind::PleaOffered,
            now,
            format!("a plea deal was offered: [{described}]"),
            json!({ "penalties": described, "expires": expires }),
            Audiences::PARTIES,
        );
        Ok(vec![self.record(ev)])
    }

    /// The defense accepts: the offered set becomes the active penalty set.
    pub fn accept_plea(&mut self, by: UserId, now: Timestamp) -> Result<Vec<CaseEvent>> {
        if by != self.defense {
            return Err(CourtError::NotAuthorized {
                required: "the defendant".into(),
            });
        }
        let deal = self
            .plea_deal
            .take()
            .ok_or_else(|| CourtError::InvalidState("no plea deal is on the table".into()))?;
        if matches!(deal.expires, Some(e) if now > e) {
            return Err(CourtError::InvalidState("the plea offer has expired".into()));
        }
        let described = Penalty::describe_set(&deal.penalties);
        self.penalties = deal.penalties;
        let ev = CaseEvent::new(
            EventKind::PleaAccepted,
            now,
            format!("the plea deal was accepted; penalty is now [{described}]"),
            json!({ "penalties": described }),
            Audiences::ALL,
        );
        Ok(vec![self.record(ev)])
    }

    /// The defense declines; the offer is withdrawn.
    pub fn decline_plea(&mut self, by: UserId, now: Timestamp) -> Result<Vec<CaseEvent>> {
        if by != self.defense {
            return Err(CourtError::NotAuthorized {
                required: "the defendant".into(),
            });
        }
        if self.plea_deal.take().is_none() {
            return Err(CourtError::InvalidState("no plea deal is on the table".into()));
        }
        let ev = CaseEvent::new(
            EventKind::PleaDeclined,
            now,
            "the plea deal was declined".to_string(),
            json!({}),
            Audiences::PARTIES,
        );
        Ok(vec![self.record(ev)])
    }

    // ------------------------------------------------------------------
    // Heartbeat
    // ------------------------------------------------------------------

    /// Advances the stage machine one step.
    ///
    /// `departed` lists seated jurors the directory no longer resolves; they
    /// are pruned before the floor check. When the pool is short the case
    /// demotes (if needed), asks the service to recruit, and stops - no queue
    /// logic runs on a short-handed tick.
    pub fn heartbeat(
        &mut self,
        now: Timestamp,
        departed: &[UserId],
        rules: &CaseRules,
    ) -> HeartbeatOutcome {
        let mut outcome = HeartbeatOutcome::default();
        if self.no_tick || self.stage == CaseStage::Closed {
            return outcome;
        }

        for user in departed {
            if self.jury_pool.remove(user) {
                self.jury_invites.remove(user);
                let ev = CaseEvent::new(
                    EventKind::JurorLeft,
                    now,
                    format!(
                        "{} was removed from the jury (left the guild)",
                        self.anonymous_name(*user)
                    ),
                    json!({ "user": user, "reason": "left_guild" }),
                    Audiences::INTERNAL,
                );
                outcome.events.push(self.record(ev));
            }
        }

        if self.jury_pool.len() < rules.jury_floor {
            if self.stage == CaseStage::Argumentation {
                self.stage = CaseStage::JurySelection;
                self.status = "Jury Selection - recruiting jurors".to_string();
                let ev = CaseEvent::new(
                    EventKind::StageChanged,
                    now,
                    format!(
                        "the jury fell below {} members; the case returns to jury selection",
                        rules.jury_floor
                    ),
                    json!({ "stage": self.stage.as_u8() }),
                    Audiences::ALL,
                );
                outcome.events.push(self.record(ev));
                outcome
                    .events
                    .extend(self.cancel_all_voting("insufficient jurors", now));
            }
            outcome.needs_invites = true;
            return outcome;
        }

        if self.stage == CaseStage::JurySelection {
            self.stage = CaseStage::Argumentation;
            self.status = "Argumentation - motions before the jury".to_string();
            let ev = CaseEvent::new(
                EventKind::StageChanged,
                now,
                "the jury is seated; the case enters argumentation".to_string(),
                json!({ "stage": self.stage.as_u8() }),
                Audiences::ALL,
            );
            outcome.events.push(self.record(ev));
        }

        if let Some(deal) = &self.plea_deal {
            if matches!(deal.expires, Some(e) if now > e) {
                self.plea_deal = None;
                let ev = CaseEvent::new(
                    EventKind::PleaExpired,
                    now,
                    "the plea offer lapsed without an answer".to_string(),
                    json!({}),
                    Audiences::PARTIES,
                );
                outcome.events.push(self.record(ev));
            }
        }

        if self.stage == CaseStage::Argumentation && !self.motion_queue.is_empty() {
            if self.motion_in_consideration().is_none() {
                outcome.events.extend(self.start_voting_head(now, rules));
            } else if self
                .motion_queue
                .first()
                .is_some_and(|m| m.ready_to_close(self.jury_pool.len(), now))
            {
                if let Some((_, events)) = self.close_head_motion(now, rules) {
                    outcome.events.extend(events);
                }
                if !self.motion_queue.is_empty() && self.motion_in_consideration().is_none() {
                    outcome.events.extend(self.start_voting_head(now, rules));
                }
            }
        }

        outcome
    }

    /// Service-level note on the record (penalty execution, ban failures).
    pub fn administrative_note(
        &mut self,
        summary: String,
        payload: serde_json::Value,
        audiences: Audiences,
        now: Timestamp,
    ) -> CaseEvent {
        let ev = CaseEvent::new(EventKind::AdministrativeNote, now, summary, payload, audiences);
        self.record(ev)
    }

    // ------------------------------------------------------------------
    // Closing
    // ------------------------------------------------------------------

    /// Moves the case to its terminal stage and records the verdict.
    ///
    /// Penalty execution, archive export, and registry removal belong to the
    /// service.
    pub fn close(&mut self, verdict: Verdict, reason: &str, now: Timestamp) -> Vec<CaseEvent> {
        self.stage = CaseStage::Closed;
        self.status = format!("Closed - {verdict}");
        let ev = CaseEvent::new(
            EventKind::CaseClosed,
            now,
            format!("case {} closed ({verdict}): {reason}", self.id),
            json!({ "verdict": verdict, "reason": reason }),
            Audiences::ALL,
        );
        vec![self.record(ev)]
    }
}
