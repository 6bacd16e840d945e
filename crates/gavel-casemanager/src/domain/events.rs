//! Case event log entries and announce audiences.
//!
//! The event log is append-only and doubles as the audit trail: every motion
//! records a "proposed" entry at filing and a "resolved" entry at close, each
//! with enough structured payload to reconstruct the motion's state.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared_types::Timestamp;

/// The four independently toggleable announce audiences.
///
/// Delivery failure to any one recipient never aborts delivery to the others.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Audiences {
    pub jury: bool,
    pub defense: bool,
    pub plaintiff: bool,
    pub news_wire: bool,
}

impl Audiences {
    /// Jury, both parties, and the public news wire.
    pub const ALL: Audiences = Audiences {
        jury: true,
        defense: true,
        plaintiff: true,
        news_wire: true,
    };

    /// Jury and both parties, nothing public.
    pub const INTERNAL: Audiences = Audiences {
        jury: true,
        defense: true,
        plaintiff: true,
        news_wire: false,
    };

    /// Seated jurors only (deliberation traffic, vote notices).
    pub const JURY: Audiences = Audiences {
        jury: true,
        defense: false,
        plaintiff: false,
        news_wire: false,
    };

    /// Both parties only (plea negotiation).
    pub const PARTIES: Audiences = Audiences {
        jury: false,
        defense: true,
        plaintiff: true,
        news_wire: false,
    };

    /// Recorded for audit but announced to no one.
    pub const SILENT: Audiences = Audiences {
        jury: false,
        defense: false,
        plaintiff: false,
        news_wire: false,
    };
}

/// What happened.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    CaseFiled,
    StageChanged,
    JurorInvited,
    JurorJoined,
    JurorLeft,
    MotionProposed,
    VotingStarted,
    VotingCancelled,
    VoteCast,
    MotionResolved,
    StatementIssued,
    OrderIssued,
    PenaltiesAdjusted,
    AdministrativeNote,
    EvidenceSubmitted,
    EvidenceSealed,
    PersonalStatementFiled,
    JurorMessage,
    PleaOffered,
    PleaAccepted,
    PleaDeclined,
    PleaExpired,
    CaseClosed,
}

/// One append-only event log entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CaseEvent {
    pub kind: EventKind,
    pub created: Timestamp,
    /// Human-readable line for party and jury delivery.
    pub summary: String,
    /// Anonymized line for the public news wire; falls back to `summary`.
    pub public_summary: Option<String>,
    /// Structured payload for audit reconstruction.
    pub payload: Value,
    pub audiences: Audiences,
}

impl CaseEvent {
    pub fn new(
        kind: EventKind,
        created: Timestamp,
        summary: impl Into<String>,
        payload: Value,
        audiences: Audiences,
    ) -> Self {
        Self {
            kind,
            created,
            summary: summary.into(),
            public_summary: None,
            payload,
            audiences,
        }
    }

    pub fn with_public_summary(mut self, public: impl Into<String>) -> Self {
        self.public_summary = Some(public.into());
        self
    }

    /// The line the news wire receives.
    pub fn public_line(&self) -> &str {
        self.public_summary.as_deref().unwrap_or(&self.summary)
    }
}
