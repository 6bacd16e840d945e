//! Sanction descriptors carried by a case.
//!
//! A penalty is pure data until verdict time; execution is an explicit call
//! made by the service through the moderation gateway and the sentence
//! executor, never a side effect of deserialization or queue handling.

use serde::{Deserialize, Serialize};

/// A sanction a guilty verdict carries.
///
/// Closed set; deserialization is the derived tag match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Penalty {
    /// An administrative note against the defense, no role change.
    Warning { note: String },
    /// A platform-level permanent ban.
    PermanentBan { reason: String },
    /// A timed mute served through the warden ledger.
    ///
    /// `len_seconds <= 0` denotes an indefinite sentence.
    Prison { len_seconds: i64 },
}

impl Penalty {
    /// Human-readable description of this sanction.
    pub fn describe(&self) -> String {
        match self {
            Penalty::Warning { note } => format!("warning: {note}"),
            Penalty::PermanentBan { reason } => format!("permanent ban: {reason}"),
            Penalty::Prison { len_seconds } if *len_seconds <= 0 => {
                "indefinite prison sentence".to_string()
            }
            Penalty::Prison { len_seconds } => {
                format!("prison sentence of {}", describe_duration(*len_seconds as u64))
            }
        }
    }

    /// Describes a whole penalty set, "no penalty" when empty.
    pub fn describe_set(set: &[Penalty]) -> String {
        if set.is_empty() {
            return "no penalty".to_string();
        }
        set.iter()
            .map(Penalty::describe)
            .collect::<Vec<_>>()
            .join("; ")
    }
}

fn describe_duration(secs: u64) -> String {
    if secs >= 86_400 && secs % 86_400 == 0 {
        format!("{} day(s)", secs / 86_400)
    } else if secs >= 3_600 && secs % 3_600 == 0 {
        format!("{} hour(s)", secs / 3_600)
    } else if secs >= 60 && secs % 60 == 0 {
        format!("{} minute(s)", secs / 60)
    } else {
        format!("{secs} second(s)")
    }
}
