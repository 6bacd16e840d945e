//! Jury eligibility filtering.
//!
//! The candidate pool is every guild member who is recently active, has a
//! meaningful message history, and has no stake in or power over the outcome.
//! Party disqualification is global: being plaintiff or defense of *any*
//! active case excludes a member from *every* jury.

use crate::domain::case::Case;
use shared_types::ports::MemberProfile;
use shared_types::{RoleId, Timestamp, UserId};
use std::collections::HashSet;

/// Thresholds and role exclusions for jury candidacy.
#[derive(Clone, Debug)]
pub struct EligibilityCriteria {
    /// Members inactive longer than this are skipped.
    pub activity_window_secs: u64,
    /// Minimum recorded message count (strictly greater than).
    pub min_messages: u64,
    /// Members holding this role are barred from jury duty.
    pub jury_ban_role: Option<RoleId>,
    /// Additional roles that disqualify (e.g. moderators).
    pub disqualifying_roles: Vec<RoleId>,
}

impl Default for EligibilityCriteria {
    fn default() -> Self {
        Self {
            activity_window_secs: 14 * 86_400,
            min_messages: 100,
            jury_ban_role: None,
            disqualifying_roles: Vec::new(),
        }
    }
}

/// Filters the member list down to jurors eligible for `case`.
///
/// `disqualified_parties` is the plaintiff/defense set across all active
/// cases, including this one.
pub fn eligible_jurors(
    profiles: &[MemberProfile],
    case: &Case,
    disqualified_parties: &HashSet<UserId>,
    criteria: &EligibilityCriteria,
    now: Timestamp,
) -> Vec<UserId> {
    profiles
        .iter()
        .filter(|p| now.saturating_sub(p.last_active) <= criteria.activity_window_secs)
        .filter(|p| p.message_count > criteria.min_messages)
        .filter(|p| !matches!(criteria.jury_ban_role, Some(r) if p.has_role(r)))
        .filter(|p| !case.jury_pool.contains(&p.user_id))
        .filter(|p| !case.jury_invites.contains(&p.user_id))
        .filter(|p| !disqualified_parties.contains(&p.user_id))
        .filter(|p| !p.is_administrator && !p.can_ban_members)
        .filter(|p| !criteria.disqualifying_roles.iter().any(|r| p.has_role(*r)))
        .map(|p| p.user_id)
        .collect()
}
