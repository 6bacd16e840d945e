//! Court configuration.

use crate::domain::{CaseRules, EligibilityCriteria};
use shared_types::ChannelId;

/// Tunables for the case manager.
#[derive(Clone, Debug)]
pub struct CourtConfig {
    pub rules: CaseRules,
    pub eligibility: EligibilityCriteria,
    /// Invitations sent per short-handed tick: a random count in
    /// `invite_min..=invite_max`.
    pub invite_min: usize,
    pub invite_max: usize,
    /// Public announcement channel; `None` disables the news wire.
    pub news_channel: Option<ChannelId>,
}

impl Default for CourtConfig {
    fn default() -> Self {
        Self {
            rules: CaseRules::default(),
            eligibility: EligibilityCriteria::default(),
            invite_min: 2,
            invite_max: 3,
            news_channel: None,
        }
    }
}
