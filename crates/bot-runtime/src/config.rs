//! Runtime configuration.
//!
//! Plain structs with sane defaults; a handful of environment variables
//! override the interesting knobs at startup.

use gavel_casemanager::CourtConfig;
use gavel_warden::WardenConfig;
use shared_types::{ChannelId, RoleId};
use std::path::PathBuf;
use tracing::warn;

/// Complete runtime configuration.
#[derive(Clone, Debug)]
pub struct BotConfig {
    /// Data directory for the JSON file store; `None` keeps everything in
    /// memory (development and tests).
    pub data_dir: Option<PathBuf>,
    /// Case registry tick interval.
    pub case_tick_secs: u64,
    /// Warden ledger tick interval.
    pub warden_tick_secs: u64,
    pub court: CourtConfig,
    pub warden: WardenConfig,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            case_tick_secs: 900,
            warden_tick_secs: 60,
            court: CourtConfig::default(),
            warden: WardenConfig {
                mute_role: RoleId(0),
            },
        }
    }
}

impl BotConfig {
    /// Loads defaults and applies environment overrides.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(dir) = std::env::var("GAVEL_DATA_DIR") {
            config.data_dir = Some(PathBuf::from(dir));
        }
        if let Some(secs) = parse_env("GAVEL_CASE_TICK_SECS") {
            config.case_tick_secs = secs;
        }
        if let Some(secs) = parse_env("GAVEL_WARDEN_TICK_SECS") {
            config.warden_tick_secs = secs;
        }
        if let Some(id) = parse_env("GAVEL_NEWS_CHANNEL") {
            config.court.news_channel = Some(ChannelId(id));
        }
        if let Some(id) = parse_env("GAVEL_MUTE_ROLE") {
            config.warden.mute_role = RoleId(id);
        }
        if let Some(id) = parse_env("GAVEL_JURY_BAN_ROLE") {
            config.court.eligibility.jury_ban_role = Some(RoleId(id));
        }

        config
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!("ignoring unparseable {key}={raw}");
            None
        }
    }
}
