//! Test fixtures: a fully wired service stack over in-memory adapters.

use bot_runtime::adapters::memory::{
    member_profile, InMemoryGuild, MemoryBlobStore, MemoryDocumentStore, RecordingNotifier,
};
use bot_runtime::{BotConfig, ServiceStack};
use gavel_casemanager::ports::CourtApi;
use gavel_casemanager::{CaseManager, CaseStage};
use gavel_warden::Warden;
use shared_types::time::MockTimeSource;
use shared_types::{ChannelId, RoleId, UserId};
use std::sync::Arc;

/// The public news wire channel every harness wires up.
pub const NEWS_CHANNEL: ChannelId = ChannelId(42);
/// The single mute role the warden reconciles onto.
pub const MUTE_ROLE: RoleId = RoleId(999);
/// Harness epoch: an arbitrary fixed instant.
pub const T0: u64 = 1_754_500_000;

pub const PLAINTIFF: UserId = UserId(1);
pub const DEFENSE: UserId = UserId(2);

/// A wired stack plus handles on every fake it is built from.
pub struct Harness {
    pub stack: ServiceStack,
    pub guild: Arc<InMemoryGuild>,
    pub notifier: Arc<RecordingNotifier>,
    pub time: Arc<MockTimeSource>,
    pub store: Arc<MemoryDocumentStore>,
    pub blobs: Arc<MemoryBlobStore>,
}

impl Harness {
    /// Builds a stack over a guild seeded with the two parties and ten
    /// eligible juror candidates (ids 10..=19).
    pub fn new() -> Self {
        let store = Arc::new(MemoryDocumentStore::new());
        let blobs = Arc::new(MemoryBlobStore::new());
        Self::with_store(store, blobs)
    }

    /// Builds a stack over existing stores (restart simulation).
    pub fn with_store(store: Arc<MemoryDocumentStore>, blobs: Arc<MemoryBlobStore>) -> Self {
        let guild = Arc::new(InMemoryGuild::new());
        guild.upsert_member(member_profile(PLAINTIFF.0, "ada", T0, 900));
        guild.upsert_member(member_profile(DEFENSE.0, "bob", T0, 700));
        for id in 10..=19 {
            guild.upsert_member(member_profile(id, &format!("citizen-{id}"), T0, 500));
        }

        let notifier = Arc::new(RecordingNotifier::new());
        let time = Arc::new(MockTimeSource::new(T0));

        let mut config = BotConfig::default();
        config.court.news_channel = Some(NEWS_CHANNEL);
        config.warden.mute_role = MUTE_ROLE;

        let stack = ServiceStack::build(
            &config,
            store.clone(),
            blobs.clone(),
            guild.clone(),
            guild.clone(),
            notifier.clone(),
            time.clone(),
        );
        Self {
            stack,
            guild,
            notifier,
            time,
            store,
            blobs,
        }
    }

    pub fn court(&self) -> &CaseManager {
        &self.stack.casemanager
    }

    pub fn warden(&self) -> &Warden {
        &self.stack.warden
    }

    /// Files a standard case between the seeded parties.
    pub async fn file_case(&self) -> String {
        self.court()
            .file_case(
                "Ada v. Bob".to_string(),
                "a community dispute".to_string(),
                PLAINTIFF,
                DEFENSE,
            )
            .await
            .expect("filing failed")
    }

    /// Ticks and accepts invitations until the jury floor is met and the
    /// case reaches argumentation. Returns the seated jurors.
    pub async fn seat_jury(&self, case_id: &str) -> Vec<UserId> {
        for _ in 0..32 {
            let snapshot = self.court().case_snapshot(case_id).await.unwrap();
            if snapshot.stage == CaseStage::Argumentation {
                return snapshot.jury_pool.iter().copied().collect();
            }
            self.court().tick(case_id).await.unwrap();
            let snapshot = self.court().case_snapshot(case_id).await.unwrap();
            for invitee in snapshot.jury_invites {
                let pool = self
                    .court()
                    .case_snapshot(case_id)
                    .await
                    .unwrap()
                    .jury_pool
                    .len();
                if pool >= 5 {
                    break;
                }
                self.court().join_jury(case_id, invitee).await.unwrap();
            }
        }
        panic!("jury never reached the floor");
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}
