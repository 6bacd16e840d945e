//! Service construction.
//!
//! Builds the warden first, wraps it in the sentence executor, then builds
//! the case manager on top. Both registries hydrate from the same document
//! store before the schedulers start.

use crate::adapters::{
    FileBlobStore, InMemoryGuild, JsonFileStore, MemoryBlobStore, MemoryDocumentStore,
    TracingNotifier, WardenSentenceExecutor,
};
use crate::config::BotConfig;
use gavel_casemanager::ports::outbound::Notifier;
use gavel_casemanager::CaseManager;
use gavel_warden::Warden;
use shared_types::ports::{BlobStore, DocumentStore, ModerationGateway, UserDirectory};
use shared_types::{SystemTimeSource, TimeSource};
use std::sync::Arc;
use tracing::info;

/// The wired service graph.
pub struct ServiceStack {
    pub casemanager: Arc<CaseManager>,
    pub warden: Arc<Warden>,
}

impl ServiceStack {
    /// Builds the stack from explicit collaborators. Tests inject fakes here.
    #[allow(clippy::too_many_arguments)]
    pub fn build(
        config: &BotConfig,
        store: Arc<dyn DocumentStore>,
        blobs: Arc<dyn BlobStore>,
        directory: Arc<dyn UserDirectory>,
        gateway: Arc<dyn ModerationGateway>,
        notifier: Arc<dyn Notifier>,
        time: Arc<dyn TimeSource>,
    ) -> Self {
        let warden = Arc::new(Warden::new(
            Arc::clone(&store),
            Arc::clone(&gateway),
            Arc::clone(&time),
            config.warden,
        ));
        let sentences = Arc::new(WardenSentenceExecutor::new(Arc::clone(&warden)));
        let casemanager = Arc::new(CaseManager::new(
            store,
            blobs,
            directory,
            gateway,
            notifier,
            sentences,
            time,
            config.court.clone(),
        ));
        Self { casemanager, warden }
    }

    /// Builds the stack from configuration: JSON file persistence when a data
    /// directory is set, in-memory otherwise. The guild directory starts
    /// empty; the gateway adapter populates it as members are observed.
    pub fn from_config(config: &BotConfig) -> Self {
        let (store, blobs): (Arc<dyn DocumentStore>, Arc<dyn BlobStore>) =
            match &config.data_dir {
                Some(dir) => {
                    info!("[runtime] persisting to {}", dir.display());
                    (
                        Arc::new(JsonFileStore::new(dir.clone())),
                        Arc::new(FileBlobStore::new(dir.join("blobs"))),
                    )
                }
                None => {
                    info!("[runtime] no data dir configured, using in-memory stores");
                    (
                        Arc::new(MemoryDocumentStore::new()),
                        Arc::new(MemoryBlobStore::new()),
                    )
                }
            };
        let guild = Arc::new(InMemoryGuild::new());
        Self::build(
            config,
            store,
            blobs,
            Arc::clone(&guild) as Arc<dyn UserDirectory>,
            guild as Arc<dyn ModerationGateway>,
            Arc::new(TracingNotifier),
            Arc::new(SystemTimeSource),
        )
    }

    /// Hydrates both registries from the document store.
    pub async fn hydrate(&self) {
        let cases = self.casemanager.hydrate().await;
        let prisoners = self.warden.hydrate().await;
        info!("[runtime] hydration complete: {cases} case(s), {prisoners} prisoner(s)");
    }
}
