//! # Warden - prisoner registry and booking reconciliation
//!
//! Holds one mutex-guarded `Prisoner` per muted user. Warrant issuers append
//! through `new_warrant` and never touch each other's warrants; every
//! transition (activation, expiry, mute, unmute, archive) happens inside the
//! heartbeat while the prisoner's lock is held.
//!
//! Booking swaps the member's roles for the single mute role after
//! snapshotting them; release restores the snapshot. A prisoner whose ledger
//! and snapshot are both empty is deleted from the registry and the store.

use crate::domain::{Prisoner, Result, Warrant, WardenError};
use crate::ports::WardenApi;
use async_trait::async_trait;
use shared_types::ports::{DocumentStore, ModerationGateway, StoreError};
use shared_types::{RoleId, TimeSource, UserId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{error, info, warn};
use uuid::Uuid;

const PRISONERS: &str = "prisoners";

/// Warden tunables.
#[derive(Clone, Copy, Debug)]
pub struct WardenConfig {
    /// The single mute role the whole ledger reconciles onto.
    pub mute_role: RoleId,
}

/// The mute-ledger service.
pub struct Warden {
    prisoners: RwLock<HashMap<UserId, Arc<Mutex<Prisoner>>>>,
    store: Arc<dyn DocumentStore>,
    gateway: Arc<dyn ModerationGateway>,
    time: Arc<dyn TimeSource>,
    config: WardenConfig,
}

impl Warden {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        gateway: Arc<dyn ModerationGateway>,
        time: Arc<dyn TimeSource>,
        config: WardenConfig,
    ) -> Self {
        info!("[warden] initializing (mute role {:?})", config.mute_role);
        Self {
            prisoners: RwLock::new(HashMap::new()),
            store,
            gateway,
            time,
            config,
        }
    }

    /// Rehydrates the prisoner registry from the document store, skipping and
    /// logging unreadable documents.
    pub async fn hydrate(&self) -> usize {
        let docs = match self.store.find_all(PRISONERS).await {
            Ok(docs) => docs,
            Err(e) => {
                error!("[warden] failed to scan prisoner collection: {e}");
                return 0;
            }
        };
        let mut loaded = 0;
        for (id, doc) in docs {
            match serde_json::from_value::<Prisoner>(doc) {
                Ok(prisoner) => {
                    self.prisoners
                        .write()
                        .await
                        .insert(prisoner.user_id, Arc::new(Mutex::new(prisoner)));
                    loaded += 1;
                }
                Err(e) => {
                    warn!("[warden] skipping unreadable prisoner document {id}: {e}");
                }
            }
        }
        info!("[warden] hydrated {loaded} prisoner record(s)");
        loaded
    }

    async fn prisoner_handle(&self, user: UserId) -> Result<Arc<Mutex<Prisoner>>> {
        self.prisoners
            .read()
            .await
            .get(&user)
            .cloned()
            .ok_or(WardenError::PrisonerNotFound(user))
    }

    async fn persist(&self, prisoner: &Prisoner) -> Result<()> {
        let id = prisoner.user_id.to_string();
        let doc = serde_json::to_value(prisoner).map_err(|e| StoreError::Serialize {
            collection: PRISONERS.into(),
            id: id.clone(),
            reason: e.to_string(),
        })?;
        self.store.save(PRISONERS, &id, doc).await?;
        Ok(())
    }

    /// One reconciliation step under the prisoner's lock. Returns true when
    /// the record was archived and should leave the registry.
    async fn heartbeat_inner(&self, prisoner: &mut Prisoner) -> Result<bool> {
        let now = self.time.now();
        let step = prisoner.heartbeat(now);

        for warrant in &step.expired {
            info!(
                "[warden] warrant {} against {} expired ({})",
                warrant.id, prisoner.user_id, warrant.description
            );
        }
        if let Some(id) = &step.activated {
            info!("[warden] warrant {id} against {} is now serving", prisoner.user_id);
        }

        if step.should_be_muted && !prisoner.booked {
            let mut snapshot = self.gateway.roles_of(prisoner.user_id).await?;
            snapshot.retain(|r| *r != self.config.mute_role);
            prisoner.book(snapshot, now);
            self.gateway
                .set_roles(prisoner.user_id, &[self.config.mute_role])
                .await?;
            info!("[warden] {} booked", prisoner.user_id);
        } else if !step.should_be_muted && prisoner.booked {
            let roles = prisoner.release_roles();
            self.gateway.set_roles(prisoner.user_id, &roles).await?;
            info!("[warden] {} released", prisoner.user_id);
        }

        if prisoner.archivable() {
            self.store
                .delete(PRISONERS, &prisoner.user_id.to_string())
                .await?;
            info!("[warden] {} archived", prisoner.user_id);
            return Ok(true);
        }

        self.persist(prisoner).await?;
        Ok(false)
    }

    /// Heartbeat plus registry removal on archive.
    async fn reconcile(&self, user: UserId, handle: Arc<Mutex<Prisoner>>) -> Result<()> {
        let archived = {
            let mut prisoner = handle.lock().await;
            self.heartbeat_inner(&mut prisoner).await?
        };
        if archived {
            // Re-check under the write lock: a warrant may have been appended
            // between the heartbeat and this removal.
            let mut registry = self.prisoners.write().await;
            if let Some(handle) = registry.get(&user).cloned() {
                let prisoner = handle.lock().await;
                if prisoner.archivable() {
                    drop(prisoner);
                    registry.remove(&user);
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl WardenApi for Warden {
    async fn new_warrant(
        &self,
        user: UserId,
        category: &str,
        description: &str,
        author: UserId,
        len_seconds: i64,
    ) -> Result<String> {
        let now = self.time.now();
        let handle = {
            let mut registry = self.prisoners.write().await;
            Arc::clone(
                registry
                    .entry(user)
                    .or_insert_with(|| Arc::new(Mutex::new(Prisoner::new(user, now)))),
            )
        };

        let warrant_id = Uuid::new_v4().to_string();
        let mut prisoner = handle.lock().await;
        prisoner.warrants.push(Warrant::new(
            warrant_id.clone(),
            category.to_string(),
            description.to_string(),
            author,
            len_seconds,
            now,
        ));
        self.persist(&prisoner).await?;
        info!(
            "[warden] warrant {warrant_id} opened against {user} ({category}, {len_seconds}s): {description}"
        );
        Ok(warrant_id)
    }

    async fn release_warrant(&self, user: UserId, warrant_id: &str) -> Result<()> {
        let handle = self.prisoner_handle(user).await?;
        {
            let mut prisoner = handle.lock().await;
            prisoner
                .remove_warrant(warrant_id)
                .ok_or_else(|| WardenError::WarrantNotFound(warrant_id.to_string()))?;
            info!("[warden] warrant {warrant_id} against {user} lifted");
        }
        // Reconcile promptly so the release is not held until the next cycle.
        self.reconcile(user, handle).await
    }

    async fn set_frozen(&self, user: UserId, warrant_id: &str, frozen: bool) -> Result<()> {
        let handle = self.prisoner_handle(user).await?;
        {
            let mut prisoner = handle.lock().await;
            let warrant = prisoner
                .warrant_mut(warrant_id)
                .ok_or_else(|| WardenError::WarrantNotFound(warrant_id.to_string()))?;
            warrant.frozen = frozen;
            self.persist(&prisoner).await?;
        }
        self.reconcile(user, handle).await
    }

    async fn set_no_enforce(&self, user: UserId, warrant_id: &str, no_enforce: bool) -> Result<()> {
        let handle = self.prisoner_handle(user).await?;
        {
            let mut prisoner = handle.lock().await;
            let warrant = prisoner
                .warrant_mut(warrant_id)
                .ok_or_else(|| WardenError::WarrantNotFound(warrant_id.to_string()))?;
            warrant.no_enforce = no_enforce;
            self.persist(&prisoner).await?;
        }
        self.reconcile(user, handle).await
    }

    async fn prisoner_snapshot(&self, user: UserId) -> Result<Prisoner> {
        let handle = self.prisoner_handle(user).await?;
        let prisoner = handle.lock().await;
        Ok(prisoner.clone())
    }

    async fn prisoner_ids(&self) -> Vec<UserId> {
        self.prisoners.read().await.keys().copied().collect()
    }

    async fn tick(&self, user: UserId) -> Result<()> {
        let handle = self.prisoner_handle(user).await?;
        self.reconcile(user, handle).await
    }

    async fn tick_all(&self) {
        let handles: Vec<(UserId, Arc<Mutex<Prisoner>>)> = self
            .prisoners
            .read()
            .await
            .iter()
            .map(|(user, handle)| (*user, Arc::clone(handle)))
            .collect();
        for (user, handle) in handles {
            if let Err(e) = self.reconcile(user, handle).await {
                error!("[warden] reconciling {user} failed: {e}");
            }
        }
    }
}
