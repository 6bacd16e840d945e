//! In-process adapters.
//!
//! These back development runs and the integration suite: a `HashMap`
//! document store, a counter-keyed blob store, and a guild fake that serves
//! as both directory and moderation gateway. None of them ever suspends, so
//! interior mutability is a plain `parking_lot` lock.

use async_trait::async_trait;
use gavel_casemanager::ports::outbound::{Notifier, NotifyError, Recipient};
use parking_lot::Mutex;
use serde_json::Value;
use shared_types::ports::{
    BlobError, BlobStore, DirectoryError, DocumentStore, MemberProfile, ModerationGateway,
    StoreError, UserDirectory,
};
use shared_types::{RoleId, UserId};
use std::collections::HashMap;

/// Document store backed by a process-local map.
#[derive(Default)]
pub struct MemoryDocumentStore {
    docs: Mutex<HashMap<(String, String), Value>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn save(&self, collection: &str, id: &str, document: Value) -> Result<(), StoreError> {
        self.docs
            .lock()
            .insert((collection.to_string(), id.to_string()), document);
        Ok(())
    }

    async fn load(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        Ok(self
            .docs
            .lock()
            .get(&(collection.to_string(), id.to_string()))
            .cloned())
    }

    async fn find_all(&self, collection: &str) -> Result<Vec<(String, Value)>, StoreError> {
        Ok(self
            .docs
            .lock()
            .iter()
            .filter(|((c, _), _)| c == collection)
            .map(|((_, id), doc)| (id.clone(), doc.clone()))
            .collect())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        self.docs
            .lock()
            .remove(&(collection.to_string(), id.to_string()));
        Ok(())
    }
}

/// Blob store backed by a process-local map.
#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<String, (String, Vec<u8>)>>,
    counter: Mutex<u64>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.blobs.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.lock().is_empty()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, filename: &str, bytes: Vec<u8>) -> Result<String, BlobError> {
        let id = {
            let mut counter = self.counter.lock();
            *counter += 1;
            format!("blob-{counter}")
        };
        self.blobs
            .lock()
            .insert(id.clone(), (filename.to_string(), bytes));
        Ok(id)
    }

    async fn get(&self, blob_id: &str) -> Result<(String, Vec<u8>), BlobError> {
        self.blobs
            .lock()
            .get(blob_id)
            .cloned()
            .ok_or_else(|| BlobError::NotFound(blob_id.to_string()))
    }

    async fn delete(&self, blob_id: &str) -> Result<(), BlobError> {
        self.blobs.lock().remove(blob_id);
        Ok(())
    }
}

/// Guild fake: member directory, role store, and ban list in one.
///
/// Serves as both `UserDirectory` and `ModerationGateway`; tests mutate it
/// directly to simulate joins, departures, and activity.
#[derive(Default)]
pub struct InMemoryGuild {
    members: Mutex<HashMap<UserId, MemberProfile>>,
    banned: Mutex<Vec<(UserId, String)>>,
}

impl InMemoryGuild {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a member profile.
    pub fn upsert_member(&self, profile: MemberProfile) {
        self.members.lock().insert(profile.user_id, profile);
    }

    /// Simulates a member leaving the guild.
    pub fn remove_member(&self, user: UserId) {
        self.members.lock().remove(&user);
    }

    /// Current roles as the gateway sees them.
    pub fn roles(&self, user: UserId) -> Vec<RoleId> {
        self.members
            .lock()
            .get(&user)
            .map(|p| p.roles.clone())
            .unwrap_or_default()
    }

    /// Platform bans issued so far.
    pub fn bans(&self) -> Vec<(UserId, String)> {
        self.banned.lock().clone()
    }
}

#[async_trait]
impl UserDirectory for InMemoryGuild {
    async fn member(&self, user: UserId) -> Result<Option<MemberProfile>, DirectoryError> {
        Ok(self.members.lock().get(&user).cloned())
    }

    async fn members(&self) -> Result<Vec<MemberProfile>, DirectoryError> {
        Ok(self.members.lock().values().cloned().collect())
    }
}

#[async_trait]
impl ModerationGateway for InMemoryGuild {
    async fn ban(&self, user: UserId, reason: &str) -> Result<(), DirectoryError> {
        self.banned.lock().push((user, reason.to_string()));
        self.members.lock().remove(&user);
        Ok(())
    }

    async fn set_roles(&self, user: UserId, roles: &[RoleId]) -> Result<(), DirectoryError> {
        let mut members = self.members.lock();
        let profile = members
            .get_mut(&user)
            .ok_or_else(|| DirectoryError::Gateway(format!("user {user} not in guild")))?;
        profile.roles = roles.to_vec();
        Ok(())
    }

    async fn roles_of(&self, user: UserId) -> Result<Vec<RoleId>, DirectoryError> {
        Ok(self
            .members
            .lock()
            .get(&user)
            .map(|p| p.roles.clone())
            .unwrap_or_default())
    }
}

/// Notifier that records every delivery, optionally failing chosen
/// recipients. Used by the integration suite to assert fan-out behavior.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(Recipient, String)>>,
    failing: Mutex<Vec<Recipient>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_for(&self, recipient: Recipient) {
        self.failing.lock().push(recipient);
    }

    pub fn sent(&self) -> Vec<(Recipient, String)> {
        self.sent.lock().clone()
    }

    pub fn sent_to(&self, recipient: Recipient) -> Vec<String> {
        self.sent
            .lock()
            .iter()
            .filter(|(r, _)| *r == recipient)
            .map(|(_, text)| text.clone())
            .collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, recipient: Recipient, text: &str) -> Result<(), NotifyError> {
        if self.failing.lock().contains(&recipient) {
            return Err(NotifyError {
                recipient: format!("{recipient:?}"),
                reason: "DMs disabled".into(),
            });
        }
        self.sent.lock().push((recipient, text.to_string()));
        Ok(())
    }
}

/// Convenience profile for tests and seed data.
pub fn member_profile(id: u64, name: &str, last_active: u64, messages: u64) -> MemberProfile {
    MemberProfile {
        user_id: UserId(id),
        display_name: name.to_string(),
        roles: Vec::new(),
        last_active,
        message_count: messages,
        is_administrator: false,
        can_ban_members: false,
    }
}
