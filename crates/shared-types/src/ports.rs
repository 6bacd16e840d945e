//! Collaborator port traits shared by more than one subsystem.
//!
//! The chat platform, the document database, and the blob store are external
//! collaborators; the court core only ever sees these traits. Adapters live in
//! `bot-runtime`.

use crate::ids::{RoleId, Timestamp, UserId};
use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Document store failure.
///
/// Persistence failures propagate as hard errors to the caller of the mutating
/// operation; there is no automatic retry.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document store failure: {0}")]
    Backend(String),
    #[error("document {collection}/{id} failed to serialize: {reason}")]
    Serialize {
        collection: String,
        id: String,
        reason: String,
    },
}

/// Document database: one document per aggregate, embedded children inline.
///
/// Cases are keyed by case id, prisoners by user id, and a small `kv`
/// collection holds cross-restart scalar state.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Upserts a document.
    async fn save(&self, collection: &str, id: &str, document: Value) -> Result<(), StoreError>;

    /// Loads a single document, `None` if absent.
    async fn load(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError>;

    /// Returns every `(id, document)` pair in a collection.
    async fn find_all(&self, collection: &str) -> Result<Vec<(String, Value)>, StoreError>;

    /// Deletes a document. Deleting an absent document is not an error.
    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;
}

/// Blob store failure.
#[derive(Debug, Error)]
pub enum BlobError {
    #[error("blob {0} not found")]
    NotFound(String),
    #[error("blob store failure: {0}")]
    Backend(String),
}

/// Opaque blob storage for evidence files and case archives.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Stores bytes under a fresh blob id.
    async fn put(&self, filename: &str, bytes: Vec<u8>) -> Result<String, BlobError>;

    /// Retrieves `(filename, bytes)` for a blob id.
    async fn get(&self, blob_id: &str) -> Result<(String, Vec<u8>), BlobError>;

    /// Deletes a blob. Deleting an absent blob is not an error.
    async fn delete(&self, blob_id: &str) -> Result<(), BlobError>;
}

/// Chat-platform lookup failure (the call itself failed, not "no such user").
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("platform gateway failure: {0}")]
    Gateway(String),
}

/// Membership and role facts for one guild member.
#[derive(Clone, Debug)]
pub struct MemberProfile {
    pub user_id: UserId,
    pub display_name: String,
    pub roles: Vec<RoleId>,
    /// Last recorded activity, seconds since epoch.
    pub last_active: Timestamp,
    /// Total recorded messages.
    pub message_count: u64,
    pub is_administrator: bool,
    pub can_ban_members: bool,
}

impl MemberProfile {
    pub fn has_role(&self, role: RoleId) -> bool {
        self.roles.contains(&role)
    }
}

/// Read-only view of the guild member directory.
///
/// Departed members resolve to `Ok(None)`, never to an error; the court prunes
/// jurors and skips recipients on that signal.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Resolves one member, `None` if the user left the guild.
    async fn member(&self, user: UserId) -> Result<Option<MemberProfile>, DirectoryError>;

    /// Every current member, for jury eligibility scans.
    async fn members(&self) -> Result<Vec<MemberProfile>, DirectoryError>;
}

/// Role mutation and platform-level sanctions.
#[async_trait]
pub trait ModerationGateway: Send + Sync {
    /// Issues a platform-level ban.
    async fn ban(&self, user: UserId, reason: &str) -> Result<(), DirectoryError>;

    /// Replaces a member's role set.
    async fn set_roles(&self, user: UserId, roles: &[RoleId]) -> Result<(), DirectoryError>;

    /// Current role set of a member.
    async fn roles_of(&self, user: UserId) -> Result<Vec<RoleId>, DirectoryError>;
}
