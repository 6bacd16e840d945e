//! Inbound port: the ledger API other subsystems and commands call.

use crate::domain::{Prisoner, Result};
use async_trait::async_trait;
use shared_types::UserId;

/// Primary API for the warden subsystem.
#[async_trait]
pub trait WardenApi: Send + Sync {
    /// Appends a mute warrant against `user`, creating the prisoner record
    /// implicitly when none exists. Returns the warrant id.
    ///
    /// `len_seconds < 0` denotes a stay (no timer, enforced until lifted).
    async fn new_warrant(
        &self,
        user: UserId,
        category: &str,
        description: &str,
        author: UserId,
        len_seconds: i64,
    ) -> Result<String>;

    /// Removes a warrant; the next heartbeat reconciles the mute state.
    async fn release_warrant(&self, user: UserId, warrant_id: &str) -> Result<()>;

    /// Suspends or resumes a warrant's enforcement without losing its
    /// accounting (time served while appealing).
    async fn set_frozen(&self, user: UserId, warrant_id: &str, frozen: bool) -> Result<()>;

    /// Marks a warrant as counted-but-never-enforced.
    async fn set_no_enforce(&self, user: UserId, warrant_id: &str, no_enforce: bool) -> Result<()>;

    /// A point-in-time copy of a prisoner's ledger.
    async fn prisoner_snapshot(&self, user: UserId) -> Result<Prisoner>;

    /// Users with a ledger entry.
    async fn prisoner_ids(&self) -> Vec<UserId>;

    /// Reconciles one user's ledger now.
    async fn tick(&self, user: UserId) -> Result<()>;

    /// Reconciles every ledger.
    async fn tick_all(&self);
}
