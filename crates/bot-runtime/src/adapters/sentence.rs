//! Sentence executor backed by the warden ledger.
//!
//! The case manager never sees the warden; prison penalties cross this seam
//! as one `imprison` call, and the warrant is reconciled out-of-cycle so the
//! mute takes hold without waiting for the next scheduled tick.

use async_trait::async_trait;
use gavel_casemanager::ports::outbound::{SentenceError, SentenceExecutor};
use gavel_warden::{Warden, WardenApi, STAY};
use shared_types::UserId;
use std::sync::Arc;
use tracing::warn;

pub struct WardenSentenceExecutor {
    warden: Arc<Warden>,
}

impl WardenSentenceExecutor {
    pub fn new(warden: Arc<Warden>) -> Self {
        Self { warden }
    }
}

#[async_trait]
impl SentenceExecutor for WardenSentenceExecutor {
    async fn imprison(
        &self,
        user: UserId,
        category: &str,
        description: &str,
        author: UserId,
        len_seconds: i64,
    ) -> Result<(), SentenceError> {
        // An indefinite sentence is a stay on the ledger.
        let len = if len_seconds <= 0 { STAY } else { len_seconds };
        self.warden
            .new_warrant(user, category, description, author, len)
            .await
            .map_err(|e| SentenceError(e.to_string()))?;
        if let Err(e) = self.warden.tick(user).await {
            // The warrant is on the ledger; the scheduled tick will book.
            warn!("[runtime] immediate warden tick failed for {user}: {e}");
        }
        Ok(())
    }
}
