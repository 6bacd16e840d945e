//! Tracing-backed notifier.
//!
//! Stands in for the chat gateway: every announcement lands in the log
//! stream instead of a DM or channel. Useful for development and for
//! deployments where the gateway adapter is not wired yet.

use async_trait::async_trait;
use gavel_casemanager::ports::outbound::{Notifier, NotifyError, Recipient};
use tracing::info;

#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn send(&self, recipient: Recipient, text: &str) -> Result<(), NotifyError> {
        match recipient {
            Recipient::User(user) => info!("[notify] -> user {user}: {text}"),
            Recipient::Channel(channel) => info!("[notify] -> channel {channel:?}: {text}"),
        }
        Ok(())
    }
}
