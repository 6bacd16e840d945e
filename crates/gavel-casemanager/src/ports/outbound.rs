//! Outbound (driven) ports specific to the case manager.
//!
//! Document store, blob store, directory, and gateway traits are shared; the
//! two ports here exist only for this subsystem: notification fan-out and the
//! hand-off of prison sentences to the warden.

use async_trait::async_trait;
use shared_types::{ChannelId, UserId};
use thiserror::Error;

/// Where an announcement line goes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Recipient {
    User(UserId),
    Channel(ChannelId),
}

/// Per-recipient delivery failure (closed DMs, missing channel).
///
/// `Announce` catches and logs these; they never abort delivery to the other
/// recipients and never roll back committed state.
#[derive(Debug, Error)]
#[error("delivery to {recipient:?} failed: {reason}")]
pub struct NotifyError {
    pub recipient: String,
    pub reason: String,
}

/// Notification channel to users and channels.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, recipient: Recipient, text: &str) -> Result<(), NotifyError>;
}

/// Sentence hand-off failure.
#[derive(Debug, Error)]
#[error("sentence hand-off failed: {0}")]
pub struct SentenceError(pub String);

/// Executes prison penalties.
///
/// The runtime implements this by calling `Warden::new_warrant`; the case
/// manager never talks to the warden directly.
#[async_trait]
pub trait SentenceExecutor: Send + Sync {
    /// Opens a mute warrant against `user`. `len_seconds <= 0` requests an
    /// indefinite sentence.
    async fn imprison(
        &self,
        user: UserId,
        category: &str,
        description: &str,
        author: UserId,
        len_seconds: i64,
    ) -> Result<(), SentenceError>;
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use std::sync::Mutex;

    /// Records every delivery; optionally fails for chosen recipients.
    #[derive(Default)]
    pub struct RecordingNotifier {
        pub sent: Mutex<Vec<(Recipient, String)>>,
        pub failing: Mutex<Vec<Recipient>>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send(&self, recipient: Recipient, text: &str) -> Result<(), NotifyError> {
            if self.failing.lock().unwrap().contains(&recipient) {
                return Err(NotifyError {
                    recipient: format!("{recipient:?}"),
                    reason: "DMs disabled".into(),
                });
            }
            self.sent.lock().unwrap().push((recipient, text.to_string()));
            Ok(())
        }
    }

    /// Records imprison calls.
    #[derive(Default)]
    pub struct RecordingSentenceExecutor {
        pub calls: Mutex<Vec<(UserId, String, i64)>>,
    }

    #[async_trait]
    impl SentenceExecutor for RecordingSentenceExecutor {
        async fn imprison(
            &self,
            user: UserId,
            category: &str,
            _description: &str,
            _author: UserId,
            len_seconds: i64,
        ) -> Result<(), SentenceError> {
            self.calls
                .lock()
                .unwrap()
                .push((user, category.to_string(), len_seconds));
            Ok(())
        }
    }
}
