//! Adapters implementing the collaborator ports.
//!
//! - `memory` - in-process stores and guild fakes for development and tests
//! - `file_store` - JSON-file document store and blob store for single-node
//!   deployments
//! - `sentence` - the warden-backed `SentenceExecutor`
//! - `notify` - tracing-only notifier (stands in for the chat gateway)

pub mod file_store;
pub mod memory;
pub mod notify;
pub mod sentence;

pub use file_store::{FileBlobStore, JsonFileStore};
pub use memory::{InMemoryGuild, MemoryBlobStore, MemoryDocumentStore, RecordingNotifier};
pub use notify::TracingNotifier;
pub use sentence::WardenSentenceExecutor;
