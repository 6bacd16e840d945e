//! # Shared Types - Identifiers and Collaborator Ports
//!
//! Common vocabulary for the Gavel subsystems.
//!
//! ## Contents
//!
//! - `ids` - newtype identifiers for users, roles, and channels, plus the
//!   string id schemes for cases, motions, and evidence
//! - `time` - the `TimeSource` abstraction (mockable for deterministic tests)
//! - `ports` - traits for the external collaborators shared by more than one
//!   subsystem: document store, blob store, user directory, moderation gateway
//!
//! Subsystem-specific ports (notification fan-out, sentence execution) live in
//! the owning crate; only cross-cutting contracts belong here.

pub mod ids;
pub mod ports;
pub mod time;

pub use ids::{CaseId, ChannelId, EvidenceId, MotionId, RoleId, Timestamp, UserId};
pub use ports::{
    BlobError, BlobStore, DirectoryError, DocumentStore, MemberProfile, ModerationGateway,
    StoreError,
};
pub use ports::UserDirectory;
pub use time::{MockTimeSource, SystemTimeSource, TimeSource};
