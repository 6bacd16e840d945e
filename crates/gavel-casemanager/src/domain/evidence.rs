//! Evidence records and visibility seals.
//!
//! Evidence is immutable once filed: the blob reference, submitter, and
//! content digest never change. Seals are the only append; a sealed item is
//! withheld from everyone but the case's parties and seated jurors.

use serde::{Deserialize, Serialize};
use shared_types::{EvidenceId, Timestamp, UserId};

/// A restriction marker on a piece of evidence.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seal {
    /// Ordinal within the owning evidence item, starting at 1.
    pub id: u64,
    pub description: String,
    pub author: UserId,
    pub created: Timestamp,
}

/// One filed attachment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evidence {
    pub id: EvidenceId,
    /// Original filename as uploaded.
    pub filename: String,
    /// Opaque blob store reference.
    pub blob_id: String,
    pub submitter: UserId,
    pub created: Timestamp,
    /// Hex sha-256 of the blob content, taken at intake.
    pub digest: String,
    /// Set when the content digest was recorded by the bot at intake.
    pub certified: bool,
    /// Ordered restriction markers; non-empty means withheld.
    pub seals: Vec<Seal>,
}

impl Evidence {
    pub fn is_sealed(&self) -> bool {
        !self.seals.is_empty()
    }

    /// Appends a seal, returning its ordinal.
    pub fn add_seal(&mut self, description: String, author: UserId, created: Timestamp) -> u64 {
        let id = self.seals.len() as u64 + 1;
        self.seals.push(Seal {
            id,
            description,
            author,
            created,
        });
        id
    }
}
