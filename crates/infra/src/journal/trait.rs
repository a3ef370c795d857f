use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use voltran_core::{MaterialId, OwnerId};
use voltran_inventory::{Material, Transaction};

/// One committed state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JournalEntry {
    MaterialCreated {
        material: Material,
    },
    MaterialUpdated {
        material: Material,
    },
    MaterialDeleted {
        owner_id: OwnerId,
        material_id: MaterialId,
    },
    /// A ledger movement: the material after the delta plus the appended transaction.
    MovementApplied {
        material: Material,
        transaction: Transaction,
    },
}

impl JournalEntry {
    pub fn kind(&self) -> &'static str {
        match self {
            JournalEntry::MaterialCreated { .. } => "material_created",
            JournalEntry::MaterialUpdated { .. } => "material_updated",
            JournalEntry::MaterialDeleted { .. } => "material_deleted",
            JournalEntry::MovementApplied { .. } => "movement_applied",
        }
    }
}

/// A journal entry with its assigned position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalRecord {
    /// Monotonically increasing, starting at 1.
    pub sequence: u64,
    pub recorded_at: DateTime<Utc>,
    pub entry: JournalEntry,
}

#[derive(Debug, Error)]
pub enum JournalError {
    #[error("journal io failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("journal record could not be encoded: {0}")]
    Encode(String),

    #[error("journal corrupt at line {line}: {reason}")]
    Corrupt { line: usize, reason: String },

    #[error("journal lock poisoned")]
    Poisoned,
}

/// Append-only store of committed entries.
///
/// `append` must not return until the record is durable for the backend in use.
/// Sequence numbers are assigned by the journal, without gaps.
pub trait Journal: Send + Sync {
    fn append(&self, entry: JournalEntry) -> Result<JournalRecord, JournalError>;

    /// Load every committed record in sequence order.
    fn load(&self) -> Result<Vec<JournalRecord>, JournalError>;
}

impl<J> Journal for Arc<J>
where
    J: Journal + ?Sized,
{
    fn append(&self, entry: JournalEntry) -> Result<JournalRecord, JournalError> {
        (**self).append(entry)
    }

    fn load(&self) -> Result<Vec<JournalRecord>, JournalError> {
        (**self).load()
    }
}
