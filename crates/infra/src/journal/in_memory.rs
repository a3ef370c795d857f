use std::sync::RwLock;

use chrono::Utc;

use super::r#trait::{Journal, JournalEntry, JournalError, JournalRecord};

/// In-memory journal.
///
/// Intended for tests/dev. Nothing survives the process.
#[derive(Debug, Default)]
pub struct InMemoryJournal {
    records: RwLock<Vec<JournalRecord>>,
}

impl InMemoryJournal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Journal for InMemoryJournal {
    fn append(&self, entry: JournalEntry) -> Result<JournalRecord, JournalError> {
        let mut records = self.records.write().map_err(|_| JournalError::Poisoned)?;
        let record = JournalRecord {
            sequence: records.last().map(|r| r.sequence).unwrap_or(0) + 1,
            recorded_at: Utc::now(),
            entry,
        };
        records.push(record.clone());
        Ok(record)
    }

    fn load(&self) -> Result<Vec<JournalRecord>, JournalError> {
        let records = self.records.read().map_err(|_| JournalError::Poisoned)?;
        Ok(records.clone())
    }
}
