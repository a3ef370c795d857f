//! Durable journal of committed state changes.
//!
//! Repository and ledger mutations are written here before they become visible
//! in memory. A ledger movement is a single record carrying both the updated
//! material and the new transaction, so the two effects persist together or not
//! at all. Replaying the journal in sequence order rebuilds the full state.

pub mod file;
pub mod in_memory;
pub mod r#trait;

pub use file::FileJournal;
pub use in_memory::InMemoryJournal;
pub use r#trait::{Journal, JournalEntry, JournalError, JournalRecord};
