//! Infrastructure layer: storage, the ledger engine, and read projections.

pub mod config;
pub mod error;
pub mod journal;
pub mod ledger;
pub mod projections;
pub mod repository;
pub mod transaction_log;

pub use config::LedgerConfig;
pub use error::LedgerError;
pub use journal::{FileJournal, InMemoryJournal, Journal, JournalEntry, JournalError, JournalRecord};
pub use ledger::{EnrichedTransaction, LedgerEngine, OwnerSnapshot, UNKNOWN_MATERIAL};
pub use projections::{Dashboard, DashboardAggregator};
pub use repository::MaterialRepository;
pub use transaction_log::TransactionLog;
