//! Append-only, owner-scoped log of inward and outward transactions.

use std::collections::HashSet;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use voltran_core::entity::Owned;
use voltran_core::{MaterialId, OwnerId, TransactionId};
use voltran_inventory::{Transaction, TransactionKind};

use crate::error::LedgerError;

#[derive(Debug, Default)]
struct LogInner {
    inward: Vec<Transaction>,
    outward: Vec<Transaction>,
    ids: HashSet<TransactionId>,
}

/// Immutable transaction records, split by kind.
///
/// Records are only ever appended. Validation is the caller's job; the log
/// enforces id uniqueness and nothing else.
#[derive(Debug, Default)]
pub struct TransactionLog {
    inner: RwLock<LogInner>,
}

impl TransactionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn restored(transactions: impl IntoIterator<Item = Transaction>) -> Self {
        let mut inner = LogInner::default();
        for tx in transactions {
            inner.push(tx);
        }
        Self {
            inner: RwLock::new(inner),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, LogInner>, LedgerError> {
        self.inner
            .read()
            .map_err(|_| LedgerError::poisoned("transaction log"))
    }

    fn filtered(&self, kind: TransactionKind, owner_id: OwnerId) -> Result<Vec<Transaction>, LedgerError> {
        let inner = self.read()?;
        let records = match kind {
            TransactionKind::Inward => &inner.inward,
            TransactionKind::Outward => &inner.outward,
        };
        Ok(records
            .iter()
            .filter(|t| t.owner_id() == owner_id)
            .cloned()
            .collect())
    }

    pub fn list_inward(&self, owner_id: OwnerId) -> Result<Vec<Transaction>, LedgerError> {
        self.filtered(TransactionKind::Inward, owner_id)
    }

    pub fn list_outward(&self, owner_id: OwnerId) -> Result<Vec<Transaction>, LedgerError> {
        self.filtered(TransactionKind::Outward, owner_id)
    }

    /// Inward and outward records of one material, oldest first.
    pub fn history(&self, owner_id: OwnerId, material_id: MaterialId) -> Result<Vec<Transaction>, LedgerError> {
        let inner = self.read()?;
        let mut all: Vec<Transaction> = inner
            .inward
            .iter()
            .chain(&inner.outward)
            .filter(|t| t.owner_id() == owner_id && t.material_id() == material_id)
            .cloned()
            .collect();
        all.sort_by_key(|t| (t.date(), t.id_typed()));
        Ok(all)
    }

    pub fn contains(&self, id: TransactionId) -> Result<bool, LedgerError> {
        Ok(self.read()?.ids.contains(&id))
    }

    /// Exclusive append access.
    ///
    /// Once a writer is held, the only way an append can fail is a duplicate id,
    /// which [`LogWriter::ensure_unique`] checks before anything is made durable.
    pub(crate) fn writer(&self) -> Result<LogWriter<'_>, LedgerError> {
        let inner = self
            .inner
            .write()
            .map_err(|_| LedgerError::poisoned("transaction log"))?;
        Ok(LogWriter { inner })
    }
}

/// Write guard over the log, see [`TransactionLog::writer`].
pub(crate) struct LogWriter<'a> {
    inner: RwLockWriteGuard<'a, LogInner>,
}

impl LogWriter<'_> {
    pub(crate) fn ensure_unique(&self, id: TransactionId) -> Result<(), LedgerError> {
        if self.inner.ids.contains(&id) {
            return Err(LedgerError::internal(format!("duplicate transaction id {id}")));
        }
        Ok(())
    }

    pub(crate) fn append(mut self, transaction: Transaction) -> Transaction {
        self.inner.push(transaction.clone());
        transaction
    }
}

#[cfg(test)]
impl TransactionLog {
    /// Poison the lock the way a panicking writer would.
    pub(crate) fn poison(&self) {
        std::thread::scope(|s| {
            let _ = s
                .spawn(|| {
                    let _guard = self.inner.write();
                    panic!("transaction log writer panicked");
                })
                .join();
        });
    }
}

impl LogInner {
    fn push(&mut self, tx: Transaction) {
        self.ids.insert(tx.id_typed());
        match tx.kind() {
            TransactionKind::Inward => self.inward.push(tx),
            TransactionKind::Outward => self.outward.push(tx),
        }
    }
}
