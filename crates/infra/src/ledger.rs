//! Ledger engine: stock movements as single atomic units.
//!
//! A movement runs entirely inside the target material's exclusive section:
//!
//! ```text
//! MovementRequest
//!   ↓
//! 1. Validate fields (no locks taken)
//!   ↓
//! 2. Lock the material (bounded wait, owner-scoped lookup)
//!   ↓
//! 3. Apply the signed delta (fails with InsufficientStock below zero)
//!   ↓
//! 4. Journal material + transaction as ONE record (durable commit point)
//!   ↓
//! 5. Append to the transaction log, publish the new material, unlock
//! ```
//!
//! The transaction log's writer is taken before step 4, so once the journal
//! accepts the record the in-memory append cannot fail.
//!
//! Because steps 2-5 hold the material's write lock, two movements on the same
//! material can never both pass the sufficiency check against the same stock.
//! Movements on different materials run in parallel.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use voltran_core::entity::Owned;
use voltran_core::{MaterialId, OwnerId, TransactionId};
use voltran_inventory::{
    Material, MovementDetail, MovementRequest, Transaction, TransactionKind,
};

use crate::config::LedgerConfig;
use crate::error::LedgerError;
use crate::journal::{InMemoryJournal, Journal, JournalEntry, JournalRecord};
use crate::repository::MaterialRepository;
use crate::transaction_log::TransactionLog;

/// Name shown for transactions whose material no longer exists.
pub const UNKNOWN_MATERIAL: &str = "Unknown";

/// A transaction plus the display context callers need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichedTransaction {
    pub transaction: Transaction,
    pub material_name: String,
    /// Stock right after this movement; only set on the response to a movement.
    pub new_stock: Option<Decimal>,
}

/// Everything one owner sees, read in one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnerSnapshot {
    pub materials: Vec<Material>,
    pub inward: Vec<Transaction>,
    pub outward: Vec<Transaction>,
}

/// Coordinates `MaterialRepository` and `TransactionLog`.
///
/// This is the only component allowed to change a material's quantity together
/// with appending a transaction.
pub struct LedgerEngine {
    materials: MaterialRepository,
    transactions: TransactionLog,
    journal: Arc<dyn Journal>,
}

impl std::fmt::Debug for LedgerEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerEngine")
            .field("materials", &self.materials)
            .finish_non_exhaustive()
    }
}

impl LedgerEngine {
    /// Open the ledger over `journal`, replaying whatever it already holds.
    pub fn open(config: &LedgerConfig, journal: Arc<dyn Journal>) -> Result<Self, LedgerError> {
        let records = journal.load()?;
        let count = records.len();
        let (materials, transactions) = replay(records)?;

        tracing::info!(
            records = count,
            materials = materials.len(),
            transactions = transactions.len(),
            "ledger restored from journal"
        );

        Ok(Self {
            materials: MaterialRepository::restored(journal.clone(), config.lock_timeout, materials),
            transactions: TransactionLog::restored(transactions),
            journal,
        })
    }

    /// Fresh ledger over an in-memory journal (tests/dev).
    pub fn in_memory(config: &LedgerConfig) -> Self {
        let journal: Arc<dyn Journal> = Arc::new(InMemoryJournal::new());
        Self {
            materials: MaterialRepository::new(journal.clone(), config.lock_timeout),
            transactions: TransactionLog::new(),
            journal,
        }
    }

    pub fn materials(&self) -> &MaterialRepository {
        &self.materials
    }

    pub fn transactions(&self) -> &TransactionLog {
        &self.transactions
    }

    /// Record a receipt from a supplier.
    pub async fn record_inward(
        &self,
        owner_id: OwnerId,
        material_id: &str,
        quantity: Decimal,
        supplier: &str,
        invoice: Option<&str>,
        date: Option<DateTime<Utc>>,
    ) -> Result<EnrichedTransaction, LedgerError> {
        let request = MovementRequest {
            material_id: Some(material_id.to_string()),
            quantity: Some(quantity),
            detail: MovementDetail::Inward {
                supplier: Some(supplier.to_string()),
                invoice: invoice.map(str::to_string),
            },
            date,
        };
        self.record(owner_id, request).await
    }

    /// Record a dispatch to a project. Fails with `InsufficientStock` if the
    /// material holds less than `quantity`.
    pub async fn record_outward(
        &self,
        owner_id: OwnerId,
        material_id: &str,
        quantity: Decimal,
        project: &str,
        supervisor: Option<&str>,
        date: Option<DateTime<Utc>>,
    ) -> Result<EnrichedTransaction, LedgerError> {
        let request = MovementRequest {
            material_id: Some(material_id.to_string()),
            quantity: Some(quantity),
            detail: MovementDetail::Outward {
                project: Some(project.to_string()),
                supervisor: supervisor.map(str::to_string),
            },
            date,
        };
        self.record(owner_id, request).await
    }

    /// Apply one movement of either kind.
    #[tracing::instrument(skip(self, request), fields(owner = %owner_id, kind = request.kind().as_str()))]
    pub async fn record(
        &self,
        owner_id: OwnerId,
        request: MovementRequest,
    ) -> Result<EnrichedTransaction, LedgerError> {
        let movement = request.validate().map_err(|e| {
            tracing::debug!(error = %e, "movement rejected");
            LedgerError::from(e)
        })?;

        let now = Utc::now();
        let material_id = movement.material_id;
        let delta = movement.stock_delta();
        let transaction = Transaction::record(TransactionId::new(), owner_id, movement, now);

        let outcome = self
            .materials
            .apply_quantity_delta(owner_id, material_id, delta, now, |updated| {
                let log = self.transactions.writer()?;
                log.ensure_unique(transaction.id_typed())?;
                self.journal.append(JournalEntry::MovementApplied {
                    material: updated.clone(),
                    transaction: transaction.clone(),
                })?;
                Ok(log.append(transaction))
            })
            .await;

        let (material, transaction) = match outcome {
            Ok(done) => done,
            Err(LedgerError::Internal(detail)) => {
                tracing::error!(material = %material_id, %detail, "movement failed");
                return Err(LedgerError::Internal(detail));
            }
            Err(e) => {
                tracing::debug!(material = %material_id, error = %e, "movement refused");
                return Err(e);
            }
        };

        tracing::info!(
            material = %material_id,
            transaction = %transaction.id_typed(),
            quantity = %transaction.quantity(),
            new_stock = %material.quantity(),
            "movement recorded"
        );

        Ok(EnrichedTransaction {
            material_name: material.name().to_string(),
            new_stock: Some(material.quantity()),
            transaction,
        })
    }

    /// Read everything an owner holds (materials first, then both logs).
    pub async fn snapshot(&self, owner_id: OwnerId) -> Result<OwnerSnapshot, LedgerError> {
        Ok(OwnerSnapshot {
            materials: self.materials.list(owner_id).await?,
            inward: self.transactions.list_inward(owner_id)?,
            outward: self.transactions.list_outward(owner_id)?,
        })
    }

    /// Enriched records of one kind, newest first.
    pub async fn list(
        &self,
        owner_id: OwnerId,
        kind: TransactionKind,
    ) -> Result<Vec<EnrichedTransaction>, LedgerError> {
        let records = match kind {
            TransactionKind::Inward => self.transactions.list_inward(owner_id)?,
            TransactionKind::Outward => self.transactions.list_outward(owner_id)?,
        };
        let materials = self.materials.list(owner_id).await?;
        let names = material_names(&materials);

        let mut enriched = enrich(records, &names);
        enriched.sort_by(|a, b| b.transaction.date().cmp(&a.transaction.date()));
        Ok(enriched)
    }

    /// Movements of one existing material, oldest first.
    pub async fn history(
        &self,
        owner_id: OwnerId,
        material_id: MaterialId,
    ) -> Result<Vec<EnrichedTransaction>, LedgerError> {
        let material = self.materials.get(owner_id, material_id).await?;
        let records = self.transactions.history(owner_id, material_id)?;
        Ok(records
            .into_iter()
            .map(|transaction| EnrichedTransaction {
                transaction,
                material_name: material.name().to_string(),
                new_stock: None,
            })
            .collect())
    }
}

/// Lookup from material id to display name.
pub fn material_names(materials: &[Material]) -> HashMap<MaterialId, &str> {
    materials.iter().map(|m| (m.id_typed(), m.name())).collect()
}

fn enrich(records: Vec<Transaction>, names: &HashMap<MaterialId, &str>) -> Vec<EnrichedTransaction> {
    records
        .into_iter()
        .map(|transaction| EnrichedTransaction {
            material_name: names
                .get(&transaction.material_id())
                .copied()
                .unwrap_or(UNKNOWN_MATERIAL)
                .to_string(),
            new_stock: None,
            transaction,
        })
        .collect()
}

fn replay(records: Vec<JournalRecord>) -> Result<(Vec<Material>, Vec<Transaction>), LedgerError> {
    let mut materials: HashMap<(OwnerId, MaterialId), Material> = HashMap::new();
    let mut transactions = Vec::new();

    for record in records {
        match record.entry {
            JournalEntry::MaterialCreated { material } => {
                materials.insert((material.owner_id(), material.id_typed()), material);
            }
            JournalEntry::MaterialUpdated { material } => {
                let key = (material.owner_id(), material.id_typed());
                if !materials.contains_key(&key) {
                    return Err(unknown_material(record.sequence, key.1));
                }
                materials.insert(key, material);
            }
            JournalEntry::MaterialDeleted {
                owner_id,
                material_id,
            } => {
                if materials.remove(&(owner_id, material_id)).is_none() {
                    return Err(unknown_material(record.sequence, material_id));
                }
            }
            JournalEntry::MovementApplied {
                material,
                transaction,
            } => {
                let key = (material.owner_id(), material.id_typed());
                if !materials.contains_key(&key) {
                    return Err(unknown_material(record.sequence, key.1));
                }
                materials.insert(key, material);
                transactions.push(transaction);
            }
        }
    }

    Ok((materials.into_values().collect(), transactions))
}

fn unknown_material(sequence: u64, material_id: MaterialId) -> LedgerError {
    LedgerError::internal(format!(
        "journal record {sequence} references unknown material {material_id}"
    ))
}
