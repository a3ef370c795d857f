use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;

use voltran_core::OwnerId;
use voltran_infra::journal::{FileJournal, InMemoryJournal, Journal};
use voltran_infra::projections::{Dashboard, DashboardAggregator};
use voltran_infra::{LedgerEngine, LedgerError};

use crate::config::AppConfig;

/// Shared state behind every protected route.
#[derive(Debug)]
pub struct AppServices {
    ledger: LedgerEngine,
}

impl AppServices {
    pub fn new(ledger: LedgerEngine) -> Self {
        Self { ledger }
    }

    pub fn ledger(&self) -> &LedgerEngine {
        &self.ledger
    }

    /// Dashboard over a fresh snapshot of the owner's records.
    pub async fn dashboard(&self, owner_id: OwnerId) -> Result<Dashboard, LedgerError> {
        let snapshot = self.ledger.snapshot(owner_id).await?;
        Ok(DashboardAggregator::aggregate(&snapshot, Utc::now()))
    }
}

/// Open the journal named by the config and replay it into a ledger.
pub fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    let journal: Arc<dyn Journal> = match config.journal_path() {
        Some(path) => {
            let journal = FileJournal::open(&path)
                .with_context(|| format!("failed to open journal at {}", path.display()))?;
            Arc::new(journal)
        }
        None => {
            tracing::warn!("VOLTRAN_DATA_DIR not set; ledger is kept in memory only");
            Arc::new(InMemoryJournal::new())
        }
    };

    let ledger = LedgerEngine::open(&config.ledger(), journal).context("failed to restore ledger")?;
    Ok(AppServices::new(ledger))
}
