//! Owner-scoped material storage with per-material exclusive access.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tokio::sync::{OwnedRwLockWriteGuard, RwLock as AsyncRwLock};

use voltran_core::entity::Owned;
use voltran_core::{MaterialId, OwnerId};
use voltran_inventory::{Material, MaterialDraft, MaterialPatch};

use crate::error::LedgerError;
use crate::journal::{Journal, JournalEntry};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
struct SlotKey {
    owner_id: OwnerId,
    material_id: MaterialId,
}

/// One material behind its own lock.
///
/// `None` marks a slot whose material was deleted while a writer was queued on it.
type Slot = Arc<AsyncRwLock<Option<Material>>>;

/// Authoritative set of materials.
///
/// The index is a plain `RwLock` held only for map lookups; each material sits
/// behind its own async lock. Readers take the read side of that lock, every
/// mutation takes the write side with a bounded wait, so writes to one
/// material never block reads or writes of another.
pub struct MaterialRepository {
    slots: RwLock<HashMap<SlotKey, Slot>>,
    journal: Arc<dyn Journal>,
    lock_timeout: Duration,
}

impl std::fmt::Debug for MaterialRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MaterialRepository")
            .field("lock_timeout", &self.lock_timeout)
            .finish_non_exhaustive()
    }
}

impl MaterialRepository {
    pub fn new(journal: Arc<dyn Journal>, lock_timeout: Duration) -> Self {
        Self {
            slots: RwLock::new(HashMap::new()),
            journal,
            lock_timeout,
        }
    }

    /// Rebuild from already-committed materials (journal replay).
    pub(crate) fn restored(
        journal: Arc<dyn Journal>,
        lock_timeout: Duration,
        materials: impl IntoIterator<Item = Material>,
    ) -> Self {
        let slots = materials
            .into_iter()
            .map(|m| {
                let key = SlotKey {
                    owner_id: m.owner_id(),
                    material_id: m.id_typed(),
                };
                (key, Arc::new(AsyncRwLock::new(Some(m))))
            })
            .collect();

        Self {
            slots: RwLock::new(slots),
            journal,
            lock_timeout,
        }
    }

    fn slot(&self, owner_id: OwnerId, material_id: MaterialId) -> Result<Slot, LedgerError> {
        let slots = self
            .slots
            .read()
            .map_err(|_| LedgerError::poisoned("material index"))?;
        slots
            .get(&SlotKey {
                owner_id,
                material_id,
            })
            .cloned()
            .ok_or(LedgerError::NotFound)
    }

    /// Wait (bounded) for exclusive access to one material.
    async fn lock(
        &self,
        owner_id: OwnerId,
        material_id: MaterialId,
    ) -> Result<MaterialGuard, LedgerError> {
        let slot = self.slot(owner_id, material_id)?;
        let guard = tokio::time::timeout(self.lock_timeout, slot.write_owned())
            .await
            .map_err(|_| {
                tracing::warn!(
                    owner = %owner_id,
                    material = %material_id,
                    timeout_ms = self.lock_timeout.as_millis() as u64,
                    "timed out waiting for material lock"
                );
                LedgerError::Busy
            })?;

        if guard.is_none() {
            // Deleted while we were queued.
            return Err(LedgerError::NotFound);
        }
        Ok(MaterialGuard { guard })
    }

    /// All materials of one owner, ordered by id (creation order).
    pub async fn list(&self, owner_id: OwnerId) -> Result<Vec<Material>, LedgerError> {
        let owned: Vec<Slot> = self
            .slots
            .read()
            .map_err(|_| LedgerError::poisoned("material index"))?
            .iter()
            .filter(|(k, _)| k.owner_id == owner_id)
            .map(|(_, s)| s.clone())
            .collect();

        let mut out = Vec::with_capacity(owned.len());
        for slot in owned {
            if let Some(m) = slot.read().await.as_ref() {
                out.push(m.clone());
            }
        }
        out.sort_by_key(|m| m.id_typed());
        Ok(out)
    }

    pub async fn get(&self, owner_id: OwnerId, material_id: MaterialId) -> Result<Material, LedgerError> {
        let slot = self.slot(owner_id, material_id)?;
        let current = slot.read().await;
        current.clone().ok_or(LedgerError::NotFound)
    }

    pub async fn create(
        &self,
        owner_id: OwnerId,
        draft: MaterialDraft,
        now: DateTime<Utc>,
    ) -> Result<Material, LedgerError> {
        let material = Material::create(MaterialId::new(), owner_id, draft, now)?;

        self.journal.append(JournalEntry::MaterialCreated {
            material: material.clone(),
        })?;

        let key = SlotKey {
            owner_id,
            material_id: material.id_typed(),
        };
        self.slots
            .write()
            .map_err(|_| LedgerError::poisoned("material index"))?
            .insert(key, Arc::new(AsyncRwLock::new(Some(material.clone()))));

        tracing::info!(owner = %owner_id, material = %key.material_id, name = material.name(), "material created");
        Ok(material)
    }

    pub async fn update(
        &self,
        owner_id: OwnerId,
        material_id: MaterialId,
        patch: MaterialPatch,
        now: DateTime<Utc>,
    ) -> Result<Material, LedgerError> {
        let mut guard = self.lock(owner_id, material_id).await?;
        let updated = guard.current().patched(&patch, now)?;

        self.journal.append(JournalEntry::MaterialUpdated {
            material: updated.clone(),
        })?;
        guard.commit(updated.clone());

        if patch.corrects_quantity() {
            tracing::info!(
                owner = %owner_id,
                material = %material_id,
                quantity = %updated.quantity(),
                "manual stock correction"
            );
        }
        Ok(updated)
    }

    pub async fn delete(&self, owner_id: OwnerId, material_id: MaterialId) -> Result<Material, LedgerError> {
        let mut guard = self.lock(owner_id, material_id).await?;
        let removed = guard.current().clone();

        self.journal.append(JournalEntry::MaterialDeleted {
            owner_id,
            material_id,
        })?;

        guard.guard.take();
        self.slots
            .write()
            .map_err(|_| LedgerError::poisoned("material index"))?
            .remove(&SlotKey {
                owner_id,
                material_id,
            });

        tracing::info!(owner = %owner_id, material = %material_id, "material deleted");
        Ok(removed)
    }

    /// Add `delta` to a material's stock and run `append` inside the same
    /// exclusive section.
    ///
    /// `append` receives the updated material before it becomes visible; the
    /// update is committed only if `append` succeeds. Concurrent calls for the
    /// same material are totally ordered.
    pub(crate) async fn apply_quantity_delta<T>(
        &self,
        owner_id: OwnerId,
        material_id: MaterialId,
        delta: Decimal,
        now: DateTime<Utc>,
        append: impl FnOnce(&Material) -> Result<T, LedgerError>,
    ) -> Result<(Material, T), LedgerError> {
        let mut guard = self.lock(owner_id, material_id).await?;
        let updated = guard.current().apply_delta(delta, now)?;
        let appended = append(&updated)?;
        guard.commit(updated.clone());
        Ok((updated, appended))
    }
}

/// Exclusive access to one live material.
struct MaterialGuard {
    guard: OwnedRwLockWriteGuard<Option<Material>>,
}

impl MaterialGuard {
    fn current(&self) -> &Material {
        // `lock` only hands out guards over live slots.
        self.guard
            .as_ref()
            .unwrap_or_else(|| unreachable!("material guard over a deleted slot"))
    }

    fn commit(&mut self, material: Material) {
        *self.guard = Some(material);
    }
}
