//! In-memory repair store

use serde_yml::{Mapping, Value};
use std::collections::BTreeMap;
use std::sync::Mutex;
use tracing::debug;

use crate::core::document::{append_item, bump_revision, from_document, merge_fields, revision, to_document};
use crate::core::store::{check_revision, Patch, RepairStore, StoreError};
use crate::entities::repair::{Repair, RepairField};

/// Mutex-guarded map of repair documents
///
/// Holds documents in their YAML form so merges behave exactly like the
/// on-disk store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: Mutex<BTreeMap<String, Mapping>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-loaded with repairs
    pub fn with_repairs(repairs: impl IntoIterator<Item = Repair>) -> Result<Self, StoreError> {
        let store = Self::new();
        for repair in repairs {
            store.create(&repair)?;
        }
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.docs.lock().map(|d| d.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RepairStore for MemoryStore {
    fn get(&self, id: &str) -> Result<Repair, StoreError> {
        let docs = self.docs.lock().map_err(|_| StoreError::Poisoned)?;
        let doc = docs.get(id).ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;
        from_document(id, doc)
    }

    fn list(&self) -> Result<Vec<Repair>, StoreError> {
        let docs = self.docs.lock().map_err(|_| StoreError::Poisoned)?;
        docs.iter().map(|(id, doc)| from_document(id, doc)).collect()
    }

    fn create(&self, repair: &Repair) -> Result<(), StoreError> {
        let id = repair.id.to_string();
        let doc = to_document(repair)?;
        let mut docs = self.docs.lock().map_err(|_| StoreError::Poisoned)?;
        if docs.contains_key(&id) {
            return Err(StoreError::AlreadyExists { id });
        }
        debug!(%id, "memory store: create");
        docs.insert(id, doc);
        Ok(())
    }

    fn patch(&self, id: &str, patch: &Patch) -> Result<Repair, StoreError> {
        let mut docs = self.docs.lock().map_err(|_| StoreError::Poisoned)?;
        let doc = docs
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;
        check_revision(id, patch.expected_revision, revision(doc))?;

        // Validate against a scratch copy so a bad patch leaves the document untouched
        let mut updated = doc.clone();
        merge_fields(&mut updated, &patch.fields);
        let rev = bump_revision(&mut updated);
        let repair: Repair = from_document(id, &updated)?;

        *doc = updated;
        debug!(%id, revision = rev, fields = patch.fields.len(), "memory store: patch");
        Ok(repair)
    }

    fn append(
        &self,
        id: &str,
        field: RepairField,
        item: Value,
        expected_revision: Option<u64>,
    ) -> Result<Repair, StoreError> {
        let mut docs = self.docs.lock().map_err(|_| StoreError::Poisoned)?;
        let doc = docs
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;
        check_revision(id, expected_revision, revision(doc))?;

        let mut updated = doc.clone();
        append_item(&mut updated, field, item)?;
        let rev = bump_revision(&mut updated);
        let repair: Repair = from_document(id, &updated)?;

        *doc = updated;
        debug!(%id, revision = rev, field = field.key(), "memory store: append");
        Ok(repair)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::repair::{DeviceType, RepairStatus};

    fn sample() -> Repair {
        Repair::new("John Doe", DeviceType::Celular, "Apple iPhone 14", "Pantalla rota y no carga")
    }

    #[test]
    fn test_create_and_get() {
        let store = MemoryStore::new();
        let repair = sample();
        store.create(&repair).unwrap();

        assert_eq!(store.get(&repair.id.to_string()).unwrap(), repair);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_create_duplicate_fails() {
        let store = MemoryStore::new();
        let repair = sample();
        store.create(&repair).unwrap();
        assert!(matches!(
            store.create(&repair),
            Err(StoreError::AlreadyExists { .. })
        ));
    }

    #[test]
    fn test_get_unknown_is_not_found() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.get("REP-NOPE"),
            Err(StoreError::NotFound { .. })
        ));
    }

    #[test]
    fn test_patch_bumps_revision() {
        let store = MemoryStore::new();
        let repair = sample();
        let id = repair.id.to_string();
        store.create(&repair).unwrap();

        let patch = Patch::new().set(RepairField::Status, Value::String("Confirmado".into()));
        let updated = store.patch(&id, &patch).unwrap();

        assert_eq!(updated.status, RepairStatus::Confirmado);
        assert_eq!(updated.revision, 2);
        assert_eq!(updated.customer, repair.customer);
    }

    #[test]
    fn test_patch_with_stale_revision_conflicts() {
        let store = MemoryStore::new();
        let repair = sample();
        let id = repair.id.to_string();
        store.create(&repair).unwrap();

        store
            .patch(&id, &Patch::new().set(RepairField::Device, Value::String("iPhone 15".into())))
            .unwrap();

        let stale = Patch::new()
            .set(RepairField::Device, Value::String("iPhone 13".into()))
            .if_revision(1);
        assert!(matches!(
            store.patch(&id, &stale),
            Err(StoreError::Conflict { expected: 1, actual: 2, .. })
        ));
        assert_eq!(store.get(&id).unwrap().device, "iPhone 15");
    }

    #[test]
    fn test_invalid_patch_leaves_document_untouched() {
        let store = MemoryStore::new();
        let repair = sample();
        let id = repair.id.to_string();
        store.create(&repair).unwrap();

        let bad = Patch::new().set(RepairField::Status, Value::String("Pendiente".into()));
        assert!(matches!(store.patch(&id, &bad), Err(StoreError::Corrupt { .. })));
        assert_eq!(store.get(&id).unwrap(), repair);
    }
}
