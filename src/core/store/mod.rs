//! Persistence port for repair documents
//!
//! The workflow engine only talks to a [`RepairStore`]. Adapters decide where
//! documents live; both shipped adapters merge writes at the level of
//! top-level document fields and bump a per-document revision on every write.

pub mod memory;
pub mod yaml;

use serde_yml::Value;
use thiserror::Error;

use crate::entities::repair::{Repair, RepairField};

pub use memory::MemoryStore;
pub use yaml::YamlDirStore;

/// Errors raised by store adapters
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Repair not found: {id}")]
    NotFound { id: String },

    #[error("Repair already exists: {id}")]
    AlreadyExists { id: String },

    #[error("Revision conflict on {id}: expected {expected}, found {actual}")]
    Conflict { id: String, expected: u64, actual: u64 },

    #[error("Stored document {id} is unreadable: {message}")]
    Corrupt { id: String, message: String },

    #[error("YAML error: {message}")]
    Yaml { message: String },

    #[error("Store lock poisoned")]
    Poisoned,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A field-level update of one repair document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Patch {
    /// Top-level fields to overwrite (a null value removes the field)
    pub fields: Vec<(RepairField, Value)>,

    /// Reject the write unless the stored revision equals this
    pub expected_revision: Option<u64>,
}

impl Patch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field to the patch
    pub fn set(mut self, field: RepairField, value: Value) -> Self {
        self.fields.push((field, value));
        self
    }

    /// Guard the patch with an expected revision
    pub fn if_revision(mut self, revision: u64) -> Self {
        self.expected_revision = Some(revision);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A document collection of repairs keyed by id
pub trait RepairStore {
    /// Fetch one repair
    fn get(&self, id: &str) -> Result<Repair, StoreError>;

    /// Every repair in the collection
    fn list(&self) -> Result<Vec<Repair>, StoreError>;

    /// Insert a new repair; fails if the id is taken
    fn create(&self, repair: &Repair) -> Result<(), StoreError>;

    /// Merge the patch into the stored document and return the new state
    fn patch(&self, id: &str, patch: &Patch) -> Result<Repair, StoreError>;

    /// Atomically push `item` onto the sequence field and return the new state
    ///
    /// With `expected_revision` set, the push only happens if the stored
    /// revision still matches.
    fn append(
        &self,
        id: &str,
        field: RepairField,
        item: Value,
        expected_revision: Option<u64>,
    ) -> Result<Repair, StoreError>;
}

impl<S: RepairStore + ?Sized> RepairStore for &S {
    fn get(&self, id: &str) -> Result<Repair, StoreError> {
        (**self).get(id)
    }

    fn list(&self) -> Result<Vec<Repair>, StoreError> {
        (**self).list()
    }

    fn create(&self, repair: &Repair) -> Result<(), StoreError> {
        (**self).create(repair)
    }

    fn patch(&self, id: &str, patch: &Patch) -> Result<Repair, StoreError> {
        (**self).patch(id, patch)
    }

    fn append(
        &self,
        id: &str,
        field: RepairField,
        item: Value,
        expected_revision: Option<u64>,
    ) -> Result<Repair, StoreError> {
        (**self).append(id, field, item, expected_revision)
    }
}

impl<S: RepairStore + ?Sized> RepairStore for Box<S> {
    fn get(&self, id: &str) -> Result<Repair, StoreError> {
        (**self).get(id)
    }

    fn list(&self) -> Result<Vec<Repair>, StoreError> {
        (**self).list()
    }

    fn create(&self, repair: &Repair) -> Result<(), StoreError> {
        (**self).create(repair)
    }

    fn patch(&self, id: &str, patch: &Patch) -> Result<Repair, StoreError> {
        (**self).patch(id, patch)
    }

    fn append(
        &self,
        id: &str,
        field: RepairField,
        item: Value,
        expected_revision: Option<u64>,
    ) -> Result<Repair, StoreError> {
        (**self).append(id, field, item, expected_revision)
    }
}

/// Check an optimistic-concurrency guard against a stored revision
pub(crate) fn check_revision(
    id: &str,
    expected_revision: Option<u64>,
    actual: u64,
) -> Result<(), StoreError> {
    match expected_revision {
        Some(expected) if expected != actual => Err(StoreError::Conflict {
            id: id.to_string(),
            expected,
            actual,
        }),
        _ => Ok(()),
    }
}
