//! Entity trait - common interface for all document types

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};

use crate::core::identity::{EntityId, EntityPrefix};

/// Common trait for all documents stored in a shop
pub trait Entity: Serialize + DeserializeOwned {
    /// The entity type prefix (e.g., "REP", "CUST")
    const PREFIX: EntityPrefix;

    /// Get the entity's unique ID
    fn id(&self) -> &EntityId;

    /// Human-readable one-line label for listings
    fn label(&self) -> String;

    /// Get the creation timestamp
    fn created(&self) -> DateTime<Utc>;

    /// Filename the entity is stored under
    fn file_name(&self) -> String {
        format!("{}.taller.yaml", self.id())
    }
}
