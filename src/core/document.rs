//! YAML document helpers - field-level merge on stored repair documents
//!
//! Stores keep repairs as raw YAML mappings so a write only touches the keys
//! it names. Keys the typed model doesn't know about survive a merge.

use serde::{de::DeserializeOwned, Serialize};
use serde_yml::{Mapping, Value};

use crate::core::store::StoreError;
use crate::entities::repair::RepairField;

fn key(field: RepairField) -> Value {
    Value::String(field.key().to_string())
}

/// Serialize a typed entity into a document mapping
pub fn to_document<T: Serialize>(entity: &T) -> Result<Mapping, StoreError> {
    let value = serde_yml::to_value(entity).map_err(|e| StoreError::Yaml {
        message: e.to_string(),
    })?;
    match value {
        Value::Mapping(map) => Ok(map),
        _ => Err(StoreError::Yaml {
            message: "entity did not serialize to a mapping".to_string(),
        }),
    }
}

/// Deserialize a document mapping back into the typed entity
pub fn from_document<T: DeserializeOwned>(id: &str, doc: &Mapping) -> Result<T, StoreError> {
    serde_yml::from_value(Value::Mapping(doc.clone())).map_err(|e| StoreError::Corrupt {
        id: id.to_string(),
        message: e.to_string(),
    })
}

/// Current revision of a document (documents written before revisions existed count as 1)
pub fn revision(doc: &Mapping) -> u64 {
    doc.get(key(RepairField::Revision))
        .and_then(Value::as_u64)
        .unwrap_or(1)
}

/// Increment the revision and return the new value
pub fn bump_revision(doc: &mut Mapping) -> u64 {
    let next = revision(doc) + 1;
    doc.insert(key(RepairField::Revision), Value::Number(next.into()));
    next
}

/// Overwrite the given top-level fields, leaving all others untouched
pub fn merge_fields(doc: &mut Mapping, fields: &[(RepairField, Value)]) {
    for (field, value) in fields {
        if value.is_null() {
            doc.remove(key(*field));
        } else {
            doc.insert(key(*field), value.clone());
        }
    }
}

/// Push an item onto a sequence field, creating the sequence if absent
pub fn append_item(doc: &mut Mapping, field: RepairField, item: Value) -> Result<(), StoreError> {
    let entry = doc
        .entry(key(field))
        .or_insert_with(|| Value::Sequence(Vec::new()));
    if entry.is_null() {
        *entry = Value::Sequence(Vec::new());
    }
    match entry.as_sequence_mut() {
        Some(seq) => {
            seq.push(item);
            Ok(())
        }
        None => Err(StoreError::Yaml {
            message: format!("field '{}' is not a sequence", field.key()),
        }),
    }
}
