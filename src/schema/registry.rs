//! Schema registry - embedded JSON schemas for stored documents

use rust_embed::Embed;
use serde_json::Value;
use std::collections::HashMap;
use tracing::warn;

use crate::core::EntityPrefix;

#[derive(Embed)]
#[folder = "schemas/"]
struct EmbeddedSchemas;

/// Document types that live in their own file; parts only exist inside a quote
const STORED: [EntityPrefix; 2] = [EntityPrefix::Rep, EntityPrefix::Cust];

/// Parsed JSON schemas keyed by document prefix
pub struct SchemaRegistry {
    schemas: HashMap<EntityPrefix, Value>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        let schemas = STORED
            .into_iter()
            .filter_map(|prefix| {
                let file = Self::file_name(prefix);
                let embedded = EmbeddedSchemas::get(&file)?;
                match serde_json::from_slice::<Value>(&embedded.data) {
                    Ok(schema) => Some((prefix, schema)),
                    Err(e) => {
                        warn!(%file, error = %e, "embedded schema is not valid JSON");
                        None
                    }
                }
            })
            .collect();
        Self { schemas }
    }

    /// `rep.schema.json` for `REP`
    pub fn file_name(prefix: EntityPrefix) -> String {
        format!("{}.schema.json", prefix.as_str().to_lowercase())
    }

    pub fn get(&self, prefix: EntityPrefix) -> Option<&Value> {
        self.schemas.get(&prefix)
    }

    pub fn has_schema(&self, prefix: EntityPrefix) -> bool {
        self.schemas.contains_key(&prefix)
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}
