//! Short ID aliases for easier entity selection
//!
//! Two forms are accepted wherever an id is expected:
//! - Prefixed: `REP@1`, `CUST@3`. Stable once assigned.
//! - Positional: `@2` or `2`, meaning the second row of the last listing.
//!
//! Persisted in `.taller/shortids.json`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

use crate::core::identity::EntityId;
use crate::core::shop::Shop;

const INDEX_FILE: &str = ".taller/shortids.json";

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ShortIdIndex {
    /// "REP@1" -> "REP-01J..."
    entries: BTreeMap<String, String>,
    /// Next number per prefix
    next_ids: BTreeMap<String, u32>,
    /// Ids of the most recent listing, in display order
    #[serde(default)]
    last_list: Vec<String>,
    #[serde(skip)]
    reverse: BTreeMap<String, String>,
}

impl ShortIdIndex {
    pub fn new() -> Self {
        Self::default()
    }

    fn path(shop: &Shop) -> PathBuf {
        shop.root().join(INDEX_FILE)
    }

    /// Load the index for a shop; a missing or unreadable file yields an empty index
    pub fn load(shop: &Shop) -> Self {
        let mut index: ShortIdIndex = fs::read_to_string(Self::path(shop))
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default();
        index.reverse = index
            .entries
            .iter()
            .map(|(k, v)| (v.clone(), k.clone()))
            .collect();
        index
    }

    pub fn save(&self, shop: &Shop) -> std::io::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(Self::path(shop), content)
    }

    /// Assign a prefixed alias if the id has none; returns the alias
    pub fn add(&mut self, id: &EntityId) -> String {
        let full = id.to_string();
        if let Some(existing) = self.reverse.get(&full) {
            return existing.clone();
        }
        let prefix = id.prefix().as_str().to_string();
        let next = self.next_ids.entry(prefix.clone()).or_insert(1);
        let alias = format!("{}@{}", prefix, next);
        *next += 1;
        self.entries.insert(alias.clone(), full.clone());
        self.reverse.insert(full, alias.clone());
        alias
    }

    /// Record a listing: every id gets an alias and positional refs point at this list
    pub fn record_listing<'a>(&mut self, ids: impl IntoIterator<Item = &'a EntityId>) {
        self.last_list.clear();
        for id in ids {
            self.add(id);
            self.last_list.push(id.to_string());
        }
        debug!(rows = self.last_list.len(), "short ids recorded");
    }

    /// Resolve a reference to a full id
    ///
    /// Anything that isn't an alias is passed through unchanged.
    pub fn resolve(&self, reference: &str) -> Option<String> {
        let reference = reference.trim();
        if let Some((prefix, _)) = reference.split_once('@') {
            if !prefix.is_empty() {
                return self.entries.get(&reference.to_uppercase()).cloned();
            }
        }

        let digits = reference.strip_prefix('@').unwrap_or(reference);
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Some(reference.to_string());
        }
        digits
            .parse::<usize>()
            .ok()
            .filter(|n| *n >= 1)
            .and_then(|n| self.last_list.get(n - 1).cloned())
    }

    /// Prefixed alias of a full id (e.g. "REP@1")
    pub fn alias_of(&self, id: &str) -> Option<&str> {
        self.reverse.get(id).map(|s| s.as_str())
    }

    /// Prefixed alias, or the full id when none is assigned
    pub fn display(&self, id: &EntityId) -> String {
        let full = id.to_string();
        self.alias_of(&full).map(str::to_string).unwrap_or(full)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolve a user-supplied reference against the shop's index
pub fn resolve_reference(reference: &str, shop: &Shop) -> Option<String> {
    ShortIdIndex::load(shop).resolve(reference)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::EntityPrefix;
    use tempfile::tempdir;

    #[test]
    fn test_prefixed_aliases_per_entity_type() {
        let mut index = ShortIdIndex::new();
        let r1 = EntityId::new(EntityPrefix::Rep);
        let r2 = EntityId::new(EntityPrefix::Rep);
        let c1 = EntityId::new(EntityPrefix::Cust);

        assert_eq!(index.add(&r1), "REP@1");
        assert_eq!(index.add(&r2), "REP@2");
        assert_eq!(index.add(&c1), "CUST@1");
        assert_eq!(index.add(&r1), "REP@1");

        assert_eq!(index.resolve("REP@2"), Some(r2.to_string()));
        assert_eq!(index.resolve("rep@1"), Some(r1.to_string()));
        assert_eq!(index.resolve("CUST@9"), None);
    }

    #[test]
    fn test_positional_refs_follow_last_listing() {
        let mut index = ShortIdIndex::new();
        let a = EntityId::new(EntityPrefix::Rep);
        let b = EntityId::new(EntityPrefix::Rep);

        index.record_listing([&a, &b]);
        assert_eq!(index.resolve("@2"), Some(b.to_string()));
        assert_eq!(index.resolve("1"), Some(a.to_string()));

        index.record_listing([&b]);
        assert_eq!(index.resolve("@1"), Some(b.to_string()));
        assert_eq!(index.resolve("@2"), None);
        assert_eq!(index.resolve("@0"), None);
        // aliases survive a new listing
        assert_eq!(index.resolve("REP@1"), Some(a.to_string()));
    }

    #[test]
    fn test_passthrough() {
        let index = ShortIdIndex::new();
        assert_eq!(
            index.resolve("REP-01J8Z3K4M5N6P7Q8R9S0T1V2W3"),
            Some("REP-01J8Z3K4M5N6P7Q8R9S0T1V2W3".to_string())
        );
    }

    #[test]
    fn test_save_and_load() {
        let tmp = tempdir().unwrap();
        let shop = Shop::init(tmp.path(), "", false).unwrap();
        let id = EntityId::new(EntityPrefix::Rep);

        let mut index = ShortIdIndex::new();
        index.record_listing([&id]);
        index.save(&shop).unwrap();

        let loaded = ShortIdIndex::load(&shop);
        assert_eq!(loaded.alias_of(&id.to_string()), Some("REP@1"));
        assert_eq!(loaded.resolve("@1"), Some(id.to_string()));
        assert_eq!(resolve_reference("REP@1", &shop), Some(id.to_string()));
    }
}
