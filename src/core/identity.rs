//! Entity identity - prefixed ULID identifiers
//!
//! Every document in a shop is keyed by `PREFIX-<ULID>` (e.g. `REP-01J...`).
//! ULIDs sort by creation time, so directory listings come out in intake order.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use ulid::Ulid;

/// Entity type prefixes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityPrefix {
    /// Repair work order
    Rep,
    /// Quote line item (part)
    Part,
    /// Customer
    Cust,
}

impl EntityPrefix {
    /// The prefix as it appears in ids
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityPrefix::Rep => "REP",
            EntityPrefix::Part => "PART",
            EntityPrefix::Cust => "CUST",
        }
    }

    /// Guess the prefix from a document filename like `REP-01J....taller.yaml`
    pub fn from_filename(filename: &str) -> Option<EntityPrefix> {
        filename.split('-').next()?.parse().ok()
    }
}

impl fmt::Display for EntityPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntityPrefix {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "REP" => Ok(EntityPrefix::Rep),
            "PART" => Ok(EntityPrefix::Part),
            "CUST" => Ok(EntityPrefix::Cust),
            _ => Err(IdParseError::UnknownPrefix(s.to_string())),
        }
    }
}

/// Errors from parsing an entity id
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdParseError {
    #[error("Entity id is missing the PREFIX- part: {0}")]
    MissingPrefix(String),

    #[error("Unknown entity prefix: {0}")]
    UnknownPrefix(String),

    #[error("Invalid ULID in entity id: {0}")]
    InvalidUlid(String),
}

/// A prefixed entity identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId {
    prefix: EntityPrefix,
    ulid: Ulid,
}

impl EntityId {
    /// Generate a fresh id for the given entity type
    pub fn new(prefix: EntityPrefix) -> Self {
        Self {
            prefix,
            ulid: Ulid::new(),
        }
    }

    pub fn prefix(&self) -> EntityPrefix {
        self.prefix
    }

    pub fn ulid(&self) -> Ulid {
        self.ulid
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.prefix, self.ulid)
    }
}

impl FromStr for EntityId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (prefix, ulid) = s
            .split_once('-')
            .ok_or_else(|| IdParseError::MissingPrefix(s.to_string()))?;
        let prefix: EntityPrefix = prefix.parse()?;
        let ulid = Ulid::from_string(ulid).map_err(|_| IdParseError::InvalidUlid(s.to_string()))?;
        Ok(Self { prefix, ulid })
    }
}

impl Serialize for EntityId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
