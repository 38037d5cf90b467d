//! Core module - fundamental types and utilities

pub mod config;
pub mod directory;
pub mod document;
pub mod entity;
pub mod identity;
pub mod settings;
pub mod shop;
pub mod shortid;
pub mod store;
pub mod workflow;

pub use config::Config;
pub use directory::{Directory, DirectoryError, ShopDirectory};
pub use entity::Entity;
pub use identity::{EntityId, EntityPrefix, IdParseError};
pub use settings::{BadgeVariant, DeviceCatalog, Settings, StatusStyles, COMMON_PROBLEMS};
pub use shop::{Shop, ShopError};
pub use shortid::ShortIdIndex;
pub use store::{MemoryStore, Patch, RepairStore, StoreError, YamlDirStore};
pub use workflow::{
    ErrorKind, FieldUpdate, RepairFilter, RepairIntake, StatusPolicy, WorkflowConfig,
    WorkflowEngine, WorkflowError,
};
