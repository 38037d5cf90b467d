//! Taller: repair-shop work orders as plain-text documents
//!
//! Tracks device repairs from quote to delivery. Each work order is a YAML
//! document; the workflow engine in [`core::workflow`] owns the lifecycle and
//! the invariants of the nested records.

pub mod cli;
pub mod core;
pub mod entities;
pub mod schema;
pub mod yaml;
