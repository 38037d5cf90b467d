//! CLI command implementations

pub mod completions;
pub mod customer;
pub mod init;
pub mod repair;
pub mod settings;
pub mod validate;
