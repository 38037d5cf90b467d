//! Shop discovery and layout
//!
//! A shop is a directory containing a `.taller/` marker. Repairs, customers
//! and settings live in plain subdirectories next to it.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::store::YamlDirStore;

#[derive(Debug, Error)]
pub enum ShopError {
    #[error("Not inside a taller shop (searched up from {searched}). Run `taller init` first")]
    NotFound { searched: PathBuf },

    #[error("Shop already initialized at {0}")]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// An initialized shop directory
#[derive(Debug, Clone)]
pub struct Shop {
    root: PathBuf,
}

impl Shop {
    pub const MARKER_DIR: &'static str = ".taller";
    pub const CONFIG_FILE: &'static str = ".taller/config.yaml";
    pub const REPAIRS_DIR: &'static str = "repairs";
    pub const CUSTOMERS_DIR: &'static str = "customers";
    pub const SETTINGS_DIR: &'static str = "settings";

    /// Find the shop containing the current directory
    pub fn discover() -> Result<Self, ShopError> {
        let cwd = std::env::current_dir()?;
        Self::discover_from(&cwd)
    }

    /// Walk up from `start` until a directory with `.taller/` is found
    pub fn discover_from(start: &Path) -> Result<Self, ShopError> {
        start
            .ancestors()
            .find(|dir| dir.join(Self::MARKER_DIR).is_dir())
            .map(|root| Shop {
                root: root.to_path_buf(),
            })
            .ok_or_else(|| ShopError::NotFound {
                searched: start.to_path_buf(),
            })
    }

    /// Create the shop layout at `root`
    pub fn init(root: &Path, config_yaml: &str, force: bool) -> Result<Self, ShopError> {
        let marker = root.join(Self::MARKER_DIR);
        if marker.is_dir() && !force {
            return Err(ShopError::AlreadyExists(root.to_path_buf()));
        }

        fs::create_dir_all(&marker)?;
        for dir in [Self::REPAIRS_DIR, Self::CUSTOMERS_DIR, Self::SETTINGS_DIR] {
            fs::create_dir_all(root.join(dir))?;
        }
        let config_path = root.join(Self::CONFIG_FILE);
        if !config_path.exists() || force {
            fs::write(&config_path, config_yaml)?;
        }

        Ok(Shop {
            root: root.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn repairs_dir(&self) -> PathBuf {
        self.root.join(Self::REPAIRS_DIR)
    }

    pub fn customers_dir(&self) -> PathBuf {
        self.root.join(Self::CUSTOMERS_DIR)
    }

    pub fn settings_dir(&self) -> PathBuf {
        self.root.join(Self::SETTINGS_DIR)
    }

    /// Directory-backed store for this shop's repairs
    pub fn repair_store(&self) -> YamlDirStore {
        YamlDirStore::new(self.repairs_dir())
    }
}
