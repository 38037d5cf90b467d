//! Configuration - user and shop settings layered together
//!
//! Sources, lowest precedence first:
//! 1. `<config_dir>/taller/config.yaml` (per user)
//! 2. `<shop>/.taller/config.yaml`
//! 3. `TALLER_AUTHOR` environment variable (author only)

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use serde_yml::{Mapping, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::core::shop::Shop;
use crate::core::workflow::WorkflowConfig;
use crate::entities::repair::NO_TECHNICIAN;

/// Environment variable overriding the configured author
pub const AUTHOR_ENV: &str = "TALLER_AUTHOR";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Staff member using this machine; pre-selected as technician at intake
    pub author: Option<String>,

    /// Technicians who can be assigned to repairs
    pub technicians: Vec<String>,

    pub workflow: WorkflowConfig,
}

impl Config {
    /// Load config for an explicit shop root
    pub fn load_for(shop_root: Option<&Path>) -> Self {
        let mut merged = Mapping::new();
        let sources = [
            Self::user_config_path(),
            shop_root.map(|root| root.join(Shop::CONFIG_FILE)),
        ];
        for path in sources.into_iter().flatten() {
            if let Some(layer) = read_layer(&path) {
                debug!(path = %path.display(), "config layer loaded");
                merge_mapping(&mut merged, layer);
            }
        }

        let mut config: Config = match serde_yml::from_value(Value::Mapping(merged)) {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %e, "invalid configuration; using defaults");
                Config::default()
            }
        };
        if let Ok(author) = std::env::var(AUTHOR_ENV) {
            if !author.trim().is_empty() {
                config.author = Some(author.trim().to_string());
            }
        }
        config
    }

    /// Path of the per-user config file
    pub fn user_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "taller").map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Author name, falling back to the login name
    pub fn author(&self) -> String {
        self.author
            .clone()
            .filter(|a| !a.trim().is_empty())
            .or_else(|| std::env::var("USER").ok())
            .or_else(|| std::env::var("USERNAME").ok())
            .unwrap_or_else(|| "unknown".to_string())
    }

    /// Configured technicians without blanks, duplicates or the sentinel
    pub fn technicians(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for name in &self.technicians {
            let name = name.trim();
            if name.is_empty() || name == NO_TECHNICIAN {
                continue;
            }
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
        names
    }
}

fn read_layer(path: &Path) -> Option<Mapping> {
    let content = fs::read_to_string(path).ok()?;
    match serde_yml::from_str::<Value>(&content) {
        Ok(Value::Mapping(map)) => Some(map),
        Ok(Value::Null) => None,
        Ok(_) => {
            warn!(path = %path.display(), "config file is not a mapping; ignored");
            None
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "config file unreadable; ignored");
            None
        }
    }
}

/// Deep-merge `overlay` into `base`; nested mappings merge, everything else replaces
fn merge_mapping(base: &mut Mapping, overlay: Mapping) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(Value::Mapping(existing)), Value::Mapping(incoming)) => {
                merge_mapping(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}
