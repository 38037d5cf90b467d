//! Shared command context: the open shop, its config and short-id index

use miette::Result;
use tracing::warn;

use crate::cli::GlobalOpts;
use crate::core::identity::EntityId;
use crate::core::shop::Shop;
use crate::core::shortid::ShortIdIndex;
use crate::core::store::YamlDirStore;
use crate::core::workflow::WorkflowEngine;
use crate::core::{Config, Settings, ShopDirectory};

pub struct ShopContext {
    pub shop: Shop,
    pub config: Config,
    pub short_ids: ShortIdIndex,
}

impl ShopContext {
    /// Open the shop named by `--shop` or found from the current directory
    pub fn open(global: &GlobalOpts) -> Result<Self> {
        let shop = match &global.shop {
            Some(path) => Shop::discover_from(path),
            None => Shop::discover(),
        }
        .map_err(|e| miette::miette!("{}", e))?;
        let config = Config::load_for(Some(shop.root()));
        let short_ids = ShortIdIndex::load(&shop);
        Ok(Self {
            shop,
            config,
            short_ids,
        })
    }

    pub fn engine(&self) -> WorkflowEngine<YamlDirStore> {
        WorkflowEngine::new(self.shop.repair_store(), self.config.workflow.clone())
    }

    pub fn settings(&self) -> Settings {
        Settings::new(self.shop.settings_dir())
    }

    pub fn directory(&self) -> ShopDirectory {
        ShopDirectory::new(&self.shop, &self.config)
    }

    /// Resolve `REP@1`, `@1` or a full id
    pub fn resolve(&self, reference: &str) -> String {
        self.short_ids
            .resolve(reference)
            .unwrap_or_else(|| reference.to_string())
    }

    /// Alias for display (REP@N), assigning one if needed
    pub fn alias(&mut self, id: &EntityId) -> String {
        self.short_ids.add(id)
    }

    /// Persist the short-id index; failures are logged, not fatal
    pub fn save_short_ids(&self) {
        if let Err(e) = self.short_ids.save(&self.shop) {
            warn!(error = %e, "could not save short ids");
        }
    }
}
