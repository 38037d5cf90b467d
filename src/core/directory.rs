//! Directory of technicians and customers
//!
//! Supplies the choices offered when filling in a repair. The workflow engine
//! never consults it; assignment is a plain field write.

use std::fs;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::core::config::Config;
use crate::core::entity::Entity;
use crate::core::shop::Shop;
use crate::core::store::yaml::DOCUMENT_SUFFIX;
use crate::entities::customer::Customer;
use crate::entities::repair::NO_TECHNICIAN;
use crate::yaml::{parse_yaml_file, YamlError};

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("Customer already exists: {0}")]
    AlreadyExists(String),

    #[error("Customer not found: {0}")]
    NotFound(String),

    #[error("Invalid customer {field}: {message}")]
    Validation { field: String, message: String },

    #[error(transparent)]
    Yaml(#[from] YamlError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Source of assignable technicians and known customers
pub trait Directory {
    /// Technician choices, `"No Asignado"` first
    fn technicians(&self) -> Vec<String>;

    /// Known customers sorted by name
    fn customers(&self) -> Result<Vec<Customer>, DirectoryError>;
}

/// Directory backed by shop config and the `customers/` folder
#[derive(Debug, Clone)]
pub struct ShopDirectory {
    technicians: Vec<String>,
    customers_dir: PathBuf,
}

impl ShopDirectory {
    pub fn new(shop: &Shop, config: &Config) -> Self {
        Self {
            technicians: config.technicians(),
            customers_dir: shop.customers_dir(),
        }
    }

    /// Store a new customer document
    pub fn add_customer(&self, customer: &Customer) -> Result<PathBuf, DirectoryError> {
        if customer.name.trim().chars().count() < 2 {
            return Err(DirectoryError::Validation {
                field: "name".to_string(),
                message: "must have at least 2 characters".to_string(),
            });
        }
        if customer.phone.trim().is_empty() {
            return Err(DirectoryError::Validation {
                field: "phone".to_string(),
                message: "must not be empty".to_string(),
            });
        }

        fs::create_dir_all(&self.customers_dir)?;
        let path = self.customers_dir.join(customer.file_name());
        if path.exists() {
            return Err(DirectoryError::AlreadyExists(customer.id.to_string()));
        }
        let content = serde_yml::to_string(customer)
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        fs::write(&path, content)?;
        debug!(id = %customer.id, path = %path.display(), "customer written");
        Ok(path)
    }

    /// Look up a customer by full id
    pub fn customer(&self, id: &str) -> Result<Customer, DirectoryError> {
        let path = self.customers_dir.join(format!("{}{}", id, DOCUMENT_SUFFIX));
        if !path.is_file() {
            return Err(DirectoryError::NotFound(id.to_string()));
        }
        Ok(parse_yaml_file(&path)?)
    }
}

impl Directory for ShopDirectory {
    fn technicians(&self) -> Vec<String> {
        std::iter::once(NO_TECHNICIAN.to_string())
            .chain(self.technicians.iter().cloned())
            .collect()
    }

    fn customers(&self) -> Result<Vec<Customer>, DirectoryError> {
        if !self.customers_dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut customers = Vec::new();
        for entry in WalkDir::new(&self.customers_dir)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| e.file_name().to_string_lossy().ends_with(DOCUMENT_SUFFIX))
        {
            match parse_yaml_file::<Customer>(entry.path()) {
                Ok(customer) => customers.push(customer),
                Err(e) => warn!(path = %entry.path().display(), error = %e, "skipping customer file"),
            }
        }
        customers.sort_by_key(|c| c.name.to_lowercase());
        Ok(customers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn directory(technicians: &[&str]) -> (tempfile::TempDir, ShopDirectory) {
        let tmp = tempdir().unwrap();
        let shop = Shop::init(tmp.path(), "", false).unwrap();
        let config = Config {
            technicians: technicians.iter().map(|t| t.to_string()).collect(),
            ..Default::default()
        };
        let dir = ShopDirectory::new(&shop, &config);
        (tmp, dir)
    }

    #[test]
    fn test_technicians_start_with_sentinel() {
        let (_tmp, dir) = directory(&["David Williams", "Juan Perez"]);
        assert_eq!(
            dir.technicians(),
            vec![NO_TECHNICIAN, "David Williams", "Juan Perez"]
        );
    }

    #[test]
    fn test_customers_sorted_by_name() {
        let (_tmp, dir) = directory(&[]);
        dir.add_customer(&Customer::new("Zoe Martinez", "809-555-0101")).unwrap();
        dir.add_customer(&Customer::new("ana gomez", "809-555-0102")).unwrap();

        let names: Vec<String> = dir.customers().unwrap().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["ana gomez", "Zoe Martinez"]);
    }

    #[test]
    fn test_customer_lookup() {
        let (_tmp, dir) = directory(&[]);
        let customer = Customer::new("Jane Smith", "809-555-0199");
        dir.add_customer(&customer).unwrap();

        assert_eq!(dir.customer(&customer.id.to_string()).unwrap(), customer);
        assert!(matches!(
            dir.customer("CUST-NOPE"),
            Err(DirectoryError::NotFound(_))
        ));
    }

    #[test]
    fn test_customer_validation() {
        let (_tmp, dir) = directory(&[]);
        assert!(matches!(
            dir.add_customer(&Customer::new("J", "809-555-0101")),
            Err(DirectoryError::Validation { .. })
        ));
        assert!(matches!(
            dir.add_customer(&Customer::new("Jane", " ")),
            Err(DirectoryError::Validation { .. })
        ));
    }
}
