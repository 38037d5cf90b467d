//! Customer entity type - CRM record a repair is taken in for

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::{EntityId, EntityPrefix};

/// A customer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: EntityId,

    /// Display name; repairs reference customers by this value
    pub name: String,

    pub phone: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// National id number (cédula)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_number: Option<String>,

    /// Tax id (RNC)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,

    pub signed_up: NaiveDate,
}

impl Entity for Customer {
    const PREFIX: EntityPrefix = EntityPrefix::Cust;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn label(&self) -> String {
        self.name.clone()
    }

    fn created(&self) -> DateTime<Utc> {
        self.signed_up
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc())
            .unwrap_or_else(Utc::now)
    }
}

impl Customer {
    pub fn new(name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Cust),
            name: name.into(),
            phone: phone.into(),
            email: None,
            id_number: None,
            tax_id: None,
            company: None,
            signed_up: Utc::now().date_naive(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_customer_creation() {
        let customer = Customer::new("Mary Johnson", "809-222-3333");
        assert!(customer.id.to_string().starts_with("CUST-"));
        assert_eq!(customer.label(), "Mary Johnson");
        assert_eq!(customer.signed_up, Utc::now().date_naive());
        assert_eq!(customer.file_name(), format!("{}.taller.yaml", customer.id));
    }

    #[test]
    fn test_optional_fields_skipped() {
        let customer = Customer::new("Peter Jones", "849-555-1234");
        let yaml = serde_yml::to_string(&customer).unwrap();
        assert!(!yaml.contains("email"));
        assert!(!yaml.contains("tax_id"));
    }
}
