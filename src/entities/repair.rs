//! Repair entity type - one work order for one physical device

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::entities::functionality::FunctionalityTest;
use crate::entities::quote::Quote;

/// Technician value meaning "nobody assigned yet"
pub const NO_TECHNICIAN: &str = "No Asignado";

/// Repair lifecycle stage
///
/// Ordered: a repair only ever moves one step to the right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[derive(Default)]
pub enum RepairStatus {
    #[default]
    #[serde(rename = "Cotización")]
    Cotizacion,
    #[serde(rename = "Confirmado")]
    Confirmado,
    #[serde(rename = "En Reparación")]
    EnReparacion,
    #[serde(rename = "Reparado")]
    Reparado,
    #[serde(rename = "Entregado")]
    Entregado,
}

impl RepairStatus {
    /// All statuses in lifecycle order
    pub const ALL: [RepairStatus; 5] = [
        RepairStatus::Cotizacion,
        RepairStatus::Confirmado,
        RepairStatus::EnReparacion,
        RepairStatus::Reparado,
        RepairStatus::Entregado,
    ];

    /// The fixed successor, or `None` at `Entregado`
    pub fn next(&self) -> Option<RepairStatus> {
        match self {
            RepairStatus::Cotizacion => Some(RepairStatus::Confirmado),
            RepairStatus::Confirmado => Some(RepairStatus::EnReparacion),
            RepairStatus::EnReparacion => Some(RepairStatus::Reparado),
            RepairStatus::Reparado => Some(RepairStatus::Entregado),
            RepairStatus::Entregado => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.next().is_none()
    }

    /// Position in the lifecycle (0-based)
    pub fn index(&self) -> usize {
        Self::ALL.iter().position(|s| s == self).unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RepairStatus::Cotizacion => "Cotización",
            RepairStatus::Confirmado => "Confirmado",
            RepairStatus::EnReparacion => "En Reparación",
            RepairStatus::Reparado => "Reparado",
            RepairStatus::Entregado => "Entregado",
        }
    }

    /// Label of the action that moves a repair out of this status
    pub fn advance_label(&self) -> Option<&'static str> {
        match self {
            RepairStatus::Cotizacion => Some("Confirmar Reparación"),
            RepairStatus::Confirmado => Some("Iniciar Reparación"),
            RepairStatus::EnReparacion => Some("Marcar como Reparado"),
            RepairStatus::Reparado => Some("Marcar como Entregado"),
            RepairStatus::Entregado => None,
        }
    }
}

impl std::fmt::Display for RepairStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RepairStatus {
    type Err = String;

    /// Accepts the display names, with or without accents, or kebab/snake case
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .to_lowercase()
            .replace(['-', '_'], " ")
            .replace('ó', "o");
        match normalized.as_str() {
            "cotizacion" => Ok(RepairStatus::Cotizacion),
            "confirmado" => Ok(RepairStatus::Confirmado),
            "en reparacion" => Ok(RepairStatus::EnReparacion),
            "reparado" => Ok(RepairStatus::Reparado),
            "entregado" => Ok(RepairStatus::Entregado),
            _ => Err(format!(
                "Invalid repair status: {}. Use Cotización, Confirmado, En Reparación, Reparado, or Entregado",
                s
            )),
        }
    }
}

/// Kind of device being repaired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[derive(Default)]
pub enum DeviceType {
    #[default]
    Celular,
    Tablet,
    Reloj,
    Laptop,
}

impl DeviceType {
    pub const ALL: [DeviceType; 4] = [
        DeviceType::Celular,
        DeviceType::Tablet,
        DeviceType::Reloj,
        DeviceType::Laptop,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceType::Celular => "Celular",
            DeviceType::Tablet => "Tablet",
            DeviceType::Reloj => "Reloj",
            DeviceType::Laptop => "Laptop",
        }
    }
}

impl std::fmt::Display for DeviceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for DeviceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "celular" => Ok(DeviceType::Celular),
            "tablet" => Ok(DeviceType::Tablet),
            "reloj" => Ok(DeviceType::Reloj),
            "laptop" => Ok(DeviceType::Laptop),
            _ => Err(format!(
                "Invalid device type: {}. Use Celular, Tablet, Reloj, or Laptop",
                s
            )),
        }
    }
}

/// One entry of the diagnostic log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationEntry {
    pub note: String,
    pub author: String,
    pub date: DateTime<Utc>,
}

/// Top-level document keys of a repair
///
/// These are the units of field-level merge in the stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepairField {
    Id,
    Customer,
    Device,
    DeviceType,
    ImeiOrSn,
    Password,
    ProblemDescription,
    Technician,
    Status,
    EntryDate,
    Evaluation,
    FunctionalityTest,
    Quote,
    Revision,
}

impl RepairField {
    /// Key used in the YAML document
    pub fn key(&self) -> &'static str {
        match self {
            RepairField::Id => "id",
            RepairField::Customer => "customer",
            RepairField::Device => "device",
            RepairField::DeviceType => "device_type",
            RepairField::ImeiOrSn => "imei_or_sn",
            RepairField::Password => "password",
            RepairField::ProblemDescription => "problem_description",
            RepairField::Technician => "technician",
            RepairField::Status => "status",
            RepairField::EntryDate => "entry_date",
            RepairField::Evaluation => "evaluation",
            RepairField::FunctionalityTest => "functionality_test",
            RepairField::Quote => "quote",
            RepairField::Revision => "revision",
        }
    }

    /// Fields fixed at creation
    pub fn is_immutable(&self) -> bool {
        matches!(
            self,
            RepairField::Id | RepairField::EntryDate | RepairField::Revision
        )
    }
}

impl std::fmt::Display for RepairField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl std::str::FromStr for RepairField {
    type Err = String;

    /// Accepts snake_case document keys and their camelCase spellings
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let flat = s.trim().replace(['_', '-'], "").to_lowercase();
        match flat.as_str() {
            "id" => Ok(RepairField::Id),
            "customer" => Ok(RepairField::Customer),
            "device" => Ok(RepairField::Device),
            "devicetype" => Ok(RepairField::DeviceType),
            "imeiorsn" => Ok(RepairField::ImeiOrSn),
            "password" => Ok(RepairField::Password),
            "problemdescription" => Ok(RepairField::ProblemDescription),
            "technician" => Ok(RepairField::Technician),
            "status" => Ok(RepairField::Status),
            "entrydate" => Ok(RepairField::EntryDate),
            "evaluation" => Ok(RepairField::Evaluation),
            "functionalitytest" => Ok(RepairField::FunctionalityTest),
            "quote" => Ok(RepairField::Quote),
            "revision" => Ok(RepairField::Revision),
            _ => Err(format!("Unknown repair field: {}", s)),
        }
    }
}

/// A repair work order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repair {
    /// Unique identifier
    pub id: EntityId,

    /// Display name of the owning customer
    pub customer: String,

    /// Device model, e.g. "Apple iPhone 15"
    pub device: String,

    #[serde(default)]
    pub device_type: DeviceType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imei_or_sn: Option<String>,

    /// Device unlock code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    pub problem_description: String,

    /// Assigned staff member, or [`NO_TECHNICIAN`]
    #[serde(default = "default_technician")]
    pub technician: String,

    #[serde(default)]
    pub status: RepairStatus,

    pub entry_date: DateTime<Utc>,

    /// Diagnostic log, oldest first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub evaluation: Vec<EvaluationEntry>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub functionality_test: Option<FunctionalityTest>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote: Option<Quote>,

    /// Document revision, bumped on every write
    #[serde(default = "default_revision")]
    pub revision: u64,
}

fn default_technician() -> String {
    NO_TECHNICIAN.to_string()
}

fn default_revision() -> u64 {
    1
}

impl Entity for Repair {
    const PREFIX: EntityPrefix = EntityPrefix::Rep;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn label(&self) -> String {
        format!("{} - {}", self.customer, self.device)
    }

    fn created(&self) -> DateTime<Utc> {
        self.entry_date
    }
}

impl Repair {
    /// Create a new work order at `Cotización`
    pub fn new(
        customer: impl Into<String>,
        device_type: DeviceType,
        device: impl Into<String>,
        problem_description: impl Into<String>,
    ) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Rep),
            customer: customer.into(),
            device: device.into(),
            device_type,
            imei_or_sn: None,
            password: None,
            problem_description: problem_description.into(),
            technician: default_technician(),
            status: RepairStatus::default(),
            entry_date: Utc::now(),
            evaluation: Vec::new(),
            functionality_test: None,
            quote: None,
            revision: 1,
        }
    }

    pub fn has_technician(&self) -> bool {
        is_assigned(&self.technician)
    }

    /// Case-insensitive substring match over the displayable fields
    ///
    /// The device password is deliberately not searchable.
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        let haystacks = [
            self.id.to_string(),
            self.customer.clone(),
            self.device.clone(),
            self.device_type.to_string(),
            self.imei_or_sn.clone().unwrap_or_default(),
            self.problem_description.clone(),
            self.technician.clone(),
            self.status.to_string(),
            self.entry_date.format("%Y-%m-%d").to_string(),
        ];
        haystacks.iter().any(|h| h.to_lowercase().contains(&term))
    }
}

/// Whether a technician name denotes an actual assignee
pub fn is_assigned(technician: &str) -> bool {
    let name = technician.trim();
    !name.is_empty() && name != NO_TECHNICIAN
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repair_creation() {
        let repair = Repair::new("John Doe", DeviceType::Celular, "Apple iPhone 15", "Pantalla rota");

        assert!(repair.id.to_string().starts_with("REP-"));
        assert_eq!(repair.status, RepairStatus::Cotizacion);
        assert_eq!(repair.technician, NO_TECHNICIAN);
        assert!(!repair.has_technician());
        assert!(repair.evaluation.is_empty());
        assert_eq!(repair.revision, 1);
    }

    #[test]
    fn test_status_successors() {
        assert_eq!(RepairStatus::Cotizacion.next(), Some(RepairStatus::Confirmado));
        assert_eq!(RepairStatus::Confirmado.next(), Some(RepairStatus::EnReparacion));
        assert_eq!(RepairStatus::EnReparacion.next(), Some(RepairStatus::Reparado));
        assert_eq!(RepairStatus::Reparado.next(), Some(RepairStatus::Entregado));
        assert_eq!(RepairStatus::Entregado.next(), None);
        assert!(RepairStatus::Entregado.is_terminal());
    }

    #[test]
    fn test_status_order_matches_successors() {
        for pair in RepairStatus::ALL.windows(2) {
            assert_eq!(pair[0].next(), Some(pair[1]));
            assert!(pair[0] < pair[1]);
            assert_eq!(pair[0].index() + 1, pair[1].index());
        }
    }

    #[test]
    fn test_status_lifecycle_rendering() {
        let line = RepairStatus::ALL
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join(" > ");
        insta::assert_snapshot!(line, @"Cotización > Confirmado > En Reparación > Reparado > Entregado");
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("Cotización".parse::<RepairStatus>(), Ok(RepairStatus::Cotizacion));
        assert_eq!("cotizacion".parse::<RepairStatus>(), Ok(RepairStatus::Cotizacion));
        assert_eq!("En Reparación".parse::<RepairStatus>(), Ok(RepairStatus::EnReparacion));
        assert_eq!("en-reparacion".parse::<RepairStatus>(), Ok(RepairStatus::EnReparacion));
        assert_eq!("ENTREGADO".parse::<RepairStatus>(), Ok(RepairStatus::Entregado));
        assert!("En Progreso".parse::<RepairStatus>().is_err());
    }

    #[test]
    fn test_status_serialization() {
        let yaml = serde_yml::to_string(&RepairStatus::EnReparacion).unwrap();
        assert!(yaml.contains("Reparaci"));
        let back: RepairStatus = serde_yml::from_str(&yaml).unwrap();
        assert_eq!(back, RepairStatus::EnReparacion);

        let parsed: RepairStatus = serde_yml::from_str("Cotización").unwrap();
        assert_eq!(parsed, RepairStatus::Cotizacion);

        assert!(serde_yml::from_str::<RepairStatus>("Pendiente").is_err());
    }

    #[test]
    fn test_field_names() {
        assert_eq!("imeiOrSn".parse::<RepairField>(), Ok(RepairField::ImeiOrSn));
        assert_eq!("imei_or_sn".parse::<RepairField>(), Ok(RepairField::ImeiOrSn));
        assert_eq!("entryDate".parse::<RepairField>(), Ok(RepairField::EntryDate));
        assert_eq!("functionalityTest".parse::<RepairField>(), Ok(RepairField::FunctionalityTest));
        assert!("colour".parse::<RepairField>().is_err());

        assert!(RepairField::Id.is_immutable());
        assert!(RepairField::EntryDate.is_immutable());
        assert!(!RepairField::Technician.is_immutable());
    }

    #[test]
    fn test_search_skips_password() {
        let mut repair = Repair::new("Jane Smith", DeviceType::Tablet, "iPad Air", "No carga la batería");
        repair.password = Some("secret-1234".to_string());

        assert!(repair.matches_search("jane"));
        assert!(repair.matches_search("IPAD"));
        assert!(repair.matches_search("cotiz"));
        assert!(!repair.matches_search("secret"));
    }

    #[test]
    fn test_repair_roundtrip() {
        let mut repair = Repair::new("John Doe", DeviceType::Laptop, "Dell XPS 13", "No enciende nunca");
        repair.imei_or_sn = Some("SN-42".to_string());
        repair.technician = "Juan Perez".to_string();

        let yaml = serde_yml::to_string(&repair).unwrap();
        assert!(yaml.contains("device_type: Laptop"));

        let parsed: Repair = serde_yml::from_str(&yaml).unwrap();
        assert_eq!(parsed, repair);
    }
}
