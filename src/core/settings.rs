//! Shop settings stored under `settings/`
//!
//! - `repair_status_styles.yaml`: badge variant per repair status
//! - `device_data.yaml`: device type → brand → models catalog

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::entities::repair::{DeviceType, RepairStatus};
use crate::yaml::{parse_yaml_file, YamlError};

pub const STATUS_STYLES_FILE: &str = "repair_status_styles.yaml";
pub const DEVICE_DATA_FILE: &str = "device_data.yaml";

/// Problems offered as quick picks during intake
pub const COMMON_PROBLEMS: &[&str] = &[
    "Pantalla rota",
    "No carga",
    "Batería se descarga rápido",
    "No enciende",
    "Se reinicia solo",
    "Daño por líquido",
    "Problema de altavoz",
    "Problema de micrófono",
    "Fallo de cámara",
    "No lee SIM",
    "Problemas de software",
];

/// Visual variant of a status badge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeVariant {
    Default,
    Secondary,
    Destructive,
    Outline,
}

impl BadgeVariant {
    pub const ALL: [BadgeVariant; 4] = [
        BadgeVariant::Default,
        BadgeVariant::Secondary,
        BadgeVariant::Destructive,
        BadgeVariant::Outline,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BadgeVariant::Default => "default",
            BadgeVariant::Secondary => "secondary",
            BadgeVariant::Destructive => "destructive",
            BadgeVariant::Outline => "outline",
        }
    }
}

impl std::fmt::Display for BadgeVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BadgeVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BadgeVariant::ALL
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!(
                    "Invalid badge variant: {}. Use default, secondary, destructive, or outline",
                    s
                )
            })
    }
}

/// Badge variant per repair status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusStyles(BTreeMap<RepairStatus, BadgeVariant>);

impl Default for StatusStyles {
    fn default() -> Self {
        Self(
            RepairStatus::ALL
                .into_iter()
                .map(|s| (s, Self::default_for(s)))
                .collect(),
        )
    }
}

impl StatusStyles {
    fn default_for(status: RepairStatus) -> BadgeVariant {
        match status {
            RepairStatus::Cotizacion => BadgeVariant::Outline,
            RepairStatus::Confirmado | RepairStatus::Entregado => BadgeVariant::Secondary,
            RepairStatus::EnReparacion | RepairStatus::Reparado => BadgeVariant::Default,
        }
    }

    /// Variant for a status; statuses missing from the file use the defaults
    pub fn variant(&self, status: RepairStatus) -> BadgeVariant {
        self.0
            .get(&status)
            .copied()
            .unwrap_or_else(|| Self::default_for(status))
    }

    pub fn set(&mut self, status: RepairStatus, variant: BadgeVariant) {
        self.0.insert(status, variant);
    }

    pub fn iter(&self) -> impl Iterator<Item = (RepairStatus, BadgeVariant)> + '_ {
        RepairStatus::ALL.into_iter().map(|s| (s, self.variant(s)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brand {
    pub name: String,
    pub models: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceFamily {
    #[serde(default)]
    pub brands: Vec<Brand>,
}

/// Known devices, used to offer device choices during intake
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceCatalog(BTreeMap<DeviceType, DeviceFamily>);

impl Default for DeviceCatalog {
    fn default() -> Self {
        fn brand(name: &str, models: &[&str]) -> Brand {
            Brand {
                name: name.to_string(),
                models: models.iter().map(|m| m.to_string()).collect(),
            }
        }

        let mut catalog = BTreeMap::new();
        catalog.insert(
            DeviceType::Celular,
            DeviceFamily {
                brands: vec![
                    brand(
                        "Apple",
                        &["iPhone 15 Pro", "iPhone 15", "iPhone 14 Pro", "iPhone 14", "iPhone SE"],
                    ),
                    brand(
                        "Samsung",
                        &[
                            "Galaxy S24 Ultra",
                            "Galaxy S24",
                            "Galaxy Z Fold 5",
                            "Galaxy Z Flip 5",
                            "Galaxy A54",
                        ],
                    ),
                    brand("Google", &["Pixel 8 Pro", "Pixel 8", "Pixel 7a"]),
                    brand("OnePlus", &["OnePlus 12", "OnePlus Open", "OnePlus Nord N30"]),
                ],
            },
        );
        catalog.insert(
            DeviceType::Tablet,
            DeviceFamily {
                brands: vec![
                    brand(
                        "Apple",
                        &["iPad Pro 12.9\"", "iPad Pro 11\"", "iPad Air", "iPad Mini"],
                    ),
                    brand(
                        "Samsung",
                        &["Galaxy Tab S9 Ultra", "Galaxy Tab S9+", "Galaxy Tab S9 FE"],
                    ),
                    brand("Microsoft", &["Surface Pro 9", "Surface Go 4"]),
                ],
            },
        );
        catalog.insert(
            DeviceType::Reloj,
            DeviceFamily {
                brands: vec![
                    brand("Apple", &["Watch Ultra 2", "Watch Series 9", "Watch SE"]),
                    brand(
                        "Samsung",
                        &["Galaxy Watch 6 Classic", "Galaxy Watch 6", "Galaxy Watch 5 Pro"],
                    ),
                    brand("Google", &["Pixel Watch 2"]),
                ],
            },
        );
        catalog.insert(
            DeviceType::Laptop,
            DeviceFamily {
                brands: vec![
                    brand(
                        "Apple",
                        &[
                            "MacBook Pro 16\"",
                            "MacBook Pro 14\"",
                            "MacBook Air 15\"",
                            "MacBook Air 13\"",
                        ],
                    ),
                    brand("Dell", &["XPS 15", "XPS 13", "Inspiron 15"]),
                    brand("HP", &["Spectre x360", "Envy 16", "Pavilion 15"]),
                    brand("Microsoft", &["Surface Laptop 5", "Surface Laptop Studio 2"]),
                ],
            },
        );
        Self(catalog)
    }
}

impl DeviceCatalog {
    pub fn brands(&self, device_type: DeviceType) -> &[Brand] {
        self.0
            .get(&device_type)
            .map(|f| f.brands.as_slice())
            .unwrap_or_default()
    }

    pub fn models(&self, device_type: DeviceType, brand: &str) -> &[String] {
        self.brands(device_type)
            .iter()
            .find(|b| b.name.eq_ignore_ascii_case(brand))
            .map(|b| b.models.as_slice())
            .unwrap_or_default()
    }
}

/// Settings collection of a shop
#[derive(Debug, Clone)]
pub struct Settings {
    dir: PathBuf,
}

impl Settings {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Status badge styles; defaults when the file doesn't exist
    pub fn status_styles(&self) -> Result<StatusStyles, YamlError> {
        let path = self.dir.join(STATUS_STYLES_FILE);
        if !path.exists() {
            return Ok(StatusStyles::default());
        }
        parse_yaml_file(&path)
    }

    pub fn save_status_styles(&self, styles: &StatusStyles) -> Result<(), YamlError> {
        self.write(STATUS_STYLES_FILE, styles)
    }

    /// Device catalog, seeding the defaults on first use
    pub fn device_catalog(&self) -> Result<DeviceCatalog, YamlError> {
        let path = self.dir.join(DEVICE_DATA_FILE);
        if !path.exists() {
            let catalog = DeviceCatalog::default();
            self.write(DEVICE_DATA_FILE, &catalog)?;
            info!(path = %path.display(), "seeded device catalog");
            return Ok(catalog);
        }
        parse_yaml_file(&path)
    }

    fn write<T: Serialize>(&self, file: &str, value: &T) -> Result<(), YamlError> {
        fs::create_dir_all(&self.dir)?;
        let content = serde_yml::to_string(value)
            .map_err(|e| YamlError::Io(std::io::Error::other(e.to_string())))?;
        let path = self.dir.join(file);
        fs::write(&path, content)?;
        debug!(path = %path.display(), "settings written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_status_styles() {
        let styles = StatusStyles::default();
        assert_eq!(styles.variant(RepairStatus::Cotizacion), BadgeVariant::Outline);
        assert_eq!(styles.variant(RepairStatus::Confirmado), BadgeVariant::Secondary);
        assert_eq!(styles.variant(RepairStatus::EnReparacion), BadgeVariant::Default);
        assert_eq!(styles.variant(RepairStatus::Reparado), BadgeVariant::Default);
        assert_eq!(styles.variant(RepairStatus::Entregado), BadgeVariant::Secondary);
    }

    #[test]
    fn test_styles_roundtrip_and_partial_file() {
        let tmp = tempdir().unwrap();
        let settings = Settings::new(tmp.path());
        assert_eq!(settings.status_styles().unwrap(), StatusStyles::default());

        let mut styles = StatusStyles::default();
        styles.set(RepairStatus::Reparado, BadgeVariant::Destructive);
        settings.save_status_styles(&styles).unwrap();
        assert_eq!(
            settings.status_styles().unwrap().variant(RepairStatus::Reparado),
            BadgeVariant::Destructive
        );

        fs::write(tmp.path().join(STATUS_STYLES_FILE), "Confirmado: outline\n").unwrap();
        let partial = settings.status_styles().unwrap();
        assert_eq!(partial.variant(RepairStatus::Confirmado), BadgeVariant::Outline);
        assert_eq!(partial.variant(RepairStatus::Cotizacion), BadgeVariant::Outline);
        assert_eq!(partial.variant(RepairStatus::Entregado), BadgeVariant::Secondary);
    }

    #[test]
    fn test_device_catalog_is_seeded() {
        let tmp = tempdir().unwrap();
        let settings = Settings::new(tmp.path().join("settings"));
        let catalog = settings.device_catalog().unwrap();

        assert!(tmp.path().join("settings").join(DEVICE_DATA_FILE).is_file());
        assert_eq!(catalog.brands(DeviceType::Reloj).len(), 3);
        assert!(catalog
            .models(DeviceType::Laptop, "dell")
            .iter()
            .any(|m| m == "XPS 13"));
        assert!(catalog.models(DeviceType::Celular, "Nokia").is_empty());

        assert_eq!(settings.device_catalog().unwrap(), catalog);
    }

    #[test]
    fn test_badge_variant_parse() {
        assert_eq!("Outline".parse::<BadgeVariant>().unwrap(), BadgeVariant::Outline);
        assert!("loud".parse::<BadgeVariant>().is_err());
    }
}
