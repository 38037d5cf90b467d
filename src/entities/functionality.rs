//! Functionality test - intake checklist of device subsystems

use serde::{Deserialize, Serialize};

/// Outcome of a single check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum TestResult {
    Ok,
    Fail,
    #[default]
    Na,
}

impl TestResult {
    /// Short label shown on badges
    pub fn label(&self) -> &'static str {
        match self {
            TestResult::Ok => "OK",
            TestResult::Fail => "Falla",
            TestResult::Na => "N/A",
        }
    }
}

impl std::fmt::Display for TestResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TestResult::Ok => write!(f, "ok"),
            TestResult::Fail => write!(f, "fail"),
            TestResult::Na => write!(f, "na"),
        }
    }
}

impl std::str::FromStr for TestResult {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ok" => Ok(TestResult::Ok),
            "fail" => Ok(TestResult::Fail),
            "na" | "n/a" => Ok(TestResult::Na),
            _ => Err(format!("Invalid test result: {}. Use ok, fail, or na", s)),
        }
    }
}

/// The checklist items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TestItem {
    CameraFront,
    CameraBack,
    ChargingPort,
    Screen,
    Touch,
    Buttons,
    Earpiece,
    Speaker,
    Microphone,
    Wifi,
    Biometrics,
}

impl TestItem {
    pub const ALL: [TestItem; 11] = [
        TestItem::CameraFront,
        TestItem::CameraBack,
        TestItem::ChargingPort,
        TestItem::Screen,
        TestItem::Touch,
        TestItem::Buttons,
        TestItem::Earpiece,
        TestItem::Speaker,
        TestItem::Microphone,
        TestItem::Wifi,
        TestItem::Biometrics,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            TestItem::CameraFront => "camera_front",
            TestItem::CameraBack => "camera_back",
            TestItem::ChargingPort => "charging_port",
            TestItem::Screen => "screen",
            TestItem::Touch => "touch",
            TestItem::Buttons => "buttons",
            TestItem::Earpiece => "earpiece",
            TestItem::Speaker => "speaker",
            TestItem::Microphone => "microphone",
            TestItem::Wifi => "wifi",
            TestItem::Biometrics => "biometrics",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TestItem::CameraFront => "Cámara Frontal",
            TestItem::CameraBack => "Cámara Trasera",
            TestItem::ChargingPort => "Puerto de Carga",
            TestItem::Screen => "Pantalla (Brillo/Colores)",
            TestItem::Touch => "Táctil",
            TestItem::Buttons => "Botones (Volumen/Encendido)",
            TestItem::Earpiece => "Altavoz Auricular",
            TestItem::Speaker => "Altavoz Principal",
            TestItem::Microphone => "Micrófono",
            TestItem::Wifi => "Wi-Fi / Red",
            TestItem::Biometrics => "Face ID / Lector de Huella",
        }
    }
}

impl std::fmt::Display for TestItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl std::str::FromStr for TestItem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let flat = s.trim().replace(['_', '-'], "").to_lowercase();
        TestItem::ALL
            .iter()
            .find(|item| item.key().replace('_', "") == flat)
            .copied()
            .ok_or_else(|| format!("Unknown functionality test item: {}", s))
    }
}

/// Results of the intake functionality test
///
/// Keys are snake_case on disk; the camelCase form-field names are accepted
/// on input. Unknown keys are rejected rather than dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FunctionalityTest {
    #[serde(default, alias = "cameraFront")]
    pub camera_front: TestResult,
    #[serde(default, alias = "cameraBack")]
    pub camera_back: TestResult,
    #[serde(default, alias = "chargingPort")]
    pub charging_port: TestResult,
    #[serde(default)]
    pub screen: TestResult,
    #[serde(default)]
    pub touch: TestResult,
    #[serde(default)]
    pub buttons: TestResult,
    #[serde(default)]
    pub earpiece: TestResult,
    #[serde(default)]
    pub speaker: TestResult,
    #[serde(default)]
    pub microphone: TestResult,
    #[serde(default)]
    pub wifi: TestResult,
    #[serde(default)]
    pub biometrics: TestResult,

    /// Free-text observations
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub other: String,
}

impl FunctionalityTest {
    pub fn get(&self, item: TestItem) -> TestResult {
        match item {
            TestItem::CameraFront => self.camera_front,
            TestItem::CameraBack => self.camera_back,
            TestItem::ChargingPort => self.charging_port,
            TestItem::Screen => self.screen,
            TestItem::Touch => self.touch,
            TestItem::Buttons => self.buttons,
            TestItem::Earpiece => self.earpiece,
            TestItem::Speaker => self.speaker,
            TestItem::Microphone => self.microphone,
            TestItem::Wifi => self.wifi,
            TestItem::Biometrics => self.biometrics,
        }
    }

    pub fn set(&mut self, item: TestItem, result: TestResult) {
        let slot = match item {
            TestItem::CameraFront => &mut self.camera_front,
            TestItem::CameraBack => &mut self.camera_back,
            TestItem::ChargingPort => &mut self.charging_port,
            TestItem::Screen => &mut self.screen,
            TestItem::Touch => &mut self.touch,
            TestItem::Buttons => &mut self.buttons,
            TestItem::Earpiece => &mut self.earpiece,
            TestItem::Speaker => &mut self.speaker,
            TestItem::Microphone => &mut self.microphone,
            TestItem::Wifi => &mut self.wifi,
            TestItem::Biometrics => &mut self.biometrics,
        };
        *slot = result;
    }

    /// Items paired with their results, in checklist order
    pub fn results(&self) -> impl Iterator<Item = (TestItem, TestResult)> + '_ {
        TestItem::ALL.iter().map(move |item| (*item, self.get(*item)))
    }

    /// Items that failed
    pub fn failures(&self) -> Vec<TestItem> {
        self.results()
            .filter(|(_, r)| *r == TestResult::Fail)
            .map(|(item, _)| item)
            .collect()
    }
}
