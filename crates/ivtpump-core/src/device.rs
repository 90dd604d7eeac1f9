// ── Device identity ──

use serde::Serialize;
use serde_json::Value;

use crate::paths;
use crate::snapshot::Snapshot;

pub const MANUFACTURER: &str = "Bosch / IVT";

/// Paths [`DeviceInfo::from_snapshot`] reads.
pub const DEVICE_INFO_PATHS: &[&str] = &[
    paths::GW_FIRMWARE,
    paths::GW_HARDWARE,
    paths::GW_SERIAL,
    paths::GW_MAC,
    paths::SYS_TYPE,
];

/// Identity of the heat pump, as reported by its gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    pub device_id: String,
    pub manufacturer: &'static str,
    pub model: String,
    pub firmware: Option<String>,
    pub hardware: Option<String>,
    pub serial: Option<String>,
    pub mac: Option<String>,
    pub system_type: Option<String>,
}

impl DeviceInfo {
    pub fn from_snapshot(device_id: &str, snapshot: &Snapshot) -> Self {
        let read = |path: &str| snapshot.value(path).and_then(display);
        let system_type = read(paths::SYS_TYPE);
        let model = match system_type.as_deref() {
            Some(t) if !t.is_empty() && t != "unknown" => format!("K30 ({t})"),
            _ => "K30".to_owned(),
        };

        Self {
            device_id: device_id.to_owned(),
            manufacturer: MANUFACTURER,
            model,
            firmware: read(paths::GW_FIRMWARE),
            hardware: read(paths::GW_HARDWARE),
            serial: read(paths::GW_SERIAL),
            mac: read(paths::GW_MAC),
            system_type,
        }
    }

    /// Reported serial, or the device id when the gateway has none.
    pub fn serial_number(&self) -> &str {
        self.serial.as_deref().unwrap_or(&self.device_id)
    }
}

fn display(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
