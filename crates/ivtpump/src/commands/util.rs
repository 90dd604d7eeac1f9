//! Shared helpers for command handlers.

use ivtpump_api::RawResponse;
use ivtpump_core::{Snapshot, Tier};
use serde::Serialize;
use serde_json::Value;
use tabled::Tabled;

/// One resource reading, as printed by `get` and `poll`.
#[derive(Debug, Serialize)]
pub struct Reading {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<Tier>,
    /// `None` for absent paths and sentinel readings.
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl Reading {
    pub fn from_snapshot(snap: &Snapshot, path: &str, tier: Option<Tier>) -> Self {
        Self {
            path: path.to_owned(),
            tier,
            value: display_value(snap, path),
            unit: snap
                .entry(path)
                .and_then(RawResponse::unit_of_measure)
                .map(str::to_owned),
        }
    }
}

/// Table row for a [`Reading`].
#[derive(Tabled)]
pub struct ReadingRow {
    #[tabled(rename = "Path")]
    path: String,
    #[tabled(rename = "Tier")]
    tier: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Unit")]
    unit: String,
}

impl ReadingRow {
    /// Unavailable values render as `placeholder`.
    pub fn new(reading: &Reading, placeholder: &str) -> Self {
        Self {
            path: reading.path.clone(),
            tier: reading.tier.map(|t| t.to_string()).unwrap_or_default(),
            value: reading
                .value
                .clone()
                .unwrap_or_else(|| placeholder.to_owned()),
            unit: reading.unit.clone().unwrap_or_default(),
        }
    }
}

/// Human-readable rendering of a snapshot entry, sentinel-filtered.
pub fn display_value(snap: &Snapshot, path: &str) -> Option<String> {
    match snap.entry(path)? {
        RawResponse::Scalar { .. } => snap.value(path).map(plain),
        RawResponse::TaggedList { values } => {
            let parts: Vec<String> = values
                .iter()
                .filter_map(Value::as_object)
                .flat_map(|obj| obj.iter().map(|(k, v)| format!("{k}={}", plain(v))))
                .collect();
            Some(parts.join(", "))
        }
        RawResponse::TimeSeries { .. } => snap.energy_value(path).map(|v| v.to_string()),
        RawResponse::Absent => None,
    }
}

fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Interpret a command-line value: numbers and booleans become JSON
/// numbers and booleans, everything else is sent as a string.
pub fn parse_value(raw: &str) -> Value {
    match serde_json::from_str::<Value>(raw) {
        Ok(v @ (Value::Number(_) | Value::Bool(_))) => v,
        _ => Value::String(raw.to_owned()),
    }
}
