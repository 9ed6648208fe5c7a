use crate::cursor::RawEntry;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

pub const REALTIME_FIELD: &str = "__REALTIME_TIMESTAMP";
pub const IDENTIFIER_FIELD: &str = "SYSLOG_IDENTIFIER";
pub const SYSTEM_UNIT_FIELD: &str = "_SYSTEMD_UNIT";
pub const USER_UNIT_FIELD: &str = "_SYSTEMD_USER_UNIT";
pub const HOSTNAME_FIELD: &str = "_HOSTNAME";
pub const MESSAGE_FIELD: &str = "MESSAGE";

/// Projected log record returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub time: DateTime<Utc>,
    pub unit: String,
    pub host: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full: Option<BTreeMap<String, String>>,
}

impl LogEntry {
    /// Missing or malformed fields become empty strings (epoch for the timestamp).
    pub fn from_raw(raw: &RawEntry, include_full: bool) -> Self {
        let text = |field: &str| raw.get(field).and_then(field_text).unwrap_or_default();

        let unit = match text(IDENTIFIER_FIELD) {
            id if !id.is_empty() => id,
            _ => format!("{}:{}", text(SYSTEM_UNIT_FIELD), text(USER_UNIT_FIELD)),
        };

        let full = include_full.then(|| {
            raw.iter()
                .filter_map(|(key, value)| field_text(value).map(|text| (key.clone(), text)))
                .collect()
        });

        Self {
            time: realtime(raw),
            unit,
            host: text(HOSTNAME_FIELD),
            message: text(MESSAGE_FIELD),
            full,
        }
    }
}

fn realtime(raw: &RawEntry) -> DateTime<Utc> {
    let micros = match raw.get(REALTIME_FIELD) {
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        Some(Value::Number(n)) => n.as_i64(),
        _ => None,
    };
    micros
        .and_then(DateTime::from_timestamp_micros)
        .unwrap_or_default()
}

/// Journal values are strings, byte arrays for non-UTF-8 payloads, or arrays of strings for
/// repeated fields.
fn field_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) if items.iter().all(Value::is_u64) => {
            let bytes: Vec<u8> = items
                .iter()
                .filter_map(Value::as_u64)
                .filter_map(|b| u8::try_from(b).ok())
                .collect();
            Some(String::from_utf8_lossy(&bytes).into_owned())
        }
        Value::Array(items) => items.iter().find_map(Value::as_str).map(str::to_string),
        _ => None,
    }
}
