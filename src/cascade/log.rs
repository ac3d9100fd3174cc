//! Structured JSON event log for the cascade, one object per line on
//! stderr. Console output is the cascade's only reporting surface.

use chrono::{SecondsFormat, Utc};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct CascadeEvent {
    pub ts: String,
    pub level: &'static str,
    pub event: &'static str,
    #[serde(flatten)]
    pub fields: serde_json::Value,
}

pub fn emit(level: &'static str, event: &'static str, fields: serde_json::Value) {
    let entry = CascadeEvent {
        ts: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        level,
        event,
        fields,
    };
    if let Ok(line) = serde_json::to_string(&entry) {
        eprintln!("{line}");
    }
}

pub fn info(event: &'static str, fields: serde_json::Value) {
    emit("info", event, fields);
}

pub fn warn(event: &'static str, fields: serde_json::Value) {
    emit("warn", event, fields);
}

pub fn error(event: &'static str, fields: serde_json::Value) {
    emit("error", event, fields);
}
