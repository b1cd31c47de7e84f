use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::foundation::error::{TrailError, TrailResult};
use crate::settings::model::Settings;
use crate::settings::sanitize::sanitize;

/// Schema tag of exported settings files.
pub const SETTINGS_SCHEMA: &str = "pingpong-trail-studio-settings";
/// Current settings file version.
pub const SETTINGS_VERSION: u32 = 1;

/// Import/export envelope around [`Settings`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPayload {
    pub schema: String,
    pub version: u32,
    /// RFC 3339 UTC timestamp.
    pub exported_at: String,
    pub settings: Settings,
}

impl SettingsPayload {
    /// Wrap `settings`, stamped with the current time.
    pub fn new(settings: Settings) -> Self {
        Self::with_timestamp(settings, now_rfc3339())
    }

    pub fn with_timestamp(settings: Settings, exported_at: impl Into<String>) -> Self {
        Self {
            schema: SETTINGS_SCHEMA.to_string(),
            version: SETTINGS_VERSION,
            exported_at: exported_at.into(),
            settings,
        }
    }

    pub fn to_json_pretty(&self) -> TrailResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Parse a settings file: either a full payload or a bare settings object.
///
/// Settings are sanitized; a missing `exportedAt` is stamped with the current time.
#[tracing::instrument(level = "debug", skip(text), fields(len = text.len()))]
pub fn parse_payload(text: &str) -> TrailResult<SettingsPayload> {
    let value: Value = serde_json::from_str(text)?;
    payload_from_value(&value)
}

/// [`parse_payload`] for an already parsed JSON value.
pub fn payload_from_value(value: &Value) -> TrailResult<SettingsPayload> {
    let obj = value
        .as_object()
        .ok_or_else(|| TrailError::settings("settings payload must be a JSON object"))?;

    let source = match obj.get("settings") {
        Some(inner @ Value::Object(_)) => inner,
        _ => value,
    };
    let exported_at = obj
        .get("exportedAt")
        .and_then(Value::as_str)
        .map_or_else(now_rfc3339, str::to_owned);

    Ok(SettingsPayload::with_timestamp(sanitize(source), exported_at))
}

fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
