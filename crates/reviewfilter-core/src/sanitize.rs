//! Sanitization of stored records.
//!
//! Storage is outside our control: records may be partial, written by an
//! older version, or edited by hand. Nothing read from storage is rejected;
//! every field falls back to its default instead.

use serde_json::{Map, Value};
use tracing::debug;

use reviewfilter_protocols::Severity;

use crate::state::{normalize_bot_name, FilterConfiguration};

pub const VISIBILITY_KEY: &str = "visibilityState";
pub const SHOW_ALL_KEY: &str = "showAllState";
pub const CUSTOM_BOTS_KEY: &str = "customBots";

/// Turn any JSON value into a well-formed configuration.
///
/// - each severity flag is taken if it is a boolean, otherwise `true`
/// - `showAllState` is taken if it is a boolean, otherwise `true`
/// - custom bot names are normalized and empty ones dropped; values are
///   coerced with JavaScript truthiness
pub fn validate_state(value: &Value) -> FilterConfiguration {
    let visibility = value.get(VISIBILITY_KEY);
    let severities = Severity::ALL.map(|severity| {
        let visible = visibility
            .and_then(|v| v.get(severity.label()))
            .and_then(Value::as_bool)
            .unwrap_or(true);
        (severity, visible)
    });

    let show_all = value
        .get(SHOW_ALL_KEY)
        .and_then(Value::as_bool)
        .unwrap_or(true);

    let mut config = FilterConfiguration::new(severities, show_all);
    if let Some(Value::Object(bots)) = value.get(CUSTOM_BOTS_KEY) {
        for (name, show) in bots {
            if normalize_bot_name(name).is_none() {
                debug!("Dropping custom bot entry with empty name");
                continue;
            }
            config = config.with_custom_bot(name, truthy(show));
        }
    }
    config
}

/// Sanitize the durable tier, whose state and bot map live under separate keys.
///
/// `record` holds `visibilityState` and `showAllState`.
pub fn validate_global_record(
    record: Option<&Value>,
    custom_bots: Option<&Value>,
) -> FilterConfiguration {
    let mut merged = Map::new();
    if let Some(Value::Object(fields)) = record {
        for key in [VISIBILITY_KEY, SHOW_ALL_KEY] {
            if let Some(field) = fields.get(key) {
                merged.insert(key.to_string(), field.clone());
            }
        }
    }
    if let Some(bots) = custom_bots {
        merged.insert(CUSTOM_BOTS_KEY.to_string(), bots.clone());
    }
    validate_state(&Value::Object(merged))
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
