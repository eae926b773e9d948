//! Filter configuration value.

use std::collections::BTreeMap;

use serde::Serialize;

use reviewfilter_protocols::Severity;

/// Normalize a custom bot name: trimmed and lower-cased.
///
/// Returns `None` for names that are empty after trimming.
pub fn normalize_bot_name(name: &str) -> Option<String> {
    let normalized = name.trim().to_lowercase();
    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}

/// The per-tab filter configuration.
///
/// All three severities are always present, and custom bot names are always
/// normalized and non-empty. Values are only produced by [`Default`],
/// [`FilterConfiguration::new`], the sanitizer and the reducer, which
/// all uphold these invariants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterConfiguration {
    #[serde(rename = "visibilityState")]
    severity_visibility: BTreeMap<Severity, bool>,
    #[serde(rename = "showAllState")]
    show_all: bool,
    #[serde(rename = "customBots")]
    custom_bots: BTreeMap<String, bool>,
}

impl Default for FilterConfiguration {
    fn default() -> Self {
        Self {
            severity_visibility: Severity::ALL.into_iter().map(|s| (s, true)).collect(),
            show_all: true,
            custom_bots: BTreeMap::new(),
        }
    }
}

impl FilterConfiguration {
    /// Build a configuration, filling missing severities with `true`.
    pub fn new(
        severity_visibility: impl IntoIterator<Item = (Severity, bool)>,
        show_all: bool,
    ) -> Self {
        let mut config = Self {
            show_all,
            ..Self::default()
        };
        config.severity_visibility.extend(severity_visibility);
        config
    }

    /// Add a custom bot; names that normalize to nothing are dropped.
    pub fn with_custom_bot(mut self, name: &str, show: bool) -> Self {
        self.insert_custom_bot(name, show);
        self
    }

    pub fn severity_visibility(&self) -> &BTreeMap<Severity, bool> {
        &self.severity_visibility
    }

    /// Visibility flag for one severity.
    pub fn severity_visible(&self, severity: Severity) -> bool {
        self.severity_visibility.get(&severity).copied().unwrap_or(true)
    }

    pub fn show_all(&self) -> bool {
        self.show_all
    }

    pub fn custom_bots(&self) -> &BTreeMap<String, bool> {
        &self.custom_bots
    }

    /// Show flag for a custom bot, looked up by normalized name.
    pub fn custom_bot(&self, name: &str) -> Option<bool> {
        normalize_bot_name(name).and_then(|name| self.custom_bots.get(&name).copied())
    }

    pub(crate) fn set_severity(&mut self, severity: Severity, visible: bool) {
        self.severity_visibility.insert(severity, visible);
    }

    pub(crate) fn set_show_all(&mut self, visible: bool) {
        self.show_all = visible;
        for severity in Severity::ALL {
            self.severity_visibility.insert(severity, visible);
        }
    }

    pub(crate) fn insert_custom_bot(&mut self, name: &str, show: bool) -> bool {
        match normalize_bot_name(name) {
            Some(name) => {
                self.custom_bots.insert(name, show);
                true
            }
            None => false,
        }
    }

    pub(crate) fn remove_custom_bot(&mut self, name: &str) -> bool {
        normalize_bot_name(name)
            .map(|name| self.custom_bots.remove(&name).is_some())
            .unwrap_or(false)
    }

    /// The `{visibilityState, showAllState}` part of the durable record.
    pub fn visibility_record(&self) -> serde_json::Value {
        serde_json::json!({
            "visibilityState": self.severity_visibility,
            "showAllState": self.show_all,
        })
    }

    /// The custom bot map as stored under its own durable key.
    pub fn custom_bots_record(&self) -> serde_json::Value {
        serde_json::json!(self.custom_bots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_bot_name() {
        assert_eq!(normalize_bot_name("  DepBot "), Some("depbot".to_string()));
        assert_eq!(normalize_bot_name("depbot"), Some("depbot".to_string()));
        assert_eq!(normalize_bot_name("   "), None);
        assert_eq!(normalize_bot_name(""), None);
    }

    #[test]
    fn test_default_configuration() {
        let config = FilterConfiguration::default();
        assert!(config.show_all());
        assert_eq!(config.severity_visibility().len(), 3);
        assert!(Severity::ALL.iter().all(|s| config.severity_visible(*s)));
        assert!(config.custom_bots().is_empty());
    }

    #[test]
    fn test_new_fills_and_normalizes() {
        let config = FilterConfiguration::new([(Severity::Major, false)], false)
            .with_custom_bot(" Renovate ", true)
            .with_custom_bot("  ", false);
        assert!(!config.show_all());
        assert!(config.severity_visible(Severity::Critical));
        assert!(!config.severity_visible(Severity::Major));
        assert!(config.severity_visible(Severity::Minor));
        assert_eq!(config.custom_bots().len(), 1);
        assert_eq!(config.custom_bot("RENOVATE"), Some(true));
    }

    #[test]
    fn test_serialize_record_shape() {
        let config = FilterConfiguration::default().with_custom_bot("depbot", false);
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["visibilityState"]["Critical"], true);
        assert_eq!(json["showAllState"], true);
        assert_eq!(json["customBots"]["depbot"], false);
    }

    #[test]
    fn test_visibility_record_excludes_bots() {
        let config = FilterConfiguration::new(Vec::new(), false).with_custom_bot("depbot", false);
        let record = config.visibility_record();
        assert_eq!(record["showAllState"], false);
        assert!(record.get("customBots").is_none());
        assert_eq!(config.custom_bots_record()["depbot"], false);
    }
}
