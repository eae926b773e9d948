//! Pure reducer over the filter configuration.

use serde::Serialize;
use tracing::debug;

use reviewfilter_protocols::Severity;

use crate::state::FilterConfiguration;

/// A user-triggered change to the filter configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FilterAction {
    /// Toggle a single severity.
    SetSeverityVisibility { severity: Severity, visible: bool },
    /// Set the global flag and all three severities to the same value.
    SetShowAll { visible: bool },
    /// Add or update a custom bot rule.
    SetCustomBot { name: String, show: bool },
    /// Remove a custom bot rule.
    RemoveCustomBot { name: String },
    /// Replace the whole configuration.
    Replace { config: FilterConfiguration },
}

impl FilterAction {
    pub fn set_severity(severity: Severity, visible: bool) -> Self {
        Self::SetSeverityVisibility { severity, visible }
    }

    pub fn set_show_all(visible: bool) -> Self {
        Self::SetShowAll { visible }
    }

    pub fn set_custom_bot(name: impl Into<String>, show: bool) -> Self {
        Self::SetCustomBot {
            name: name.into(),
            show,
        }
    }

    pub fn remove_custom_bot(name: impl Into<String>) -> Self {
        Self::RemoveCustomBot { name: name.into() }
    }
}

impl FilterConfiguration {
    /// Apply an action, producing the next configuration.
    ///
    /// Invalid input (a bot name that is empty after trimming) leaves the
    /// configuration unchanged.
    pub fn reduce(mut self, action: FilterAction) -> Self {
        match action {
            FilterAction::SetSeverityVisibility { severity, visible } => {
                self.set_severity(severity, visible);
            }
            FilterAction::SetShowAll { visible } => {
                self.set_show_all(visible);
            }
            FilterAction::SetCustomBot { name, show } => {
                if !self.insert_custom_bot(&name, show) {
                    debug!("Ignoring custom bot with empty name");
                }
            }
            FilterAction::RemoveCustomBot { name } => {
                if !self.remove_custom_bot(&name) {
                    debug!("No custom bot named '{}' to remove", name.trim());
                }
            }
            FilterAction::Replace { config } => {
                self = config;
            }
        }
        self
    }
}
