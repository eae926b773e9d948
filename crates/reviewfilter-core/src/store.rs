//! Filter state store.
//!
//! Mediates between the in-memory configuration, the per-tab session tier
//! and the durable global tier. Every storage failure degrades to the next
//! tier or to defaults; no error reaches the caller.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use reviewfilter_protocols::{Severity, TabId};

use crate::error::StorageError;
use crate::reducer::FilterAction;
use crate::sanitize::{validate_global_record, validate_state, SHOW_ALL_KEY, VISIBILITY_KEY};
use crate::state::FilterConfiguration;
use crate::storage::{KeyValueStorage, StorageArea};

/// Durable key holding `{visibilityState, showAllState}`.
pub const GLOBAL_STATE_KEY: &str = "coderabbit";

/// Durable key holding the custom bot map.
pub const GLOBAL_CUSTOM_BOTS_KEY: &str = "customBots";

/// Session tier key for a tab.
pub fn session_key(tab_id: &TabId) -> String {
    format!("session_{}", tab_id)
}

/// Single source of truth for the active filter configuration.
pub struct FilterStateStore {
    storage: Arc<dyn KeyValueStorage>,
    state: FilterConfiguration,
}

impl FilterStateStore {
    /// Create a store holding the default configuration.
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self {
            storage,
            state: FilterConfiguration::default(),
        }
    }

    /// Resolve the configuration for a tab: session, then global, then defaults.
    pub async fn load(&mut self, tab_id: &TabId) -> FilterConfiguration {
        self.state = self.resolve(tab_id).await;
        self.get()
    }

    async fn resolve(&self, tab_id: &TabId) -> FilterConfiguration {
        match self.storage.get(StorageArea::Session, &session_key(tab_id)).await {
            Ok(Some(value)) => {
                debug!("Loaded session filter state for tab {}", tab_id);
                return validate_state(&value);
            }
            Ok(None) => {}
            Err(e) => warn!("Session storage unavailable for tab {}: {}", tab_id, e),
        }

        match self.load_global().await {
            Ok(Some(config)) => {
                debug!("Loaded default filter state for tab {}", tab_id);
                return config;
            }
            Ok(None) => {}
            Err(e) => warn!("Global storage unavailable: {}", e),
        }

        debug!("Using built-in filter defaults for tab {}", tab_id);
        FilterConfiguration::default()
    }

    async fn load_global(&self) -> Result<Option<FilterConfiguration>, StorageError> {
        let record = match self.storage.get(StorageArea::Global, GLOBAL_STATE_KEY).await? {
            Some(record) => Some(record),
            None => self.load_flattened_global().await?,
        };
        let custom_bots = self
            .storage
            .get(StorageArea::Global, GLOBAL_CUSTOM_BOTS_KEY)
            .await?;

        if record.is_none() && custom_bots.is_none() {
            return Ok(None);
        }
        Ok(Some(validate_global_record(record.as_ref(), custom_bots.as_ref())))
    }

    /// Older records kept `visibilityState` and `showAllState` at the top level.
    async fn load_flattened_global(&self) -> Result<Option<Value>, StorageError> {
        let visibility = self.storage.get(StorageArea::Global, VISIBILITY_KEY).await?;
        let show_all = self.storage.get(StorageArea::Global, SHOW_ALL_KEY).await?;

        if visibility.is_none() && show_all.is_none() {
            return Ok(None);
        }
        let mut record = Map::new();
        record.insert(VISIBILITY_KEY.to_string(), visibility.unwrap_or(Value::Null));
        record.insert(SHOW_ALL_KEY.to_string(), show_all.unwrap_or(Value::Null));
        Ok(Some(Value::Object(record)))
    }

    /// Persist the configuration to the tab's session record. Best effort.
    pub async fn save_to_session(&self, tab_id: &TabId) {
        let value = match serde_json::to_value(&self.state) {
            Ok(value) => value,
            Err(e) => {
                warn!("Failed to serialize filter state: {}", e);
                return;
            }
        };

        if let Err(e) = self
            .storage
            .set(StorageArea::Session, &session_key(tab_id), value)
            .await
        {
            warn!("Failed to save session filter state for tab {}: {}", tab_id, e);
        }
    }

    /// Persist the configuration as the durable default.
    ///
    /// Returns whether both durable keys were written.
    pub async fn save_as_default(&self) -> bool {
        match self.write_default().await {
            Ok(()) => {
                info!("Saved filter state as default");
                true
            }
            Err(e) => {
                warn!("Failed to save default filter state: {}", e);
                false
            }
        }
    }

    async fn write_default(&self) -> Result<(), StorageError> {
        self.storage
            .set(
                StorageArea::Global,
                GLOBAL_STATE_KEY,
                self.state.visibility_record(),
            )
            .await?;
        self.storage
            .set(
                StorageArea::Global,
                GLOBAL_CUSTOM_BOTS_KEY,
                self.state.custom_bots_record(),
            )
            .await
    }

    /// Drop the tab's session record when the tab goes away.
    pub async fn clear_session(&self, tab_id: &TabId) {
        if let Err(e) = self
            .storage
            .remove(StorageArea::Session, &session_key(tab_id))
            .await
        {
            warn!("Failed to clear session filter state for tab {}: {}", tab_id, e);
        }
    }

    /// Apply an action to the held configuration.
    pub fn dispatch(&mut self, action: FilterAction) {
        debug!("Filter action: {:?}", action);
        self.state = std::mem::take(&mut self.state).reduce(action);
    }

    /// Set one severity by label. Unknown labels are ignored.
    pub fn set_severity_visibility(&mut self, label: &str, visible: bool) {
        match label.parse::<Severity>() {
            Ok(severity) => self.dispatch(FilterAction::set_severity(severity, visible)),
            Err(e) => debug!("Ignoring severity toggle: {}", e),
        }
    }

    pub fn set_show_all(&mut self, visible: bool) {
        self.dispatch(FilterAction::set_show_all(visible));
    }

    pub fn set_custom_bot(&mut self, name: &str, show: bool) {
        self.dispatch(FilterAction::set_custom_bot(name, show));
    }

    pub fn remove_custom_bot(&mut self, name: &str) {
        self.dispatch(FilterAction::remove_custom_bot(name));
    }

    /// Snapshot of the current configuration.
    pub fn get(&self) -> FilterConfiguration {
        self.state.clone()
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
