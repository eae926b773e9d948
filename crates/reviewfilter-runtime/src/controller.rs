//! Filter controller.
//!
//! One controller serves one tab. Actions are handled one at a time
//! (`&mut self`): mutate the configuration, persist it to the session tier,
//! then reclassify the page. A failed page dispatch is reported as an error
//! status and never retried; the configuration stays as mutated.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use reviewfilter_classifier::{classify, scan, ClassificationSummary, SeverityCounts};
use reviewfilter_core::{FilterAction, FilterConfiguration, FilterStateStore, KeyValueStorage};
use reviewfilter_protocols::{ElementVerdict, PageContext, PageError, TabId};

use crate::status::StatusMessage;

/// Outcome of one classification pass over the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassificationReport {
    pub summary: ClassificationSummary,
    pub verdicts: Vec<ElementVerdict>,
    /// Elements the page context updated.
    pub applied: usize,
    /// Elements the page context could not update.
    pub failed: usize,
}

impl ClassificationReport {
    fn status(&self) -> StatusMessage {
        let mut text = format!(
            "Filters applied: {} of {} threads hidden, {} of {} entries hidden",
            self.summary.hidden_threads,
            self.summary.threads,
            self.summary.hidden_entries,
            self.summary.entries
        );
        if self.failed > 0 {
            text.push_str(&format!(" ({} elements could not be updated)", self.failed));
        }
        StatusMessage::info(text)
    }
}

pub struct FilterController {
    store: FilterStateStore,
    page: Arc<dyn PageContext>,
    tab_id: TabId,
}

impl FilterController {
    /// Open a controller for a tab, resolving its configuration.
    pub async fn open(
        storage: Arc<dyn KeyValueStorage>,
        page: Arc<dyn PageContext>,
        tab_id: TabId,
    ) -> Self {
        let mut store = FilterStateStore::new(storage);
        store.load(&tab_id).await;
        debug!("Opened filter controller for tab {}", tab_id);
        Self { store, page, tab_id }
    }

    pub fn tab_id(&self) -> &TabId {
        &self.tab_id
    }

    /// Current configuration.
    pub fn config(&self) -> FilterConfiguration {
        self.store.get()
    }

    /// Handle one user action: mutate, persist to the session, reclassify.
    pub async fn dispatch(&mut self, action: FilterAction) -> StatusMessage {
        self.store.dispatch(action);
        self.store.save_to_session(&self.tab_id).await;
        self.reclassify().await
    }

    /// Toggle one severity by its label. Unknown labels change nothing but
    /// still reclassify.
    pub async fn set_severity_visibility(&mut self, label: &str, visible: bool) -> StatusMessage {
        self.store.set_severity_visibility(label, visible);
        self.store.save_to_session(&self.tab_id).await;
        self.reclassify().await
    }

    async fn reclassify(&self) -> StatusMessage {
        match self.refresh().await {
            Ok(report) => report.status(),
            Err(e) => {
                warn!("Classification failed for tab {}: {}", self.tab_id, e);
                StatusMessage::error(format!("Failed to apply filters: {}", e))
            }
        }
    }

    /// Classify the page with the current configuration and apply the result.
    pub async fn refresh(&self) -> Result<ClassificationReport, PageError> {
        let document = self.page.snapshot(&self.tab_id).await?;
        let classification = classify(&self.store.get(), &document);
        let summary = classification.summary();
        let verdicts = classification.into_verdicts();

        let (applied, failed) = self.page.apply(&self.tab_id, verdicts.clone()).await?;
        if failed > 0 {
            warn!("{} elements of tab {} could not be updated", failed, self.tab_id);
        }
        debug!(
            "Tab {}: {} threads hidden, {} entries hidden",
            self.tab_id, summary.hidden_threads, summary.hidden_entries
        );

        Ok(ClassificationReport {
            summary,
            verdicts,
            applied,
            failed,
        })
    }

    /// Classify without touching the page.
    pub async fn preview(&self) -> Result<ClassificationReport, PageError> {
        let document = self.page.snapshot(&self.tab_id).await?;
        let classification = classify(&self.store.get(), &document);
        Ok(ClassificationReport {
            summary: classification.summary(),
            verdicts: classification.into_verdicts(),
            applied: 0,
            failed: 0,
        })
    }

    /// Count the known bot's threads per severity.
    pub async fn scan(&self) -> Result<SeverityCounts, PageError> {
        let document = self.page.snapshot(&self.tab_id).await?;
        Ok(scan(&document))
    }

    /// Persist the current configuration as the durable default.
    pub async fn save_as_default(&self) -> StatusMessage {
        if self.store.save_as_default().await {
            StatusMessage::info("Saved as default")
        } else {
            StatusMessage::error("Failed to save default")
        }
    }

    /// Tear down: drop the tab's session record.
    pub async fn close(self) {
        self.store.clear_session(&self.tab_id).await;
        info!("Closed filter session for tab {}", self.tab_id);
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
