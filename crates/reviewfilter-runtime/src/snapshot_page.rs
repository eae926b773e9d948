//! Page context over in-memory documents.
//!
//! Backs offline runs against a saved snapshot and the controller tests.
//! Applying verdicts mutates the stored document the same way the live page
//! is mutated.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;

use reviewfilter_classifier::apply_verdicts;
use reviewfilter_protocols::{DomNode, PageContext, PageError, PageOperation, PageOutcome, TabId};

pub struct SnapshotPage {
    documents: Mutex<HashMap<TabId, DomNode>>,
    failure: Mutex<Option<PageError>>,
    operations: Mutex<Vec<&'static str>>,
}

impl SnapshotPage {
    pub fn new() -> Self {
        Self {
            documents: Mutex::new(HashMap::new()),
            failure: Mutex::new(None),
            operations: Mutex::new(Vec::new()),
        }
    }

    /// Create a page context serving one document for one tab.
    pub fn with_document(tab_id: TabId, document: DomNode) -> Self {
        let page = Self::new();
        page.insert(tab_id, document);
        page
    }

    pub fn insert(&self, tab_id: TabId, document: DomNode) {
        self.documents.lock().insert(tab_id, document);
    }

    /// Current document of a tab, including applied verdicts.
    pub fn document(&self, tab_id: &TabId) -> Option<DomNode> {
        self.documents.lock().get(tab_id).cloned()
    }

    /// Make every following operation fail with `error` until cleared.
    pub fn fail_with(&self, error: Option<PageError>) {
        *self.failure.lock() = error;
    }

    /// Names of the operations run so far, in order.
    pub fn operations(&self) -> Vec<&'static str> {
        self.operations.lock().clone()
    }
}

impl Default for SnapshotPage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageContext for SnapshotPage {
    async fn run(&self, tab_id: &TabId, operation: PageOperation) -> Result<PageOutcome, PageError> {
        self.operations.lock().push(operation.name());
        if let Some(error) = self.failure.lock().clone() {
            return Err(error);
        }

        let mut documents = self.documents.lock();
        let document = documents
            .get_mut(tab_id)
            .ok_or_else(|| PageError::TabNotFound(tab_id.to_string()))?;

        match operation {
            PageOperation::Snapshot => Ok(PageOutcome::Snapshot {
                document: document.clone(),
            }),
            PageOperation::Apply(verdicts) => {
                let stats = apply_verdicts(document, &verdicts);
                debug!(
                    "Applied {} verdicts to tab {} ({} failed)",
                    stats.applied, tab_id, stats.failed
                );
                Ok(PageOutcome::Applied {
                    applied: stats.applied,
                    failed: stats.failed,
                })
            }
        }
    }
}
