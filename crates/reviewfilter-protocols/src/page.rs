//! Page context capability.
//!
//! Classification runs against a live tab that this process does not own.
//! Everything that touches the tab goes through [`PageContext::run`], so the
//! controller can be driven by a DevTools connection or by an in-memory fake.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::dom::DomNode;
use crate::error::PageError;
use crate::types::TabId;
use crate::verdict::ElementVerdict;

/// Operation dispatched into a tab.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", content = "args", rename_all = "snake_case")]
pub enum PageOperation {
    /// Read the current document without mutating it.
    Snapshot,
    /// Write display state and marker attributes for each verdict.
    Apply(Vec<ElementVerdict>),
}

impl PageOperation {
    pub fn name(&self) -> &'static str {
        match self {
            PageOperation::Snapshot => "snapshot",
            PageOperation::Apply(_) => "apply",
        }
    }
}

/// Result of a dispatched operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PageOutcome {
    Snapshot { document: DomNode },
    Applied { applied: usize, failed: usize },
}

/// Capability for running an operation inside a tab's page context.
///
/// Each call resolves exactly once. Implementations do not retry.
#[async_trait]
pub trait PageContext: Send + Sync {
    async fn run(&self, tab_id: &TabId, operation: PageOperation) -> Result<PageOutcome, PageError>;

    /// Take a read-only snapshot of the tab's document.
    async fn snapshot(&self, tab_id: &TabId) -> Result<DomNode, PageError> {
        match self.run(tab_id, PageOperation::Snapshot).await? {
            PageOutcome::Snapshot { document } => Ok(document),
            other => Err(PageError::InvalidResponse(format!(
                "expected snapshot, got {:?}",
                other
            ))),
        }
    }

    /// Apply verdicts, returning `(applied, failed)` element counts.
    async fn apply(
        &self,
        tab_id: &TabId,
        verdicts: Vec<ElementVerdict>,
    ) -> Result<(usize, usize), PageError> {
        match self.run(tab_id, PageOperation::Apply(verdicts)).await? {
            PageOutcome::Applied { applied, failed } => Ok((applied, failed)),
            other => Err(PageError::InvalidResponse(format!(
                "expected apply result, got {:?}",
                other
            ))),
        }
    }
}
