//! [`PageContext`] over a CDP connection.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use reviewfilter_protocols::{
    DomNode, ElementVerdict, PageContext, PageError, PageOperation, PageOutcome, TabId,
};

use crate::cdp::{CdpClient, CdpError, PageInfo, PageSession};

/// Hides `this`, or clears its inline display if one of our markers is on it.
pub const DISPLAY_FUNCTION: &str = "function(hidden) { \
    if (hidden) { this.style.display = 'none'; } \
    else if (this.hasAttribute('data-custom-bot-hidden') || this.hasAttribute('data-severity-hidden')) { \
    this.style.display = ''; } }";

pub struct CdpPageContext {
    client: CdpClient,
    sessions: Mutex<HashMap<TabId, Arc<PageSession>>>,
}

impl CdpPageContext {
    pub async fn connect(endpoint: &str, request_timeout: Duration) -> Result<Self, CdpError> {
        let client = CdpClient::connect(endpoint, request_timeout).await?;
        info!("Connected to DevTools endpoint {}", endpoint);
        Ok(Self {
            client,
            sessions: Mutex::new(HashMap::new()),
        })
    }

    pub async fn list_tabs(&self) -> Result<Vec<PageInfo>, CdpError> {
        self.client.list_tabs().await
    }

    /// Cached session for a tab, attaching on first use.
    async fn session(&self, tab_id: &TabId) -> Result<Arc<PageSession>, CdpError> {
        let mut sessions = self.sessions.lock().await;
        if let Some(session) = sessions.get(tab_id) {
            return Ok(session.clone());
        }
        let session = Arc::new(self.client.attach(tab_id.as_str()).await?);
        sessions.insert(tab_id.clone(), session.clone());
        Ok(session)
    }

    async fn forget(&self, tab_id: &TabId) {
        if self.sessions.lock().await.remove(tab_id).is_some() {
            debug!("Dropped session for tab {}", tab_id);
        }
    }

    async fn snapshot_document(&self, session: &PageSession) -> Result<DomNode, PageError> {
        let root = session.get_document().await?;
        DomNode::from_value(&root)
    }

    async fn apply_verdicts(
        &self,
        session: &PageSession,
        verdicts: &[ElementVerdict],
    ) -> Result<(usize, usize), PageError> {
        let mut applied = 0;
        let mut failed = 0;
        let mut stale = 0;

        for verdict in verdicts {
            match apply_one(session, verdict).await {
                Ok(()) => applied += 1,
                Err(e) if e.aborts_pass() => {
                    warn!("Aborting apply at node {}: {}", verdict.node_id, e);
                    return Err(e.into());
                }
                Err(e) => {
                    if e.is_stale_node() {
                        stale += 1;
                    }
                    warn!("Failed to update node {}: {}", verdict.node_id, e);
                    failed += 1;
                }
            }
        }

        // Nothing resolved: the snapshot belongs to a document that is gone.
        if applied == 0 && stale > 0 && stale == failed {
            return Err(PageError::Navigated(session.target_id().to_string()));
        }
        Ok((applied, failed))
    }
}

/// Write display state, then both markers, for one element.
async fn apply_one(session: &PageSession, verdict: &ElementVerdict) -> Result<(), CdpError> {
    let object_id = session.resolve_node(verdict.node_id).await?;
    let display = session
        .call_function_on(&object_id, DISPLAY_FUNCTION, vec![json!(verdict.is_hidden())])
        .await;
    if let Err(e) = session.release_object(&object_id).await {
        debug!("Failed to release object for node {}: {}", verdict.node_id, e);
    }
    display?;

    for (marker, present) in verdict.markers() {
        if present {
            session.set_attribute(verdict.node_id, marker, "true").await?;
        } else {
            session.remove_attribute(verdict.node_id, marker).await?;
        }
    }
    Ok(())
}

#[async_trait]
impl PageContext for CdpPageContext {
    async fn run(&self, tab_id: &TabId, operation: PageOperation) -> Result<PageOutcome, PageError> {
        debug!("Running {} in tab {}", operation.name(), tab_id);
        let session = self.session(tab_id).await?;

        let outcome = match operation {
            PageOperation::Snapshot => self
                .snapshot_document(&session)
                .await
                .map(|document| PageOutcome::Snapshot { document }),
            PageOperation::Apply(verdicts) => self
                .apply_verdicts(&session, &verdicts)
                .await
                .map(|(applied, failed)| PageOutcome::Applied { applied, failed }),
        };

        if outcome.as_ref().err().is_some_and(drops_session) {
            self.forget(tab_id).await;
        }
        outcome
    }
}

/// Errors after which the cached session for the tab is not reused.
fn drops_session(error: &PageError) -> bool {
    matches!(
        error,
        PageError::Unavailable(_) | PageError::Navigated(_) | PageError::Timeout(_)
    )
}
