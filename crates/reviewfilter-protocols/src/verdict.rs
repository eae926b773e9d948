//! Visibility verdicts produced by the classifier and applied by a page context.

use serde::{Deserialize, Serialize};

use crate::dom::NodeId;
use crate::types::Severity;

/// Marker set on elements hidden by a custom bot rule.
pub const CUSTOM_BOT_MARKER: &str = "data-custom-bot-hidden";

/// Marker set on threads (and collapsed entries) hidden by severity rules.
pub const SEVERITY_MARKER: &str = "data-severity-hidden";

/// Every marker this system writes.
pub const MARKERS: [&str; 2] = [CUSTOM_BOT_MARKER, SEVERITY_MARKER];

/// Which level of the containment model an element belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Entry,
    Thread,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Visible,
    Hidden,
}

impl Visibility {
    pub fn from_shown(shown: bool) -> Self {
        if shown { Visibility::Visible } else { Visibility::Hidden }
    }

    pub fn is_hidden(&self) -> bool {
        matches!(self, Visibility::Hidden)
    }
}

/// Why an element received its verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictReason {
    /// Entry authored by a custom bot whose flag is off.
    CustomBotHidden,
    /// Entry has no known review bot author.
    NotReviewBot,
    /// Entry of the known bot with at least one visible thread.
    ThreadsVisible,
    /// Entry of the known bot whose threads are all hidden.
    NoVisibleThreads,
    /// Thread whose severity passes the filter.
    SeverityShown,
    /// Thread whose severity (or lack of one) is filtered out.
    SeverityHidden,
}

/// Decision for one element of the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementVerdict {
    pub node_id: NodeId,
    pub kind: ElementKind,
    pub visibility: Visibility,
    pub reason: VerdictReason,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
}

impl ElementVerdict {
    pub fn entry(node_id: NodeId, visibility: Visibility, reason: VerdictReason) -> Self {
        Self {
            node_id,
            kind: ElementKind::Entry,
            visibility,
            reason,
            severity: None,
        }
    }

    pub fn thread(node_id: NodeId, visibility: Visibility, severity: Option<Severity>) -> Self {
        let reason = if visibility.is_hidden() {
            VerdictReason::SeverityHidden
        } else {
            VerdictReason::SeverityShown
        };
        Self {
            node_id,
            kind: ElementKind::Thread,
            visibility,
            reason,
            severity,
        }
    }

    pub fn is_hidden(&self) -> bool {
        self.visibility.is_hidden()
    }

    /// Desired presence of each marker attribute after applying this verdict.
    pub fn markers(&self) -> [(&'static str, bool); 2] {
        let custom = self.reason == VerdictReason::CustomBotHidden;
        let severity = self.is_hidden() && !custom;
        [(CUSTOM_BOT_MARKER, custom), (SEVERITY_MARKER, severity)]
    }
}
