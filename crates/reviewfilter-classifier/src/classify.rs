//! Per-entry visibility classification.

use serde::Serialize;
use tracing::{debug, trace};

use reviewfilter_core::FilterConfiguration;
use reviewfilter_protocols::{
    DomNode, ElementKind, ElementVerdict, NodeId, Severity, VerdictReason, Visibility,
};

use crate::selectors;

/// Verdicts for one classification pass, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub verdicts: Vec<ElementVerdict>,
}

/// Counts over a classification pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClassificationSummary {
    pub entries: usize,
    pub hidden_entries: usize,
    pub threads: usize,
    pub hidden_threads: usize,
}

impl Classification {
    /// Last verdict written for a node; later verdicts win, as on the page.
    pub fn verdict_for(&self, node_id: NodeId) -> Option<&ElementVerdict> {
        self.verdicts.iter().rev().find(|v| v.node_id == node_id)
    }

    pub fn summary(&self) -> ClassificationSummary {
        let mut summary = ClassificationSummary::default();
        for verdict in &self.verdicts {
            match verdict.kind {
                ElementKind::Entry => {
                    summary.entries += 1;
                    if verdict.is_hidden() {
                        summary.hidden_entries += 1;
                    }
                }
                ElementKind::Thread => {
                    summary.threads += 1;
                    if verdict.is_hidden() {
                        summary.hidden_threads += 1;
                    }
                }
            }
        }
        summary
    }

    pub fn into_verdicts(self) -> Vec<ElementVerdict> {
        self.verdicts
    }
}

/// Classify every timeline entry in the document.
pub fn classify(config: &FilterConfiguration, document: &DomNode) -> Classification {
    let mut verdicts = Vec::new();
    for entry in document.descendants().filter(|n| selectors::is_timeline_entry(n)) {
        classify_entry(config, entry, &mut verdicts);
    }
    Classification { verdicts }
}

fn classify_entry(
    config: &FilterConfiguration,
    entry: &DomNode,
    verdicts: &mut Vec<ElementVerdict>,
) {
    if let Some((bot, show)) = custom_bot_match(config, entry) {
        if !show {
            debug!("Entry {} hidden by custom bot '{}'", entry.node_id, bot);
            verdicts.push(ElementVerdict::entry(
                entry.node_id,
                Visibility::Hidden,
                VerdictReason::CustomBotHidden,
            ));
            return;
        }
        trace!("Entry {} matches shown custom bot '{}'", entry.node_id, bot);
    }

    if !entry.descendants().any(selectors::is_known_bot_author) {
        verdicts.push(ElementVerdict::entry(
            entry.node_id,
            Visibility::Visible,
            VerdictReason::NotReviewBot,
        ));
        return;
    }

    let show_all = config.show_all();
    let mut thread_verdicts = Vec::new();
    for thread in entry.descendants().filter(|n| selectors::is_thread(n)) {
        let severity = thread_severity(thread);
        // Unlabelled threads follow the global flag.
        let shown = match severity {
            Some(severity) => config.severity_visible(severity),
            None => show_all,
        };
        trace!(
            "Thread {} severity {:?}: {}",
            thread.node_id,
            severity,
            if shown { "shown" } else { "hidden" }
        );
        thread_verdicts.push(ElementVerdict::thread(
            thread.node_id,
            Visibility::from_shown(shown),
            severity,
        ));
    }

    let any_visible = thread_verdicts.iter().any(|v| !v.is_hidden());
    let entry_verdict = if show_all || any_visible {
        ElementVerdict::entry(entry.node_id, Visibility::Visible, VerdictReason::ThreadsVisible)
    } else {
        debug!("Entry {} collapsed: no visible threads", entry.node_id);
        ElementVerdict::entry(entry.node_id, Visibility::Hidden, VerdictReason::NoVisibleThreads)
    };

    verdicts.push(entry_verdict);
    verdicts.extend(thread_verdicts);
}

/// First configured custom bot contained in an author name of the entry.
///
/// Authors are visited in document order and bots in name order; the first
/// hit decides.
fn custom_bot_match<'a>(
    config: &'a FilterConfiguration,
    entry: &DomNode,
) -> Option<(&'a str, bool)> {
    if config.custom_bots().is_empty() {
        return None;
    }
    entry
        .descendants()
        .filter(|n| selectors::is_author(n))
        .find_map(|author| {
            let name = author.text_content().trim().to_lowercase();
            config
                .custom_bots()
                .iter()
                .find(|(bot, _)| name.contains(bot.as_str()))
                .map(|(bot, show)| (bot.as_str(), *show))
        })
}

/// Severity of a thread: the first emphasis fragment in its comment body
/// that mentions a severity label.
pub fn thread_severity(thread: &DomNode) -> Option<Severity> {
    let body = thread.descendants().find(|n| selectors::is_comment_body(n))?;
    body.descendants()
        .filter(|n| selectors::is_emphasis(n))
        .find_map(|fragment| Severity::detect(&fragment.text_content()))
}

#[cfg(test)]
#[path = "classify_tests.rs"]
mod tests;
