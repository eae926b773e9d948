//! In-memory application of verdicts onto a snapshot.
//!
//! Mirrors what a page context does to the live page: set or clear the
//! inline `display: none`, then set or remove each marker attribute.
//! Display is only cleared on elements that carry one of our markers, so
//! styling the host page set itself is left alone.

use serde::Serialize;
use tracing::warn;

use reviewfilter_protocols::verdict::MARKERS;
use reviewfilter_protocols::{DomNode, ElementVerdict};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ApplyStats {
    pub applied: usize,
    pub failed: usize,
}

/// Apply verdicts in order. A verdict whose node is missing is skipped.
pub fn apply_verdicts(document: &mut DomNode, verdicts: &[ElementVerdict]) -> ApplyStats {
    let mut stats = ApplyStats::default();
    for verdict in verdicts {
        let Some(node) = document.find_mut(verdict.node_id) else {
            warn!("Node {} not found; skipping verdict", verdict.node_id);
            stats.failed += 1;
            continue;
        };

        let marked = MARKERS.iter().any(|marker| node.attribute(marker).is_some());
        if verdict.is_hidden() || marked {
            node.set_display_hidden(verdict.is_hidden());
        }
        for (marker, present) in verdict.markers() {
            if present {
                node.set_attribute(marker, "true");
            } else {
                node.remove_attribute(marker);
            }
        }
        stats.applied += 1;
    }
    stats
}
