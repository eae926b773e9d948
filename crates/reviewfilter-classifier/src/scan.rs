//! Read-only severity scan used to decide which severity controls to offer.

use std::collections::BTreeMap;

use reviewfilter_protocols::{DomNode, Severity};

use crate::classify::thread_severity;
use crate::selectors;

/// Number of known-bot threads per severity. All three keys are present.
pub type SeverityCounts = BTreeMap<Severity, usize>;

/// Count known-bot threads by detected severity.
pub fn scan(document: &DomNode) -> SeverityCounts {
    let mut counts: SeverityCounts = Severity::ALL.into_iter().map(|s| (s, 0)).collect();

    let bot_entries = document
        .descendants()
        .filter(|n| selectors::is_timeline_entry(n))
        .filter(|entry| entry.descendants().any(selectors::is_known_bot_author));

    for entry in bot_entries {
        for thread in entry.descendants().filter(|n| selectors::is_thread(n)) {
            if let Some(severity) = thread_severity(thread) {
                *counts.entry(severity).or_insert(0) += 1;
            }
        }
    }
    counts
}
