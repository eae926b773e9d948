//! # ReviewFilter Classifier
//!
//! Decides, for every review comment thread on a pull-request page, whether
//! it is shown, and for every timeline entry whether it stays visible.
//!
//! ## Containment Model
//!
//! ```text
//! document
//! └── timeline entry (.js-timeline-item)        ← entry verdict
//!     ├── author link (a.author)
//!     └── comment thread (.js-comment-container) ← thread verdict
//!         └── comment body (.comment-body)
//!             └── <em> fragment                 ← severity keyword
//! ```
//!
//! ## Rule Order (per entry)
//!
//! 1. Custom bot veto: an author whose name contains a configured bot name
//!    decides alone when that bot is hidden.
//! 2. Entries without the known review bot stay visible.
//! 3. Each thread takes the severity of its first keyword fragment.
//! 4. Threads are filtered by severity; with show-all off, an entry whose
//!    threads are all hidden collapses.
//!
//! [`classify`] is pure. [`apply_verdicts`] writes verdicts onto a snapshot
//! the same way a page context writes them onto the live page.

mod apply;
mod classify;
mod scan;
pub mod selectors;

pub use apply::{apply_verdicts, ApplyStats};
pub use classify::{classify, thread_severity, Classification, ClassificationSummary};
pub use scan::{scan, SeverityCounts};

#[cfg(test)]
mod fixture;
