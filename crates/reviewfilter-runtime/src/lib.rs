//! # ReviewFilter Runtime
//!
//! The imperative shell around the filter store and the classifier: every
//! user action mutates the configuration, persists it to the tab's session
//! record and reclassifies the page.

pub mod controller;
pub mod snapshot_page;
pub mod status;

pub use controller::{ClassificationReport, FilterController};
pub use snapshot_page::SnapshotPage;
pub use status::{StatusLevel, StatusMessage};
