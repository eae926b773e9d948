//! # ReviewFilter Protocols
//!
//! Seam definitions shared by the ReviewFilter crates.
//! Contains only data types and traits - no storage or page I/O.
//!
//! ## Core Types
//!
//! - [`DomNode`] - Read-only snapshot of the host page document
//! - [`ElementVerdict`] - Visible/hidden decision for one page element
//! - [`PageContext`] - Capability for running an operation inside a tab
//! - [`Severity`] - Review comment severity label

pub mod dom;
pub mod error;
pub mod page;
pub mod types;
pub mod verdict;

pub use dom::{DomNode, NodeId};
pub use error::PageError;
pub use page::{PageContext, PageOperation, PageOutcome};
pub use types::*;
pub use verdict::{ElementKind, ElementVerdict, VerdictReason, Visibility};
