//! # ReviewFilter Core
//!
//! The filter state store: the single source of truth for which review
//! comments a tab should show.
//!
//! ## Layers
//!
//! - [`FilterConfiguration`] - immutable value with the severity flags, the
//!   global show-all flag and the custom bot map
//! - [`FilterAction`] - pure reducer input (`config × action → config`)
//! - [`validate_state`] - sanitizer applied to everything read from storage
//! - [`KeyValueStorage`] - the session and global storage tiers
//! - [`FilterStateStore`] - resolves, mutates and persists the configuration

pub mod error;
pub mod reducer;
pub mod sanitize;
pub mod state;
pub mod storage;
pub mod store;

pub use error::StorageError;
pub use reducer::FilterAction;
pub use reviewfilter_protocols::{Severity, TabId};
pub use sanitize::{validate_global_record, validate_state};
pub use state::{normalize_bot_name, FilterConfiguration};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage, StorageArea};
pub use store::{session_key, FilterStateStore};
