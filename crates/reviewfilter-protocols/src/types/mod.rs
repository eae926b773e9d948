//! Common types used across the ReviewFilter crates.

mod common;
mod severity;

pub use common::*;
pub use severity::*;
