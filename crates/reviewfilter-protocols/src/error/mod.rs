//! Error types for the ReviewFilter protocol layer.

mod page;

pub use page::*;
