//! Board+ domain crate.
//!
//! Entities, the document model shared by every storage backend, and the
//! port traits that adapters implement. Nothing in here performs I/O.

pub mod document;
pub mod errors;
pub mod models;
pub mod ports;

pub use document::*;
pub use errors::*;
pub use models::*;
pub use ports::*;
