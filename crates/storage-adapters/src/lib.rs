//! # storage-adapters
//!
//! `DocumentStore` backends. The in-memory store is always compiled; the
//! Postgres store sits behind the `db-postgres` feature.

pub mod hub;
pub mod memory;
#[cfg(feature = "db-postgres")]
pub mod postgres;

pub use memory::MemoryDocumentStore;
#[cfg(feature = "db-postgres")]
pub use postgres::PgDocumentStore;
