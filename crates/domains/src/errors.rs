//! # Domain errors
//!
//! One enum per port so adapters can map their backend failures without
//! leaking driver types upward.

use thiserror::Error;

/// Failure reported by a [`DocumentStore`](crate::ports::DocumentStore).
#[derive(Error, Debug)]
pub enum StoreError {
    /// The backend could not be reached or refused the call.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The caller is not allowed to perform the operation.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The document payload could not be (de)serialized.
    #[error("invalid document: {0}")]
    InvalidDocument(String),

    /// Anything else the backend reported.
    #[error("store backend error: {0}")]
    Backend(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::InvalidDocument(err.to_string())
    }
}

/// Failure reported by a [`SessionProvider`](crate::ports::SessionProvider).
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("session could not be issued: {0}")]
    Issue(String),

    #[error("sign-in rejected: {0}")]
    Rejected(String),
}

/// A stored document did not have the shape of the entity it was read as.
#[derive(Error, Debug)]
#[error("document {id} in `{collection}` is malformed: {reason}")]
pub struct DecodeError {
    pub collection: &'static str,
    pub id: String,
    pub reason: String,
}
