//! Error types shared between the client and the server.

use displaydoc::Display;

pub type AtelierResult<T> = Result<T, AtelierError>;

/// An error produced by the shared Atelier types.
#[derive(Debug, Display)]
pub enum AtelierError {
    /// Invalid project ID: {0}
    InvalidProjectId(String),
}

impl std::error::Error for AtelierError {}
