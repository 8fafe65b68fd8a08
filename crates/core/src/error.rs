//! Error types for protocol editing, persistence and enrichment.

use thiserror::Error;

use crate::gateway::GatewayError;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while editing, importing or enriching a protocol.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to read or write a file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// An imported project or library file could not be decoded.
    #[error("Invalid file: {0}")]
    InvalidFile(String),

    /// A project or library could not be written out as JSON.
    #[error("Failed to serialize: {0}")]
    Serialize(#[from] serde_json::Error),

    /// A decoded document breaks a structural invariant.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// A library item with the same normalized name already exists.
    #[error("Exercise already in the library: {0}")]
    DuplicateLibraryItem(String),

    /// A library item is missing its name or its image.
    #[error("Library items need both a name and an image")]
    IncompleteLibraryItem,

    /// The enrichment service failed.
    #[error("Enrichment failed: {0}")]
    Gateway(#[from] GatewayError),
}
