//! Error types for the preference store.
//!
//! Only writes surface errors. Reads of missing or malformed values fall
//! back to documented defaults inside the gateway and never reach callers.

/// Errors that can occur in the preference store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A value could not be encoded as JSON.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
