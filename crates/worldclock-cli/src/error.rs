//! Error types for the world clock binary.
//!
//! [`CliError`] covers failures of the driver loop itself. Startup failures
//! are reported through `anyhow` with context in `main`.

/// Failure of the driver loop.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Reading UI events from stdin failed.
    #[error("failed to read input: {source}")]
    Input {
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Installing the Ctrl-C handler failed.
    #[error("failed to listen for interrupt: {source}")]
    Signal {
        /// The underlying I/O error.
        source: std::io::Error,
    },
}
