//! Error types for the terminal client.

use thiserror::Error;

/// Client-specific errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server could not be reached
    #[error("Failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Connection error after the session started
    #[error("Connection error: {0}")]
    ConnectionLost(String),

    /// The line editor could not be used
    #[error("Readline error: {0}")]
    Readline(String),
}
