// Errors raised while starting or configuring the HTTP server. Per-request
// failures never surface here; they become HTTP status codes in routes.rs.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    /// The listener could not be bound.
    #[error("failed to bind {addr}: {reason}")]
    Bind { addr: String, reason: String },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Config(#[from] serde_json::Error),
}
