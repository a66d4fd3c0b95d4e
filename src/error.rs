//! Error types for the wand engine.
//!
//! Only a handful of these ever reach a caller of
//! [`CommandCoordinator::submit`](crate::coordinator::CommandCoordinator::submit):
//! handler, backend and model failures are folded into a
//! [`HandlerResult`](crate::dispatch::HandlerResult) at the point they occur.

/// Top-level error type for the command engine.
#[derive(Debug, thiserror::Error)]
pub enum WandError {
    /// The command was rejected before dispatch (empty or whitespace-only).
    #[error("validation error: {0}")]
    Validation(String),

    /// Configuration could not be read, parsed or applied.
    #[error("config error: {0}")]
    Config(String),

    /// Rule or pattern table failed to compile.
    #[error("pattern error: {0}")]
    Pattern(#[from] regex::Error),

    /// History store error (only surfaced while opening the store).
    #[error("history error: {0}")]
    History(#[from] crate::history::HistoryError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Channel send/receive error.
    #[error("channel error: {0}")]
    Channel(String),

    /// Coordinator is shut down or its worker is gone.
    #[error("coordinator error: {0}")]
    Coordinator(String),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, WandError>;
