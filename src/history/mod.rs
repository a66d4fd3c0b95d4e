//! Command history: an append-only audit trail of completed commands.
//!
//! The core only needs [`HistoryStore::append`]. [`HistoryLogger`] wraps a
//! store so that persistence failures are logged and swallowed, never
//! reaching the result already handed to the caller.

mod memory;
mod schema;
pub mod sqlite;

pub use memory::MemoryHistoryStore;
pub use sqlite::SqliteHistoryStore;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// One completed command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub command: String,
    pub response: String,
    pub timestamp: DateTime<Utc>,
    pub success: bool,
}

impl HistoryRecord {
    /// Build a record stamped with the current time.
    pub fn now(command: impl Into<String>, response: impl Into<String>, success: bool) -> Self {
        Self {
            command: command.into(),
            response: response.into(),
            timestamp: Utc::now(),
            success,
        }
    }
}

/// Errors from a history store.
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("lock poisoned: {0}")]
    Lock(String),
}

/// Append-only record sink. Implementations must accept concurrent appends.
pub trait HistoryStore: Send + Sync {
    fn append(&self, record: &HistoryRecord) -> Result<(), HistoryError>;
}

/// Non-fatal front for a [`HistoryStore`].
///
/// A logger without a store is a no-op, which is how history is disabled.
#[derive(Clone, Default)]
pub struct HistoryLogger {
    store: Option<Arc<dyn HistoryStore>>,
}

impl std::fmt::Debug for HistoryLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryLogger")
            .field("enabled", &self.store.is_some())
            .finish()
    }
}

impl HistoryLogger {
    pub fn new(store: Arc<dyn HistoryStore>) -> Self {
        Self { store: Some(store) }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.store.is_some()
    }

    /// Persist a record off the async runtime's worker threads.
    ///
    /// Returns whether the append succeeded; failures are only logged.
    pub async fn record(&self, record: HistoryRecord) -> bool {
        let Some(store) = self.store.clone() else {
            return false;
        };
        let command = record.command.clone();
        let outcome = tokio::task::spawn_blocking(move || store.append(&record)).await;
        match outcome {
            Ok(Ok(())) => {
                debug!(command = %command, "history record appended");
                true
            }
            Ok(Err(e)) => {
                warn!(command = %command, error = %e, "failed to append history record");
                false
            }
            Err(e) => {
                warn!(command = %command, error = %e, "history append task failed");
                false
            }
        }
    }
}
