//! Wand: command interpretation and dispatch engine.
//!
//! Turns a free-form command (plus optional selected "context" text) into a
//! human-readable result:
//! raw text → normalize → classify → extract → dispatch → result → history
//!
//! # Architecture
//!
//! - **Classifier**: ordered phrase rules, first match wins ([`intent`])
//! - **Extractor**: per-intent regex patterns pulling out operands
//! - **Dispatcher**: maps intents to the [`ActionBackend`] or the response tiers
//! - **Response tiers**: AI model first, deterministic demo fallback ([`respond`])
//! - **Coordinator**: runs commands on the tokio runtime, delivers results,
//!   then records them ([`coordinator`], [`history`])

pub mod actions;
pub mod command;
pub mod config;
pub mod coordinator;
pub mod dispatch;
pub mod error;
pub mod history;
pub mod intent;
pub mod reminders;
pub mod respond;
pub mod wand_dirs;

pub use actions::{ActionBackend, ActionError, LocalActions};
pub use command::Command;
pub use config::{DispatchOrdering, WandConfig};
pub use coordinator::{CommandCoordinator, CommandOutcome, Submission, WandContext};
pub use dispatch::{Dispatcher, HandlerResult};
pub use error::{Result, WandError};
pub use history::{HistoryLogger, HistoryRecord, HistoryStore, SqliteHistoryStore};
pub use intent::Intent;
pub use respond::{ModelBackend, ModelError, ResponseKind, ResponseSelector};
