//! Command submission type and input normalization.

use chrono::{DateTime, Utc};

use crate::error::{Result, WandError};

/// One user request, immutable once submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// Correlation ID used in logs.
    pub id: String,
    /// Raw command text as typed or spoken.
    pub text: String,
    /// Optional context text (e.g. clipboard selection) captured at submission.
    pub context: Option<String>,
    /// Submission time.
    pub submitted_at: DateTime<Utc>,
}

impl Command {
    /// Create a command with no context text.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            text: text.into(),
            context: None,
            submitted_at: Utc::now(),
        }
    }

    /// Attach context text. Blank context is treated as absent.
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        let context = context.into();
        self.context = if context.trim().is_empty() {
            None
        } else {
            Some(context)
        };
        self
    }
}

/// Output of the input normalizer.
///
/// `original` keeps the user's casing for extraction and logging; `lowered`
/// is used only for classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedCommand {
    pub original: String,
    pub lowered: String,
}

/// Trim the raw text and derive the lower-cased classification copy.
///
/// # Errors
///
/// Returns [`WandError::Validation`] when the trimmed text is empty.
pub fn normalize(raw: &str) -> Result<NormalizedCommand> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(WandError::Validation("command is empty".to_owned()));
    }
    Ok(NormalizedCommand {
        original: trimmed.to_owned(),
        lowered: trimmed.to_lowercase(),
    })
}
