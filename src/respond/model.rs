//! AI model backend contract.
//!
//! A backend turns a prompt into text. An unconfigured backend is modelled
//! as `Option::None` at the call site, never as an error.

use async_trait::async_trait;

/// Stable error codes for programmatic error handling.
pub mod error_codes {
    /// Invalid or missing configuration.
    pub const CONFIG_INVALID: &str = "CONFIG_INVALID";

    /// Authentication failed (invalid/missing API key).
    pub const AUTH_FAILED: &str = "AUTH_FAILED";

    /// Request to the model provider failed.
    pub const REQUEST_FAILED: &str = "REQUEST_FAILED";

    /// Request timed out.
    pub const TIMEOUT_ERROR: &str = "TIMEOUT_ERROR";

    /// Provider answered without any text.
    pub const EMPTY_RESPONSE: &str = "EMPTY_RESPONSE";

    /// Provider-specific error not covered by other variants.
    pub const PROVIDER_ERROR: &str = "PROVIDER_ERROR";
}

/// Errors produced by a model backend.
///
/// The Display impl formats as `[CODE] message`.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ModelError {
    #[error("[{}] {}", error_codes::CONFIG_INVALID, .0)]
    Config(String),

    #[error("[{}] {}", error_codes::AUTH_FAILED, .0)]
    Auth(String),

    #[error("[{}] {}", error_codes::REQUEST_FAILED, .0)]
    Request(String),

    #[error("[{}] {}", error_codes::TIMEOUT_ERROR, .0)]
    Timeout(String),

    #[error("[{}] {}", error_codes::EMPTY_RESPONSE, .0)]
    EmptyResponse(String),

    #[error("[{}] {}", error_codes::PROVIDER_ERROR, .0)]
    Provider(String),
}

impl ModelError {
    /// Returns the stable error code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => error_codes::CONFIG_INVALID,
            Self::Auth(_) => error_codes::AUTH_FAILED,
            Self::Request(_) => error_codes::REQUEST_FAILED,
            Self::Timeout(_) => error_codes::TIMEOUT_ERROR,
            Self::EmptyResponse(_) => error_codes::EMPTY_RESPONSE,
            Self::Provider(_) => error_codes::PROVIDER_ERROR,
        }
    }

    /// Returns the inner message without the code prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::Config(m)
            | Self::Auth(m)
            | Self::Request(m)
            | Self::Timeout(m)
            | Self::EmptyResponse(m)
            | Self::Provider(m) => m,
        }
    }

    /// Whether retrying the same request could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Config(_) | Self::Auth(_) => false,
            Self::Request(_) | Self::Timeout(_) | Self::Provider(_) => true,
            Self::EmptyResponse(_) => false,
        }
    }
}

/// A text-generation capability.
#[async_trait]
pub trait ModelBackend: Send + Sync {
    /// Provider name for logs (e.g. `"gemini"`).
    fn name(&self) -> &str;

    /// Generate a completion for `prompt`.
    async fn generate(&self, prompt: &str) -> Result<String, ModelError>;
}
