//! Action backend: the collaborator that performs real OS and network effects.
//!
//! Every operation returns a human-readable result line or an [`ActionError`].
//! Implementations override only what their platform supports; the default
//! body of each method reports [`ActionError::Unsupported`].

pub mod local;

pub use local::LocalActions;

use std::path::Path;

use async_trait::async_trait;

/// Errors reported by an action backend call.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    /// The backend does not implement this operation.
    #[error("{0} is not supported on this system")]
    Unsupported(String),

    /// Target application, process or resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The OS refused the operation.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The operand is unusable (bad path, existing file, malformed address).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Any other backend failure.
    #[error("{0}")]
    Failed(String),
}

/// Result of an action backend call.
pub type ActionResult = Result<String, ActionError>;

/// Power management actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PowerKind {
    Shutdown,
    Restart,
    Sleep,
    Hibernate,
}

impl PowerKind {
    /// Parse a keyword such as `"Restart"` (case-insensitive).
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.trim().to_lowercase().as_str() {
            "shutdown" => Some(Self::Shutdown),
            "restart" => Some(Self::Restart),
            "sleep" => Some(Self::Sleep),
            "hibernate" => Some(Self::Hibernate),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Shutdown => "shutdown",
            Self::Restart => "restart",
            Self::Sleep => "sleep",
            Self::Hibernate => "hibernate",
        }
    }
}

impl std::fmt::Display for PowerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An outgoing email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

fn unsupported(what: &str) -> ActionResult {
    Err(ActionError::Unsupported(what.to_owned()))
}

/// Operations the dispatcher can ask of the host system.
#[async_trait]
pub trait ActionBackend: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &str;

    async fn launch_app(&self, _name: &str) -> ActionResult {
        unsupported("launching applications")
    }

    async fn web_search(&self, _query: &str) -> ActionResult {
        unsupported("web search")
    }

    async fn open_site(&self, _url: &str) -> ActionResult {
        unsupported("opening websites")
    }

    async fn system_info(&self) -> ActionResult {
        unsupported("system information")
    }

    async fn kill_process(&self, _name: &str) -> ActionResult {
        unsupported("killing processes")
    }

    async fn power_action(&self, kind: PowerKind) -> ActionResult {
        unsupported(kind.as_str())
    }

    async fn create_file(&self, _name: &str) -> ActionResult {
        unsupported("creating files")
    }

    async fn wifi_passwords(&self) -> ActionResult {
        unsupported("reading WiFi profiles")
    }

    async fn speed_test(&self) -> ActionResult {
        unsupported("network speed test")
    }

    /// Capture the screen, optionally to `path`.
    async fn screenshot(&self, _path: Option<&Path>) -> ActionResult {
        unsupported("screenshots")
    }

    async fn generate_qr(&self, _text: &str) -> ActionResult {
        unsupported("QR code generation")
    }

    async fn installed_programs(&self) -> ActionResult {
        unsupported("listing installed programs")
    }

    async fn empty_recycle_bin(&self) -> ActionResult {
        unsupported("emptying the recycle bin")
    }

    async fn battery_info(&self) -> ActionResult {
        unsupported("battery status")
    }

    async fn speak(&self, _text: &str) -> ActionResult {
        unsupported("text-to-speech")
    }

    /// Capture one utterance and return the recognised text.
    async fn listen(&self) -> ActionResult {
        unsupported("speech recognition")
    }

    async fn send_email(&self, _message: &EmailMessage) -> ActionResult {
        unsupported("sending email")
    }

    async fn notify(&self, _title: &str, _message: &str) -> ActionResult {
        unsupported("notifications")
    }
}

impl std::fmt::Debug for dyn ActionBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionBackend").field("name", &self.name()).finish()
    }
}
