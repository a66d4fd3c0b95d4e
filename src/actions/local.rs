//! Best-effort local desktop backend.
//!
//! Implements the portable subset of [`ActionBackend`]: launching programs
//! found on `PATH`, opening URLs through the platform opener, basic system
//! information, file creation and desktop notifications. Everything else
//! falls through to the trait's `Unsupported` defaults.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use super::{ActionBackend, ActionError, ActionResult};

/// Search URL prefix used for web searches.
const SEARCH_URL: &str = "https://www.google.com/search?q=";

/// Local desktop action backend.
#[derive(Debug, Clone, Default)]
pub struct LocalActions {
    /// Directory new files are created in; `None` uses the process cwd.
    files_dir: Option<PathBuf>,
}

impl LocalActions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create files under `dir` instead of the working directory.
    #[must_use]
    pub fn with_files_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.files_dir = Some(dir.into());
        self
    }
}

fn open_url(url: &str) -> Result<(), ActionError> {
    let mut cmd = opener_command(url)?;
    debug!(url, "opening url");
    cmd.spawn()
        .map_err(|e| ActionError::Failed(format!("could not start the system browser: {e}")))?;
    Ok(())
}

#[cfg(target_os = "windows")]
fn opener_command(url: &str) -> Result<Command, ActionError> {
    let mut cmd = Command::new("cmd");
    cmd.args(["/C", "start", "", url]);
    Ok(cmd)
}

#[cfg(target_os = "macos")]
fn opener_command(url: &str) -> Result<Command, ActionError> {
    let mut cmd = Command::new("open");
    cmd.arg(url);
    Ok(cmd)
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn opener_command(url: &str) -> Result<Command, ActionError> {
    let opener = which::which("xdg-open")
        .map_err(|_| ActionError::NotFound("xdg-open (no system URL opener)".to_owned()))?;
    let mut cmd = Command::new(opener);
    cmd.arg(url);
    Ok(cmd)
}

/// Prefix bare hosts with `https://`.
pub fn normalize_url(url: &str) -> String {
    let url = url.trim();
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_owned()
    } else {
        format!("https://{url}")
    }
}

/// Google search URL for `query`.
pub fn search_url(query: &str) -> String {
    format!("{SEARCH_URL}{}", urlencoding::encode(query.trim()))
}

/// Resolve an application name to an executable on `PATH`.
///
/// Tries the name as given, then lower-cased with spaces replaced by dashes
/// ("Visual Studio Code" → "visual-studio-code").
fn resolve_executable(name: &str) -> Option<PathBuf> {
    let dashed = name.trim().to_lowercase().replace(' ', "-");
    which::which(name.trim())
        .or_else(|_| which::which(&dashed))
        .ok()
}

#[async_trait]
impl ActionBackend for LocalActions {
    fn name(&self) -> &str {
        "local"
    }

    async fn launch_app(&self, name: &str) -> ActionResult {
        let exe = resolve_executable(name)
            .ok_or_else(|| ActionError::NotFound(format!("application '{name}'")))?;
        Command::new(&exe).spawn().map_err(|e| match e.kind() {
            std::io::ErrorKind::PermissionDenied => {
                ActionError::PermissionDenied(exe.display().to_string())
            }
            _ => ActionError::Io(e),
        })?;
        info!(app = name, path = %exe.display(), "launched application");
        Ok(format!("✅ Opened {name}"))
    }

    async fn web_search(&self, query: &str) -> ActionResult {
        open_url(&search_url(query))?;
        Ok(format!("🔍 Searched for: {query}"))
    }

    async fn open_site(&self, url: &str) -> ActionResult {
        let url = normalize_url(url);
        open_url(&url)?;
        Ok(format!("🌐 Opened: {url}"))
    }

    async fn system_info(&self) -> ActionResult {
        let cores = std::thread::available_parallelism()
            .map(|n| n.get().to_string())
            .unwrap_or_else(|_| "unknown".to_owned());
        Ok(format!(
            "💻 System Information:\nPlatform: {} ({})\nFamily: {}\nCPU cores: {cores}",
            std::env::consts::OS,
            std::env::consts::ARCH,
            std::env::consts::FAMILY,
        ))
    }

    async fn create_file(&self, name: &str) -> ActionResult {
        let path = match &self.files_dir {
            Some(dir) => dir.join(name),
            None => PathBuf::from(name),
        };
        tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::AlreadyExists => {
                    ActionError::InvalidInput(format!("{} already exists", path.display()))
                }
                std::io::ErrorKind::PermissionDenied => {
                    ActionError::PermissionDenied(path.display().to_string())
                }
                _ => ActionError::Io(e),
            })?;
        Ok(format!("✅ Created file: {}", path.display()))
    }

    async fn notify(&self, title: &str, message: &str) -> ActionResult {
        let status = if cfg!(target_os = "macos") {
            let script = format!("display notification {message:?} with title {title:?}");
            Command::new("osascript").args(["-e", &script]).status().await?
        } else {
            let sender = which::which("notify-send")
                .map_err(|_| ActionError::Unsupported("notifications".to_owned()))?;
            Command::new(sender).args([title, message]).status().await?
        };
        if !status.success() {
            return Err(ActionError::Failed(format!(
                "notification helper exited with {status}"
            )));
        }
        Ok(format!("🔔 Notification sent: {title}"))
    }
}
