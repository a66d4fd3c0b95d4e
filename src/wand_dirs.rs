//! Centralized application directory paths for wand.
//!
//! Uses the [`dirs`] crate for platform-appropriate directory resolution.
//!
//! | Purpose | macOS | Linux |
//! |---------|-------|-------|
//! | App data | `~/Library/Application Support/wand/` | `~/.local/share/wand/` |
//! | Config | `~/Library/Application Support/wand/` | `~/.config/wand/` |
//!
//! # Environment Overrides
//!
//! - `WAND_DATA_DIR` overrides [`data_dir`]
//! - `WAND_CONFIG_DIR` overrides [`config_dir`]

use std::path::PathBuf;

/// Database filename for the command history store.
pub const HISTORY_DB_FILENAME: &str = "history.db";

/// Application data root directory.
///
/// Resolves to `dirs::data_dir()/wand/` by default. Override with
/// the `WAND_DATA_DIR` environment variable.
#[must_use]
pub fn data_dir() -> PathBuf {
    if let Some(override_dir) = std::env::var_os("WAND_DATA_DIR") {
        return PathBuf::from(override_dir);
    }
    dirs::data_dir()
        .map(|d| d.join("wand"))
        .unwrap_or_else(|| PathBuf::from("/tmp/wand-data"))
}

/// Application config directory.
///
/// Resolves to `dirs::config_dir()/wand/` by default. Override with
/// the `WAND_CONFIG_DIR` environment variable.
#[must_use]
pub fn config_dir() -> PathBuf {
    if let Some(override_dir) = std::env::var_os("WAND_CONFIG_DIR") {
        return PathBuf::from(override_dir);
    }
    dirs::config_dir()
        .map(|d| d.join("wand"))
        .unwrap_or_else(|| PathBuf::from("/tmp/wand-config"))
}

/// Default command history database (`data_dir()/history.db`).
#[must_use]
pub fn history_db_path() -> PathBuf {
    data_dir().join(HISTORY_DB_FILENAME)
}
