//! Intent classification and parameter extraction.
//!
//! # Rule order
//!
//! | Priority | Phrases | Intent |
//! |----------|---------|--------|
//! | 1 | open, launch, start, run | [`Intent::LaunchApp`] |
//! | 2 | search, google, find | [`Intent::WebSearch`] |
//! | 3 | website, browse, go to | [`Intent::OpenSite`] |
//! | 4 | system info, system status | [`Intent::SystemInfo`] |
//! | 5 | kill, close, stop | [`Intent::KillProcess`] |
//! | 6 | shutdown, restart, sleep, hibernate | [`Intent::PowerAction`] |
//! | 7 | create file, new file, make file | [`Intent::CreateFile`] |
//! | 8 | wifi password, wifi info | [`Intent::WifiInfo`] |
//! | 9 | speed test, network speed | [`Intent::SpeedTest`] |
//! | 10 | screenshot | [`Intent::Screenshot`] |
//! | 11 | qr code | [`Intent::QrCode`] |
//! | 12 | installed programs, list programs | [`Intent::InstalledPrograms`] |
//! | 13 | empty recycle bin, clear trash | [`Intent::EmptyTrash`] |
//! | 14 | battery, power status | [`Intent::BatteryInfo`] |
//! | 15 | speak, say | [`Intent::Speak`] |
//! | 16 | listen, voice input | [`Intent::Listen`] |
//! | 17 | send email | [`Intent::SendEmail`] |
//! | 18 | remind me, set reminder | [`Intent::Reminder`] |
//! | 19 | notification | [`Intent::Notification`] |
//! | 20 | *(context text present)* | [`Intent::TextTransform`] |
//! | 21 | *(anything else)* | [`Intent::GeneralAi`] |

pub mod classifier;
pub mod extractor;

pub use classifier::{IntentClassifier, IntentRule};
pub use extractor::{Extraction, ParameterExtractor};

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

/// Classified category of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    LaunchApp,
    WebSearch,
    OpenSite,
    SystemInfo,
    KillProcess,
    PowerAction,
    CreateFile,
    WifiInfo,
    SpeedTest,
    Screenshot,
    QrCode,
    InstalledPrograms,
    EmptyTrash,
    BatteryInfo,
    Speak,
    Listen,
    SendEmail,
    Reminder,
    Notification,
    /// Open-ended request that operates on the supplied context text.
    TextTransform,
    /// Open-ended request with no context text.
    GeneralAi,
}

impl Intent {
    /// Stable snake_case tag used in logs and host output.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LaunchApp => "launch_app",
            Self::WebSearch => "web_search",
            Self::OpenSite => "open_site",
            Self::SystemInfo => "system_info",
            Self::KillProcess => "kill_process",
            Self::PowerAction => "power_action",
            Self::CreateFile => "create_file",
            Self::WifiInfo => "wifi_info",
            Self::SpeedTest => "speed_test",
            Self::Screenshot => "screenshot",
            Self::QrCode => "qr_code",
            Self::InstalledPrograms => "installed_programs",
            Self::EmptyTrash => "empty_trash",
            Self::BatteryInfo => "battery_info",
            Self::Speak => "speak",
            Self::Listen => "listen",
            Self::SendEmail => "send_email",
            Self::Reminder => "reminder",
            Self::Notification => "notification",
            Self::TextTransform => "text_transform",
            Self::GeneralAi => "general_ai",
        }
    }

    /// Whether this intent is answered by the response tiers rather than
    /// the action backend.
    pub fn is_open_ended(self) -> bool {
        matches!(self, Self::TextTransform | Self::GeneralAi)
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compile a case-insensitive matcher for any of `phrases` as whole words.
///
/// Inner whitespace in a phrase matches any whitespace run, and a trailing
/// plural `s` is accepted ("wifi passwords" matches "wifi password").
pub fn phrase_matcher(phrases: &[&str]) -> Result<Regex, regex::Error> {
    let alternatives: Vec<String> = phrases
        .iter()
        .map(|p| {
            p.split_whitespace()
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join(r"\s+")
        })
        .collect();
    RegexBuilder::new(&format!(r"\b(?:{})s?\b", alternatives.join("|")))
        .case_insensitive(true)
        .build()
}
