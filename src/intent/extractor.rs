//! Per-intent parameter extraction.
//!
//! Each intent owns an ordered list of patterns tried against the original
//! (case-preserved) command text. The first pattern that yields a usable
//! operand wins; if none does, the result is [`Extraction::Missing`] with a
//! guidance message for the user.

use std::collections::HashMap;
use std::time::Duration;

use regex::{Captures, Regex};

use super::Intent;
use crate::actions::{EmailMessage, PowerKind};

/// Title used for notifications that do not name one.
pub const DEFAULT_NOTIFICATION_TITLE: &str = "AI Assistant";

/// Message used for a bare "notification" command.
pub const DEFAULT_NOTIFICATION_MESSAGE: &str = "Test notification";

/// Captured operands that carry no information on their own.
const FILLER_WORDS: &[&str] = &[
    "a", "an", "the", "for", "me", "it", "this", "generate", "make", "create",
];

/// Declared pattern table: `(intent, patterns)` with patterns in try order.
///
/// Keywords take the same optional trailing `s` the classifier accepts.
const PATTERN_TABLE: &[(Intent, &[&str])] = &[
    (
        Intent::LaunchApp,
        &[
            r"(?i)\b(?:open|launch|start|run)s?\s+(.+)",
            r"(?i)^(.+?)\s+(?:open|launch|start|run)s?\b",
        ],
    ),
    (
        Intent::WebSearch,
        &[
            r"(?i)\b(?:search|google|find)s?\s+(?:for\s+)?(.+)",
            r"(?i)^(.+?)\s+(?:search|google)s?\b",
        ],
    ),
    (
        Intent::OpenSite,
        &[
            r"(?i)\b(?:website|browse|go\s+to)s?\s+(.+)",
            r"(?i)\bopens?\s+(\S+\.(?:com|org|net|edu|gov|io|dev))\b",
        ],
    ),
    (Intent::KillProcess, &[r"(?i)\b(?:kill|close|stop)s?\s+(.+)"]),
    (
        Intent::PowerAction,
        &[r"(?i)\b(shutdown|restart|sleep|hibernate)s?\b"],
    ),
    (
        Intent::CreateFile,
        &[r"(?i)\b(?:create|new|make)\s+files?\s+(?:named\s+|called\s+)?(.+)"],
    ),
    (
        Intent::Screenshot,
        &[r"(?i)\bscreenshots?\s+(?:to|as|at|into)\s+(.+)"],
    ),
    (
        Intent::QrCode,
        &[
            r"(?i)\bqr\s+codes?\s+(?:for\s+|of\s+|with\s+)?(.+)",
            r"(?i)^(?:generate\s+)?(?:an?\s+)?(.+?)\s+(?:as\s+)?(?:an?\s+)?qr\s+code",
        ],
    ),
    (Intent::Speak, &[r"(?i)\b(?:speak|say)s?\s+(.+)"]),
    (
        Intent::SendEmail,
        &[
            r"(?i)\bsend\s+emails?\s+to\s+(?P<to>\S+@\S+)\s+subject\s+(?P<subject>.+?)\s+body\s+(?P<body>.+)$",
            r"(?i)\bsend\s+emails?\s+to\s+(?P<to>\S+@\S+)\s+subject\s+(?P<subject>.+)$",
        ],
    ),
    (
        Intent::Reminder,
        &[
            r"(?i)\b(?:remind\s+me|set\s+reminder)s?\s+(?:to\s+|for\s+)?(?P<message>.+?)\s+in\s+(?P<amount>\d+)\s*(?P<unit>seconds?|secs?|minutes?|mins?|hours?|hrs?)\b",
        ],
    ),
    (
        Intent::Notification,
        &[
            r"(?i)\bnotifications?\b\s*:?\s*(?P<title>[^:]+?)\s*:\s*(?P<message>.+)$",
            r"(?i)\bnotifications?\b\s*:?\s*(?P<message>.+)$",
        ],
    ),
];

/// Parameters pulled out of a command for its intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// The intent takes no operand.
    NoOperand,
    /// A single free-text operand (app name, query, URL, path, ...).
    Operand(String),
    /// Which power action was requested.
    Power(PowerKind),
    /// A fully specified email.
    Email(EmailMessage),
    /// A reminder message and its delay.
    Reminder {
        message: String,
        delay: Duration,
        /// The delay as the user phrased it, e.g. "30 minutes".
        when: String,
    },
    /// A notification title and body.
    Notification { title: String, message: String },
    /// No pattern matched; `hint` tells the user what to supply.
    Missing { hint: String },
}

impl Extraction {
    /// The single operand, if this extraction carries one.
    pub fn operand(&self) -> Option<&str> {
        match self {
            Self::Operand(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing { .. })
    }
}

/// Compiled pattern table. Read-only after construction.
#[derive(Debug, Clone)]
pub struct ParameterExtractor {
    patterns: HashMap<Intent, Vec<Regex>>,
}

impl ParameterExtractor {
    /// Compile the pattern table.
    ///
    /// # Errors
    ///
    /// Returns an error if a pattern fails to compile.
    pub fn new() -> Result<Self, regex::Error> {
        let mut patterns = HashMap::new();
        for (intent, sources) in PATTERN_TABLE {
            let compiled = sources
                .iter()
                .map(|s| Regex::new(s))
                .collect::<Result<Vec<_>, _>>()?;
            patterns.insert(*intent, compiled);
        }
        Ok(Self { patterns })
    }

    /// Extract the parameters for `intent` from the original command text.
    pub fn extract(&self, intent: Intent, text: &str) -> Extraction {
        match intent {
            Intent::SystemInfo
            | Intent::WifiInfo
            | Intent::SpeedTest
            | Intent::InstalledPrograms
            | Intent::EmptyTrash
            | Intent::BatteryInfo
            | Intent::Listen => Extraction::NoOperand,
            Intent::TextTransform | Intent::GeneralAi => {
                Extraction::Operand(text.trim().to_owned())
            }
            Intent::Screenshot => self
                .first_operand(intent, text)
                .map_or(Extraction::NoOperand, Extraction::Operand),
            Intent::PowerAction => self
                .first_operand(intent, text)
                .and_then(|kw| PowerKind::from_keyword(&kw))
                .map_or_else(|| missing(intent), Extraction::Power),
            Intent::SendEmail => self.extract_email(text),
            Intent::Reminder => self.extract_reminder(text),
            Intent::Notification => self.extract_notification(text),
            Intent::LaunchApp
            | Intent::WebSearch
            | Intent::OpenSite
            | Intent::KillProcess
            | Intent::CreateFile
            | Intent::QrCode
            | Intent::Speak => self
                .first_operand(intent, text)
                .map_or_else(|| missing(intent), Extraction::Operand),
        }
    }

    fn patterns_for(&self, intent: Intent) -> &[Regex] {
        self.patterns.get(&intent).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First capture group of the first pattern that yields a usable operand.
    fn first_operand(&self, intent: Intent, text: &str) -> Option<String> {
        self.patterns_for(intent).iter().find_map(|re| {
            re.captures(text)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().trim().to_owned())
                .filter(|s| is_meaningful(s))
        })
    }

    fn first_captures<'t>(&self, intent: Intent, text: &'t str) -> Option<Captures<'t>> {
        self.patterns_for(intent)
            .iter()
            .find_map(|re| re.captures(text))
    }

    fn extract_email(&self, text: &str) -> Extraction {
        let Some(caps) = self.first_captures(Intent::SendEmail, text) else {
            return missing(Intent::SendEmail);
        };
        let field = |name: &str| {
            caps.name(name)
                .map(|m| m.as_str().trim().to_owned())
                .unwrap_or_default()
        };
        Extraction::Email(EmailMessage {
            to: field("to"),
            subject: field("subject"),
            body: field("body"),
        })
    }

    fn extract_reminder(&self, text: &str) -> Extraction {
        let Some(caps) = self.first_captures(Intent::Reminder, text) else {
            return missing(Intent::Reminder);
        };
        let message = caps.name("message").map(|m| m.as_str().trim().to_owned());
        let amount = caps
            .name("amount")
            .and_then(|m| m.as_str().parse::<u64>().ok());
        let unit = caps.name("unit").map(|m| m.as_str().to_lowercase());

        match (message, amount, unit) {
            (Some(message), Some(amount), Some(unit)) if is_meaningful(&message) => {
                match unit_seconds(&unit).and_then(|s| amount.checked_mul(s)) {
                    Some(secs) => Extraction::Reminder {
                        message,
                        delay: Duration::from_secs(secs),
                        when: format!("{amount} {unit}"),
                    },
                    None => missing(Intent::Reminder),
                }
            }
            _ => missing(Intent::Reminder),
        }
    }

    fn extract_notification(&self, text: &str) -> Extraction {
        let Some(caps) = self.first_captures(Intent::Notification, text) else {
            return Extraction::Notification {
                title: DEFAULT_NOTIFICATION_TITLE.to_owned(),
                message: DEFAULT_NOTIFICATION_MESSAGE.to_owned(),
            };
        };
        let title = caps
            .name("title")
            .map(|m| m.as_str().trim())
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_NOTIFICATION_TITLE);
        let message = caps
            .name("message")
            .map(|m| m.as_str().trim())
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_NOTIFICATION_MESSAGE);
        Extraction::Notification {
            title: title.to_owned(),
            message: message.to_owned(),
        }
    }
}

fn is_meaningful(operand: &str) -> bool {
    !operand.is_empty() && !FILLER_WORDS.contains(&operand.to_lowercase().as_str())
}

fn unit_seconds(unit: &str) -> Option<u64> {
    match unit {
        "second" | "seconds" | "sec" | "secs" => Some(1),
        "minute" | "minutes" | "min" | "mins" => Some(60),
        "hour" | "hours" | "hr" | "hrs" => Some(3600),
        _ => None,
    }
}

/// User-facing guidance for an intent whose operand could not be found.
pub fn missing_hint(intent: Intent) -> &'static str {
    match intent {
        Intent::LaunchApp => "Please specify which application to open",
        Intent::WebSearch => "Please specify what to search for",
        Intent::OpenSite => "Please specify which website to open",
        Intent::KillProcess => "Please specify which process to kill",
        Intent::PowerAction => "Please specify shutdown, restart, sleep or hibernate",
        Intent::CreateFile => "Please specify a filename",
        Intent::QrCode => "Please specify the text to encode",
        Intent::Speak => "Please specify what to say",
        Intent::SendEmail => {
            "Email format: 'send email to user@example.com subject Hello body How are you?'"
        }
        Intent::Reminder => "Reminder format: 'remind me to call John in 30 minutes'",
        _ => "Please rephrase the command",
    }
}

fn missing(intent: Intent) -> Extraction {
    Extraction::Missing {
        hint: missing_hint(intent).to_owned(),
    }
}
