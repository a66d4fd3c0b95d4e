//! Ordered rule table mapping phrase predicates to intents.
//!
//! Rules are evaluated top to bottom and the first match wins. Predicates
//! overlap ("open website google.com" fires the launch rule as well as the
//! website rule), so the table order is the precedence.

use regex::Regex;
use tracing::debug;

use super::{Intent, phrase_matcher};

/// Declared rule table: `(intent, phrases)` in priority order.
const RULE_TABLE: &[(Intent, &[&str])] = &[
    (Intent::LaunchApp, &["open", "launch", "start", "run"]),
    (Intent::WebSearch, &["search", "google", "find"]),
    (Intent::OpenSite, &["website", "browse", "go to"]),
    (Intent::SystemInfo, &["system info", "system status"]),
    (Intent::KillProcess, &["kill", "close", "stop"]),
    (
        Intent::PowerAction,
        &["shutdown", "restart", "sleep", "hibernate"],
    ),
    (Intent::CreateFile, &["create file", "new file", "make file"]),
    (Intent::WifiInfo, &["wifi password", "wifi info"]),
    (Intent::SpeedTest, &["speed test", "network speed"]),
    (Intent::Screenshot, &["screenshot"]),
    (Intent::QrCode, &["qr code"]),
    (
        Intent::InstalledPrograms,
        &["installed programs", "list programs"],
    ),
    (Intent::EmptyTrash, &["empty recycle bin", "clear trash"]),
    (Intent::BatteryInfo, &["battery", "power status"]),
    (Intent::Speak, &["speak", "say"]),
    (Intent::Listen, &["listen", "voice input"]),
    (Intent::SendEmail, &["send email"]),
    (Intent::Reminder, &["remind me", "set reminder"]),
    (Intent::Notification, &["notification"]),
];

/// One compiled `(predicate, intent)` rule.
#[derive(Debug, Clone)]
pub struct IntentRule {
    /// 1-based position in the table; lower fires first.
    pub priority: usize,
    pub intent: Intent,
    pub phrases: &'static [&'static str],
    matcher: Regex,
}

impl IntentRule {
    /// Whether this rule's predicate holds for the given text.
    pub fn matches(&self, text: &str) -> bool {
        self.matcher.is_match(text)
    }
}

/// Rule-based intent classifier. Read-only after construction.
#[derive(Debug, Clone)]
pub struct IntentClassifier {
    rules: Vec<IntentRule>,
}

impl IntentClassifier {
    /// Compile the rule table.
    ///
    /// # Errors
    ///
    /// Returns an error if a phrase pattern fails to compile.
    pub fn new() -> Result<Self, regex::Error> {
        let rules = RULE_TABLE
            .iter()
            .enumerate()
            .map(|(idx, (intent, phrases))| {
                Ok(IntentRule {
                    priority: idx + 1,
                    intent: *intent,
                    phrases,
                    matcher: phrase_matcher(phrases)?,
                })
            })
            .collect::<Result<Vec<_>, regex::Error>>()?;
        Ok(Self { rules })
    }

    /// The compiled rules in priority order.
    pub fn rules(&self) -> &[IntentRule] {
        &self.rules
    }

    /// Classify normalized command text.
    ///
    /// Pure function of `text` and whether context text accompanies the
    /// command.
    pub fn classify(&self, text: &str, has_context: bool) -> Intent {
        if let Some(rule) = self.rules.iter().find(|r| r.matches(text)) {
            debug!(
                intent = %rule.intent,
                priority = rule.priority,
                "classified by rule"
            );
            return rule.intent;
        }
        let intent = if has_context {
            Intent::TextTransform
        } else {
            Intent::GeneralAi
        };
        debug!(intent = %intent, has_context, "no rule matched");
        intent
    }

    /// Every rule whose predicate holds, in priority order.
    ///
    /// The first entry (if any) is the rule [`classify`](Self::classify) picks.
    pub fn matching_rules(&self, text: &str) -> Vec<&IntentRule> {
        self.rules.iter().filter(|r| r.matches(text)).collect()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    fn classifier() -> IntentClassifier {
        IntentClassifier::new().unwrap()
    }

    #[test]
    fn table_has_nineteen_keyword_rules_in_order() {
        let c = classifier();
        assert_eq!(c.rules().len(), 19);
        assert_eq!(c.rules()[0].intent, Intent::LaunchApp);
        assert_eq!(c.rules()[18].intent, Intent::Notification);
        for (idx, rule) in c.rules().iter().enumerate() {
            assert_eq!(rule.priority, idx + 1);
        }
    }

    #[test]
    fn launch_verbs() {
        let c = classifier();
        for text in ["open notepad", "launch chrome", "start spotify", "run vlc"] {
            assert_eq!(c.classify(text, false), Intent::LaunchApp, "{text}");
        }
    }

    #[test]
    fn each_rule_group_classifies() {
        let c = classifier();
        let cases = [
            ("search for python tutorials", Intent::WebSearch),
            ("google rust lifetimes", Intent::WebSearch),
            ("browse example.com", Intent::OpenSite),
            ("go to github.com", Intent::OpenSite),
            ("system info", Intent::SystemInfo),
            ("kill chrome", Intent::KillProcess),
            ("restart", Intent::PowerAction),
            ("hibernate the machine", Intent::PowerAction),
            ("create file notes.txt", Intent::CreateFile),
            ("wifi passwords", Intent::WifiInfo),
            ("network speed", Intent::SpeedTest),
            ("take a screenshot", Intent::Screenshot),
            ("qr code hello", Intent::QrCode),
            ("installed programs", Intent::InstalledPrograms),
            ("empty recycle bin", Intent::EmptyTrash),
            ("battery", Intent::BatteryInfo),
            ("say good morning", Intent::Speak),
            ("voice input", Intent::Listen),
            ("send email to a@b.com subject hi", Intent::SendEmail),
            ("remind me to call mum in 5 minutes", Intent::Reminder),
            ("notification build done", Intent::Notification),
        ];
        for (text, expected) in cases {
            assert_eq!(c.classify(text, false), expected, "{text}");
        }
    }

    #[test]
    fn open_website_resolves_to_earliest_rule() {
        let c = classifier();
        let text = "open website google.com";
        let fired = c.matching_rules(text);
        let intents: Vec<Intent> = fired.iter().map(|r| r.intent).collect();
        assert_eq!(intents, vec![Intent::LaunchApp, Intent::WebSearch, Intent::OpenSite]);
        assert_eq!(c.classify(text, false), fired[0].intent);
        assert_eq!(c.classify(text, false), Intent::LaunchApp);
    }

    #[test]
    fn restart_is_not_a_launch() {
        let c = classifier();
        assert_eq!(c.classify("restart", false), Intent::PowerAction);
    }

    #[test]
    fn fallback_depends_on_context() {
        let c = classifier();
        assert_eq!(c.classify("fix grammar", true), Intent::TextTransform);
        assert_eq!(c.classify("tell me a joke", false), Intent::GeneralAi);
    }

    #[test]
    fn keyword_rules_beat_context_fallback() {
        let c = classifier();
        assert_eq!(c.classify("search for this", true), Intent::WebSearch);
    }

    #[test]
    fn classification_is_stable() {
        let c = classifier();
        let first = c.classify("what is the weather", false);
        for _ in 0..10 {
            assert_eq!(c.classify("what is the weather", false), first);
        }
    }
}
