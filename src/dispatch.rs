//! Handler registry: maps a classified intent to the code that serves it.
//!
//! Direct-action intents call the [`ActionBackend`]; open-ended intents go
//! through the [`ResponseSelector`]. Every path ends in a [`HandlerResult`];
//! backend errors and missing parameters become failure messages here.

use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::actions::{ActionBackend, ActionError, ActionResult};
use crate::command::normalize;
use crate::error::Result;
use crate::intent::{Extraction, Intent, IntentClassifier, ParameterExtractor};
use crate::reminders::ReminderScheduler;
use crate::respond::{ResponseKind, ResponseSelector};

/// Spoken when a speak command names no text and no context is selected.
pub const DEFAULT_SPEAK_TEXT: &str = "Hello, I am your AI assistant";

/// Encoded when a QR command names no text and no context is selected.
pub const DEFAULT_QR_TEXT: &str = "Hello World";

/// Clipboard-worthy transform keywords used when none are configured.
pub const DEFAULT_CLIPBOARD_KEYWORDS: &[&str] = &["fix", "translate", "rewrite", "grammar"];

/// Outcome of handling one command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HandlerResult {
    pub intent: Intent,
    pub response: String,
    pub success: bool,
    /// The caller should place `response` on the clipboard.
    pub copy_to_clipboard: bool,
}

impl HandlerResult {
    pub fn ok(intent: Intent, response: impl Into<String>) -> Self {
        Self {
            intent,
            response: response.into(),
            success: true,
            copy_to_clipboard: false,
        }
    }

    pub fn failure(intent: Intent, response: impl Into<String>) -> Self {
        Self {
            intent,
            response: response.into(),
            success: false,
            copy_to_clipboard: false,
        }
    }

    fn from_action(intent: Intent, result: ActionResult) -> Self {
        match result {
            Ok(text) => Self::ok(intent, text),
            Err(e) => {
                warn!(%intent, error = %e, "action backend failed");
                Self::failure(intent, failure_message(intent, &e))
            }
        }
    }
}

fn failure_message(intent: Intent, err: &ActionError) -> String {
    let what = match intent {
        Intent::LaunchApp => "opening application",
        Intent::WebSearch => "searching",
        Intent::OpenSite => "opening website",
        Intent::SystemInfo => "getting system info",
        Intent::KillProcess => "killing process",
        Intent::PowerAction => "changing power state",
        Intent::CreateFile => "creating file",
        Intent::WifiInfo => "retrieving WiFi passwords",
        Intent::SpeedTest => "testing network speed",
        Intent::Screenshot => "taking screenshot",
        Intent::QrCode => "generating QR code",
        Intent::InstalledPrograms => "getting programs",
        Intent::EmptyTrash => "emptying recycle bin",
        Intent::BatteryInfo => "getting battery info",
        Intent::Speak => "speaking",
        Intent::Listen => "listening",
        Intent::SendEmail => "sending email",
        Intent::Reminder | Intent::Notification => "sending notification",
        Intent::TextTransform | Intent::GeneralAi => "processing request",
    };
    format!("❌ Error {what}: {err}")
}

type DispatchFuture<'a> = Pin<Box<dyn Future<Output = HandlerResult> + Send + 'a>>;

/// The classify → extract → dispatch pipeline.
///
/// Rule and pattern tables are compiled once and read-only afterwards, so a
/// single dispatcher can serve any number of concurrent commands.
#[derive(Debug)]
pub struct Dispatcher {
    classifier: IntentClassifier,
    extractor: ParameterExtractor,
    actions: Arc<dyn ActionBackend>,
    responder: ResponseSelector,
    reminders: ReminderScheduler,
    clipboard_keywords: Vec<String>,
}

impl Dispatcher {
    /// # Errors
    ///
    /// Returns [`WandError::Pattern`](crate::WandError::Pattern) if a rule or
    /// extraction pattern fails to compile.
    pub fn new(actions: Arc<dyn ActionBackend>, responder: ResponseSelector) -> Result<Self> {
        Ok(Self {
            classifier: IntentClassifier::new()?,
            extractor: ParameterExtractor::new()?,
            reminders: ReminderScheduler::new(Arc::clone(&actions)),
            actions,
            responder,
            clipboard_keywords: DEFAULT_CLIPBOARD_KEYWORDS
                .iter()
                .map(|k| (*k).to_owned())
                .collect(),
        })
    }

    #[must_use]
    pub fn with_clipboard_keywords(mut self, keywords: Vec<String>) -> Self {
        self.clipboard_keywords = keywords.into_iter().map(|k| k.to_lowercase()).collect();
        self
    }

    pub fn classifier(&self) -> &IntentClassifier {
        &self.classifier
    }

    pub fn extractor(&self) -> &ParameterExtractor {
        &self.extractor
    }

    pub fn reminders(&self) -> &ReminderScheduler {
        &self.reminders
    }

    /// Run the whole pipeline for one command.
    ///
    /// # Errors
    ///
    /// Only [`WandError::Validation`](crate::WandError::Validation), for empty
    /// input. Nothing is dispatched in that case.
    pub async fn process(&self, text: &str, context: Option<&str>) -> Result<HandlerResult> {
        let normalized = normalize(text)?;
        Ok(self.run(normalized.original, context, true).await)
    }

    fn run<'a>(&'a self, text: String, context: Option<&'a str>, chain: bool) -> DispatchFuture<'a> {
        Box::pin(async move {
            let lowered = text.to_lowercase();
            let intent = self.classifier.classify(&lowered, context.is_some());
            let extraction = self.extractor.extract(intent, &text);
            debug!(%intent, ?extraction, "dispatching");
            if intent == Intent::Listen && chain {
                return self.listen_and_chain(context).await;
            }
            self.dispatch(intent, extraction, &text, context).await
        })
    }

    async fn listen_and_chain(&self, context: Option<&str>) -> HandlerResult {
        let heard = match self.actions.listen().await {
            Ok(heard) => heard,
            Err(e) => return HandlerResult::from_action(Intent::Listen, Err(e)),
        };
        let heard = heard.trim();
        if heard.is_empty() {
            return HandlerResult::failure(Intent::Listen, "❌ No speech detected");
        }
        debug!(heard, "chaining voice command");
        let nested = self.run(heard.to_owned(), context, false).await;
        HandlerResult {
            intent: Intent::Listen,
            response: format!("🎤 Heard: {heard}\nProcessing voice command: {}", nested.response),
            success: nested.success,
            copy_to_clipboard: nested.copy_to_clipboard,
        }
    }

    /// Serve an already classified and extracted command.
    ///
    /// Listen is answered with the heard text only; chaining happens in
    /// [`process`](Self::process).
    pub async fn dispatch(
        &self,
        intent: Intent,
        extraction: Extraction,
        command: &str,
        context: Option<&str>,
    ) -> HandlerResult {
        if let Extraction::Missing { hint } = &extraction
            && !matches!(intent, Intent::Speak | Intent::QrCode)
        {
            return HandlerResult::failure(intent, format!("❌ {hint}"));
        }

        let actions = self.actions.as_ref();
        let operand = extraction.operand().unwrap_or_default();
        let result = match (intent, &extraction) {
            (Intent::LaunchApp, _) => actions.launch_app(operand).await,
            (Intent::WebSearch, _) => actions.web_search(operand).await,
            (Intent::OpenSite, _) => actions.open_site(operand).await,
            (Intent::SystemInfo, _) => actions.system_info().await,
            (Intent::KillProcess, _) => actions.kill_process(operand).await,
            (Intent::PowerAction, Extraction::Power(kind)) => actions.power_action(*kind).await,
            (Intent::CreateFile, _) => actions.create_file(operand).await,
            (Intent::WifiInfo, _) => actions.wifi_passwords().await,
            (Intent::SpeedTest, _) => actions.speed_test().await,
            (Intent::Screenshot, Extraction::Operand(path)) => {
                actions.screenshot(Some(Path::new(path))).await
            }
            (Intent::Screenshot, _) => actions.screenshot(None).await,
            (Intent::QrCode, _) => {
                actions
                    .generate_qr(&operand_or_context(&extraction, context, DEFAULT_QR_TEXT))
                    .await
            }
            (Intent::InstalledPrograms, _) => actions.installed_programs().await,
            (Intent::EmptyTrash, _) => actions.empty_recycle_bin().await,
            (Intent::BatteryInfo, _) => actions.battery_info().await,
            (Intent::Speak, _) => {
                actions
                    .speak(&operand_or_context(&extraction, context, DEFAULT_SPEAK_TEXT))
                    .await
            }
            (Intent::Listen, _) => actions.listen().await.map(|heard| format!("🎤 Heard: {heard}")),
            (Intent::SendEmail, Extraction::Email(message)) => actions.send_email(message).await,
            (Intent::Reminder, Extraction::Reminder { message, delay, when }) => {
                return if self.reminders.schedule(message, *delay) {
                    HandlerResult::ok(intent, format!("⏰ Reminder set: {message} in {when}"))
                } else {
                    HandlerResult::failure(intent, "❌ Reminders are no longer accepted")
                };
            }
            (Intent::Notification, Extraction::Notification { title, message }) => {
                actions.notify(title, message).await
            }
            (Intent::TextTransform, _) => {
                return self.respond(intent, ResponseKind::TextTransform, command, context).await;
            }
            (Intent::GeneralAi, _) => {
                return self.respond(intent, ResponseKind::General, command, context).await;
            }
            (intent, other) => {
                warn!(%intent, extraction = ?other, "extraction does not fit intent");
                return HandlerResult::failure(
                    intent,
                    format!("❌ {}", crate::intent::extractor::missing_hint(intent)),
                );
            }
        };
        HandlerResult::from_action(intent, result)
    }

    async fn respond(
        &self,
        intent: Intent,
        kind: ResponseKind,
        command: &str,
        context: Option<&str>,
    ) -> HandlerResult {
        let response = self.responder.resolve(kind, command, context).await;
        let mut result = HandlerResult::ok(intent, response);
        result.copy_to_clipboard = kind == ResponseKind::TextTransform
            && context.is_some()
            && self.wants_clipboard(command);
        result
    }

    fn wants_clipboard(&self, command: &str) -> bool {
        let lowered = command.to_lowercase();
        self.clipboard_keywords
            .iter()
            .any(|k| lowered.contains(k.as_str()))
    }
}

fn operand_or_context(extraction: &Extraction, context: Option<&str>, default: &str) -> String {
    extraction
        .operand()
        .or(context.filter(|c| !c.trim().is_empty()))
        .unwrap_or(default)
        .to_owned()
}
