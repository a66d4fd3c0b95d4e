//! Response tier selection for open-ended requests.
//!
//! [`ResponseSelector::resolve`] tries the configured model backend first and
//! falls back to the deterministic [`DemoResponder`] on absence, error or an
//! empty answer. It never fails and never returns an empty string.

pub mod demo;
pub mod gemini;
pub mod model;

pub use demo::DemoResponder;
pub use gemini::{GeminiBackend, GeminiConfig};
pub use model::{ModelBackend, ModelError};

use std::sync::Arc;

use tracing::{debug, warn};

/// Prompt template for text transforms. `{command}` and `{text}` are substituted.
pub const DEFAULT_TRANSFORM_PROMPT: &str = "You are an AI assistant that helps transform text. \
Follow the user's command exactly.\n\n\
Command: {command}\n\
Text to process: {text}\n\n\
Provide the transformed text only, without explanations or quotation marks.";

/// Which open-ended path a request takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseKind {
    /// Transform the context text according to the command.
    TextTransform,
    /// Answer the command itself.
    General,
}

/// The tier that produced a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseTier {
    Model,
    Demo,
}

/// Model-then-demo response resolver.
#[derive(Clone)]
pub struct ResponseSelector {
    model: Option<Arc<dyn ModelBackend>>,
    demo: DemoResponder,
    transform_prompt: String,
}

impl std::fmt::Debug for ResponseSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseSelector")
            .field("model", &self.model.as_ref().map(|m| m.name().to_owned()))
            .field("demo", &self.demo)
            .finish()
    }
}

impl Default for ResponseSelector {
    fn default() -> Self {
        Self::new(None)
    }
}

impl ResponseSelector {
    /// Create a selector. `None` means the model tier is unconfigured.
    pub fn new(model: Option<Arc<dyn ModelBackend>>) -> Self {
        Self {
            model,
            demo: DemoResponder::default(),
            transform_prompt: DEFAULT_TRANSFORM_PROMPT.to_owned(),
        }
    }

    #[must_use]
    pub fn with_demo(mut self, demo: DemoResponder) -> Self {
        self.demo = demo;
        self
    }

    #[must_use]
    pub fn with_transform_prompt(mut self, template: impl Into<String>) -> Self {
        self.transform_prompt = template.into();
        self
    }

    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    /// Build the model prompt for a request.
    pub fn prompt(&self, kind: ResponseKind, command: &str, context: Option<&str>) -> String {
        match kind {
            ResponseKind::TextTransform => fill_template(
                &self.transform_prompt,
                command,
                context.unwrap_or_default(),
            ),
            ResponseKind::General => command.to_owned(),
        }
    }

    /// Resolve a request to a non-empty response.
    pub async fn resolve(&self, kind: ResponseKind, command: &str, context: Option<&str>) -> String {
        self.resolve_with_tier(kind, command, context).await.0
    }

    /// Like [`resolve`](Self::resolve), also reporting which tier answered.
    pub async fn resolve_with_tier(
        &self,
        kind: ResponseKind,
        command: &str,
        context: Option<&str>,
    ) -> (String, ResponseTier) {
        if let Some(model) = &self.model {
            let prompt = self.prompt(kind, command, context);
            match model.generate(&prompt).await {
                Ok(text) if !text.trim().is_empty() => {
                    debug!(backend = model.name(), ?kind, "model answered");
                    return (text.trim().to_owned(), ResponseTier::Model);
                }
                Ok(_) => {
                    warn!(backend = model.name(), ?kind, "model returned empty text, using demo tier");
                }
                Err(e) => {
                    warn!(
                        backend = model.name(),
                        code = e.code(),
                        error = %e.message(),
                        "model request failed, using demo tier"
                    );
                }
            }
        }
        (self.demo.respond(kind, command, context), ResponseTier::Demo)
    }
}

/// Substitute `{command}` and `{text}` in one pass over the template, so
/// placeholder-like text inside the substituted values stays literal.
fn fill_template(template: &str, command: &str, text: &str) -> String {
    let mut out = String::with_capacity(template.len() + command.len() + text.len());
    let mut rest = template;
    loop {
        let next = [("{command}", command), ("{text}", text)]
            .into_iter()
            .filter_map(|(key, value)| rest.find(key).map(|at| (at, key, value)))
            .min_by_key(|(at, _, _)| *at);
        match next {
            Some((at, key, value)) => {
                out.push_str(&rest[..at]);
                out.push_str(value);
                rest = &rest[at + key.len()..];
            }
            None => {
                out.push_str(rest);
                return out;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;

    struct Scripted {
        answer: Result<String, ModelError>,
        prompts: Mutex<Vec<String>>,
    }

    impl Scripted {
        fn new(answer: Result<String, ModelError>) -> Arc<Self> {
            Arc::new(Self {
                answer,
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ModelBackend for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
            self.prompts.lock().unwrap().push(prompt.to_owned());
            self.answer.clone()
        }
    }

    #[tokio::test]
    async fn model_answer_is_trimmed() {
        let model = Scripted::new(Ok("  Bonjour le monde \n".into()));
        let selector = ResponseSelector::new(Some(model.clone()));
        let (text, tier) = selector
            .resolve_with_tier(ResponseKind::TextTransform, "translate to french", Some("hello world"))
            .await;
        assert_eq!(text, "Bonjour le monde");
        assert_eq!(tier, ResponseTier::Model);

        let prompts = model.prompts.lock().unwrap();
        assert!(prompts[0].contains("Command: translate to french"));
        assert!(prompts[0].contains("Text to process: hello world"));
    }

    #[tokio::test]
    async fn general_prompt_is_the_raw_command() {
        let model = Scripted::new(Ok("42".into()));
        let selector = ResponseSelector::new(Some(model.clone()));
        selector.resolve(ResponseKind::General, "What is the answer?", None).await;
        assert_eq!(model.prompts.lock().unwrap()[0], "What is the answer?");
    }

    #[tokio::test]
    async fn model_error_falls_back_to_demo() {
        let model = Scripted::new(Err(ModelError::Timeout("30s".into())));
        let selector = ResponseSelector::new(Some(model));
        let (text, tier) = selector
            .resolve_with_tier(ResponseKind::TextTransform, "summarize", Some("short text"))
            .await;
        assert_eq!(tier, ResponseTier::Demo);
        assert_eq!(text, "Brief summary: short text...");
    }

    #[tokio::test]
    async fn blank_model_answer_falls_back_to_demo() {
        let selector = ResponseSelector::new(Some(Scripted::new(Ok("   ".into()))));
        let (text, tier) = selector
            .resolve_with_tier(ResponseKind::General, "tell me a joke", None)
            .await;
        assert_eq!(tier, ResponseTier::Demo);
        assert!(text.contains("atoms"));
    }

    #[tokio::test]
    async fn unconfigured_model_uses_demo() {
        let selector = ResponseSelector::default();
        assert!(!selector.has_model());
        let text = selector.resolve(ResponseKind::General, "ponder the void", None).await;
        assert!(text.contains("ponder the void"));
    }

    #[tokio::test]
    async fn fallback_is_idempotent() {
        let selector = ResponseSelector::new(Some(Scripted::new(Err(ModelError::Auth("bad key".into())))));
        let ctx = Some("The quick brown fox jumps over the lazy dog.");
        let first = selector.resolve(ResponseKind::TextTransform, "summarize", ctx).await;
        let second = selector.resolve(ResponseKind::TextTransform, "summarize", ctx).await;
        assert_eq!(first, second);
        assert!(!first.is_empty());
    }

    #[test]
    fn custom_transform_template() {
        let selector = ResponseSelector::default().with_transform_prompt("{command} => {text}");
        assert_eq!(
            selector.prompt(ResponseKind::TextTransform, "rewrite", Some("abc")),
            "rewrite => abc"
        );
    }

    #[test]
    fn placeholders_in_values_stay_literal() {
        let selector = ResponseSelector::default();
        let prompt = selector.prompt(ResponseKind::TextTransform, "replace {text} with X", Some("SECRET"));
        assert!(prompt.contains("Command: replace {text} with X"));
        assert!(prompt.contains("Text to process: SECRET"));
        assert_eq!(prompt.matches("SECRET").count(), 1);

        let selector = ResponseSelector::default().with_transform_prompt("{text}|{command}");
        assert_eq!(
            selector.prompt(ResponseKind::TextTransform, "go", Some("{command}")),
            "{command}|go"
        );
    }
}
