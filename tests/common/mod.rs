//! Shared fake collaborators for integration tests.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use wand::actions::{ActionBackend, ActionError, ActionResult};
use wand::respond::{ModelBackend, ModelError};

/// Action backend that records every call and answers deterministically.
///
/// Operands of the form `"name@<millis>"` delay the answer, so tests can
/// force overlapping commands to finish out of order.
#[derive(Default)]
pub struct FakeActions {
    calls: Mutex<Vec<String>>,
}

impl FakeActions {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

async fn maybe_delay(operand: &str) -> &str {
    match operand.split_once('@') {
        Some((name, millis)) => {
            if let Ok(ms) = millis.parse::<u64>() {
                tokio::time::sleep(Duration::from_millis(ms)).await;
            }
            name
        }
        None => operand,
    }
}

#[async_trait]
impl ActionBackend for FakeActions {
    fn name(&self) -> &str {
        "fake"
    }

    async fn launch_app(&self, name: &str) -> ActionResult {
        self.record(format!("launch_app:{name}"));
        let name = maybe_delay(name).await;
        Ok(format!("✅ Opened {name}"))
    }

    async fn web_search(&self, query: &str) -> ActionResult {
        self.record(format!("web_search:{query}"));
        let query = maybe_delay(query).await;
        Ok(format!("🔍 Searched for: {query}"))
    }

    async fn kill_process(&self, name: &str) -> ActionResult {
        self.record(format!("kill_process:{name}"));
        Err(ActionError::NotFound(format!("process '{name}'")))
    }

    async fn wifi_passwords(&self) -> ActionResult {
        self.record("wifi_passwords".into());
        Err(ActionError::PermissionDenied("netsh wlan".into()))
    }
}

/// Model backend that always fails.
pub struct DownModel;

#[async_trait]
impl ModelBackend for DownModel {
    fn name(&self) -> &str {
        "down"
    }

    async fn generate(&self, _prompt: &str) -> Result<String, ModelError> {
        Err(ModelError::Request("connection refused".into()))
    }
}

/// Model backend that echoes the prompt with a marker.
pub struct EchoModel;

#[async_trait]
impl ModelBackend for EchoModel {
    fn name(&self) -> &str {
        "echo"
    }

    async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
        Ok(format!("model says: {prompt}"))
    }
}
