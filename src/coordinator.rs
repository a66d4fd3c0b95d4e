//! Async execution coordinator.
//!
//! [`CommandCoordinator::submit`] validates a command on the caller's thread,
//! then runs the pipeline on the tokio runtime and hands back a
//! [`Submission`] future. The caller is never blocked by dispatch, backend
//! or model I/O. Each completed command is delivered first and recorded in
//! history afterwards.
//!
//! Two scheduling policies exist (see [`DispatchOrdering`]): concurrent, with
//! no ordering between overlapping commands, and serial, a bounded FIFO queue
//! drained by one worker.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

use crate::actions::ActionBackend;
use crate::command::{Command, normalize};
use crate::config::{DispatchConfig, DispatchOrdering};
use crate::dispatch::{Dispatcher, HandlerResult};
use crate::error::{Result, WandError};
use crate::history::{HistoryLogger, HistoryRecord, HistoryStore};
use crate::respond::{DemoResponder, ModelBackend, ResponseSelector};

/// Collaborators the engine runs against, bundled at construction.
#[derive(Clone)]
pub struct WandContext {
    actions: Arc<dyn ActionBackend>,
    model: Option<Arc<dyn ModelBackend>>,
    history: HistoryLogger,
    demo: DemoResponder,
    transform_prompt: Option<String>,
}

impl std::fmt::Debug for WandContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WandContext")
            .field("actions", &self.actions.name())
            .field("model", &self.model.as_ref().map(|m| m.name().to_owned()))
            .field("history", &self.history)
            .finish()
    }
}

impl WandContext {
    /// A context with no model tier and history disabled.
    pub fn new(actions: Arc<dyn ActionBackend>) -> Self {
        Self {
            actions,
            model: None,
            history: HistoryLogger::disabled(),
            demo: DemoResponder::default(),
            transform_prompt: None,
        }
    }

    #[must_use]
    pub fn with_model(mut self, model: Arc<dyn ModelBackend>) -> Self {
        self.model = Some(model);
        self
    }

    #[must_use]
    pub fn with_history(mut self, store: Arc<dyn HistoryStore>) -> Self {
        self.history = HistoryLogger::new(store);
        self
    }

    #[must_use]
    pub fn with_demo(mut self, demo: DemoResponder) -> Self {
        self.demo = demo;
        self
    }

    #[must_use]
    pub fn with_transform_prompt(mut self, template: impl Into<String>) -> Self {
        self.transform_prompt = Some(template.into());
        self
    }

    fn responder(&self) -> ResponseSelector {
        let selector = ResponseSelector::new(self.model.clone()).with_demo(self.demo.clone());
        match &self.transform_prompt {
            Some(template) => selector.with_transform_prompt(template.clone()),
            None => selector,
        }
    }
}

/// A finished command as delivered to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandOutcome {
    pub id: String,
    pub command: String,
    #[serde(flatten)]
    pub result: HandlerResult,
}

/// Pending result of [`CommandCoordinator::submit`].
#[derive(Debug)]
pub struct Submission {
    id: String,
    rx: oneshot::Receiver<CommandOutcome>,
}

impl Submission {
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Future for Submission {
    type Output = Result<CommandOutcome>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|r| r.map_err(|_| WandError::Channel("command worker dropped the result".into())))
    }
}

struct Job {
    command: Command,
    /// Trimmed command text, as delivered and recorded.
    text: String,
    reply: oneshot::Sender<CommandOutcome>,
}

struct Engine {
    dispatcher: Dispatcher,
    history: HistoryLogger,
    timeout: Option<Duration>,
}

impl Engine {
    async fn execute(self: Arc<Self>, job: Job) {
        let result = Arc::clone(&self).run_isolated(&job.command).await;
        self.deliver(job, result).await;
    }

    /// Answer a command that could not be queued without running it.
    async fn reject(self: Arc<Self>, job: Job, reason: &str) {
        warn!(command_id = %job.command.id, reason, "command rejected");
        let result = self.failure(&job.command, format!("❌ Error: {reason}"));
        self.deliver(job, result).await;
    }

    async fn deliver(&self, job: Job, result: HandlerResult) {
        let Job {
            command,
            text,
            reply,
        } = job;
        info!(
            command_id = %command.id,
            intent = %result.intent,
            success = result.success,
            "command completed"
        );

        let record = HistoryRecord {
            command: text.clone(),
            response: result.response.clone(),
            timestamp: Utc::now(),
            success: result.success,
        };
        let outcome = CommandOutcome {
            id: command.id,
            command: text,
            result,
        };
        if reply.send(outcome).is_err() {
            debug!("submission dropped before delivery");
        }
        self.history.record(record).await;
    }

    /// Run the pipeline on its own task so a panic or timeout still yields a result.
    async fn run_isolated(self: Arc<Self>, command: &Command) -> HandlerResult {
        let engine = Arc::clone(&self);
        let text = command.text.clone();
        let context = command.context.clone();
        let mut handle =
            tokio::spawn(async move { engine.dispatcher.process(&text, context.as_deref()).await });

        let joined = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, &mut handle).await {
                Ok(joined) => joined,
                Err(_) => {
                    handle.abort();
                    warn!(command_id = %command.id, timeout_secs = limit.as_secs(), "command timed out");
                    return self.failure(
                        command,
                        format!("❌ Error: command timed out after {}s", limit.as_secs()),
                    );
                }
            },
            None => handle.await,
        };

        match joined {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => {
                warn!(command_id = %command.id, error = %e, "pipeline rejected command");
                self.failure(command, format!("❌ Error: {e}"))
            }
            Err(e) if e.is_panic() => {
                warn!(command_id = %command.id, "command handler panicked");
                self.failure(command, "❌ Error: command handler crashed")
            }
            Err(e) => {
                warn!(command_id = %command.id, error = %e, "command task cancelled");
                self.failure(command, "❌ Error: command was cancelled")
            }
        }
    }

    fn failure(&self, command: &Command, response: impl Into<String>) -> HandlerResult {
        let intent = self
            .dispatcher
            .classifier()
            .classify(&command.text.trim().to_lowercase(), command.context.is_some());
        HandlerResult::failure(intent, response)
    }
}

/// Runs submitted commands off the caller's thread.
pub struct CommandCoordinator {
    engine: Arc<Engine>,
    ordering: DispatchOrdering,
    runtime: Handle,
    tracker: TaskTracker,
    shutdown: CancellationToken,
    lane: Mutex<Option<mpsc::Sender<Job>>>,
}

impl std::fmt::Debug for CommandCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandCoordinator")
            .field("ordering", &self.ordering)
            .field("in_flight", &self.tracker.len())
            .field("shut_down", &self.shutdown.is_cancelled())
            .finish()
    }
}

impl CommandCoordinator {
    /// Create a coordinator on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`WandError::Coordinator`] outside a runtime, or
    /// [`WandError::Pattern`] if the rule tables fail to compile.
    pub fn new(ctx: WandContext, config: &DispatchConfig) -> Result<Self> {
        let runtime = Handle::try_current()
            .map_err(|e| WandError::Coordinator(format!("no tokio runtime: {e}")))?;
        Self::with_runtime(ctx, config, runtime)
    }

    /// Create a coordinator that spawns onto `runtime`.
    pub fn with_runtime(ctx: WandContext, config: &DispatchConfig, runtime: Handle) -> Result<Self> {
        let dispatcher = Dispatcher::new(Arc::clone(&ctx.actions), ctx.responder())?
            .with_clipboard_keywords(config.clipboard_keywords.clone());
        let engine = Arc::new(Engine {
            dispatcher,
            history: ctx.history.clone(),
            timeout: config.command_timeout(),
        });
        let tracker = TaskTracker::new();

        let lane = match config.ordering {
            DispatchOrdering::Concurrent => None,
            DispatchOrdering::Serial => {
                let (tx, mut rx) = mpsc::channel::<Job>(config.queue_capacity.max(1));
                let worker = Arc::clone(&engine);
                tracker.spawn_on(
                    async move {
                        while let Some(job) = rx.recv().await {
                            Arc::clone(&worker).execute(job).await;
                        }
                        debug!("serial command worker stopped");
                    },
                    &runtime,
                );
                Some(tx)
            }
        };

        info!(ordering = ?config.ordering, history = engine.history.is_enabled(), "command coordinator started");
        Ok(Self {
            engine,
            ordering: config.ordering,
            runtime,
            tracker,
            shutdown: CancellationToken::new(),
            lane: Mutex::new(lane),
        })
    }

    pub fn ordering(&self) -> DispatchOrdering {
        self.ordering
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.engine.dispatcher
    }

    /// Queue a command for execution.
    ///
    /// Returns immediately. Empty input is rejected here with
    /// [`WandError::Validation`]: nothing is dispatched or recorded.
    ///
    /// # Errors
    ///
    /// [`WandError::Validation`] for empty input, [`WandError::Coordinator`]
    /// after shutdown. A full serial queue is not an error: the command is
    /// answered with a failure result and recorded like any other.
    pub fn submit(&self, command: Command) -> Result<Submission> {
        let text = normalize(&command.text)?.original;
        if self.shutdown.is_cancelled() {
            return Err(WandError::Coordinator("coordinator is shut down".into()));
        }

        let (reply, rx) = oneshot::channel();
        let id = command.id.clone();
        debug!(command_id = %id, "command submitted");
        let job = Job {
            command,
            text,
            reply,
        };

        match self.ordering {
            DispatchOrdering::Concurrent => {
                self.tracker
                    .spawn_on(Arc::clone(&self.engine).execute(job), &self.runtime);
            }
            DispatchOrdering::Serial => {
                let lane = self
                    .lane
                    .lock()
                    .map_err(|e| WandError::Coordinator(format!("lane lock poisoned: {e}")))?;
                let tx = lane
                    .as_ref()
                    .ok_or_else(|| WandError::Coordinator("coordinator is shut down".into()))?;
                match tx.try_send(job) {
                    Ok(()) => {}
                    Err(mpsc::error::TrySendError::Full(job)) => {
                        let engine = Arc::clone(&self.engine);
                        self.tracker.spawn_on(
                            engine.reject(job, "command queue is full, try again shortly"),
                            &self.runtime,
                        );
                    }
                    Err(mpsc::error::TrySendError::Closed(_)) => {
                        return Err(WandError::Coordinator("command worker has stopped".into()));
                    }
                }
            }
        }
        Ok(Submission { id, rx })
    }

    /// Submit and invoke `callback` with the outcome when it is ready.
    ///
    /// The callback runs on a runtime task; callers that need it on their own
    /// thread forward it through their own channel. Returns the command id.
    pub fn submit_with<F>(&self, command: Command, callback: F) -> Result<String>
    where
        F: FnOnce(CommandOutcome) + Send + 'static,
    {
        let submission = self.submit(command)?;
        let id = submission.id.clone();
        self.tracker.spawn_on(
            async move {
                match submission.await {
                    Ok(outcome) => callback(outcome),
                    Err(e) => warn!(error = %e, "command result was lost"),
                }
            },
            &self.runtime,
        );
        Ok(id)
    }

    /// Number of commands (and callbacks) still running.
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Stop accepting commands, finish in-flight work, cancel pending reminders.
    pub async fn shutdown(&self) {
        self.shutdown.cancel();
        if let Ok(mut lane) = self.lane.lock() {
            lane.take();
        }
        self.tracker.close();
        self.tracker.wait().await;
        self.engine.dispatcher.reminders().shutdown().await;
        info!("command coordinator stopped");
    }
}
