//! Delayed reminder notifications.
//!
//! A reminder is a tokio task that sleeps for the requested delay and then
//! asks the action backend to show a `"Reminder"` notification. Pending
//! reminders are cancelled by [`ReminderScheduler::shutdown`].

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

use crate::actions::ActionBackend;

/// Notification title used for every reminder.
pub const REMINDER_TITLE: &str = "Reminder";

/// Spawns and tracks pending reminders.
#[derive(Clone)]
pub struct ReminderScheduler {
    actions: Arc<dyn ActionBackend>,
    tracker: TaskTracker,
    cancel: CancellationToken,
}

impl std::fmt::Debug for ReminderScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReminderScheduler")
            .field("pending", &self.tracker.len())
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}

impl ReminderScheduler {
    pub fn new(actions: Arc<dyn ActionBackend>) -> Self {
        Self {
            actions,
            tracker: TaskTracker::new(),
            cancel: CancellationToken::new(),
        }
    }

    /// Schedule `message` to be shown after `delay`.
    ///
    /// Returns `false` if the scheduler has already been shut down.
    pub fn schedule(&self, message: &str, delay: Duration) -> bool {
        if self.cancel.is_cancelled() {
            return false;
        }
        let actions = Arc::clone(&self.actions);
        let cancel = self.cancel.clone();
        let message = message.to_owned();
        debug!(%message, delay_secs = delay.as_secs(), "reminder scheduled");
        self.tracker.spawn(async move {
            tokio::select! {
                () = cancel.cancelled() => {
                    debug!(%message, "reminder cancelled");
                }
                () = tokio::time::sleep(delay) => {
                    match actions.notify(REMINDER_TITLE, &message).await {
                        Ok(_) => info!(%message, "reminder delivered"),
                        Err(e) => warn!(%message, error = %e, "reminder notification failed"),
                    }
                }
            }
        });
        true
    }

    /// Number of reminders not yet delivered or cancelled.
    pub fn pending(&self) -> usize {
        self.tracker.len()
    }

    /// Cancel pending reminders and wait for their tasks to finish.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        self.tracker.close();
        self.tracker.wait().await;
    }
}
