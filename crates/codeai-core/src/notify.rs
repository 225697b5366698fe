//! Notification center: transient toasts dismissed by a 5-second timer or
//! an explicit user action, whichever comes first.
//!
//! [`NotificationCenter`] is a cheap clonable handle over shared state; each
//! `push` spawns its own auto-dismiss task, independent of any gateway call.
//! Dismissal by id is idempotent: removing an already-removed toast is a
//! no-op.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default lifetime of a toast before auto-dismissal.
pub const AUTO_DISMISS: Duration = Duration::from_secs(5);

/// Toast severity, driving the icon and accent in the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
}

/// One transient toast message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Generated unique id, used for dismissal.
    pub id: Uuid,
    pub message: String,
    pub severity: Severity,
    pub created_at: DateTime<Utc>,
}

/// Shared toast state. Clones observe and mutate the same set.
#[derive(Clone)]
pub struct NotificationCenter {
    active: Arc<Mutex<Vec<Notification>>>,
    dismiss_after: Duration,
}

impl NotificationCenter {
    /// Center with the standard 5-second auto-dismiss.
    pub fn new() -> Self {
        Self::with_dismiss_after(AUTO_DISMISS)
    }

    /// Center with a custom auto-dismiss delay (tests use short delays).
    pub fn with_dismiss_after(dismiss_after: Duration) -> Self {
        Self {
            active: Arc::new(Mutex::new(Vec::new())),
            dismiss_after,
        }
    }

    /// Create a toast and schedule its auto-dismissal. Requires a running
    /// tokio runtime for the timer task. Returns the generated id.
    pub fn push(&self, message: impl Into<String>, severity: Severity) -> Uuid {
        let notification = Notification {
            id: Uuid::new_v4(),
            message: message.into(),
            severity,
            created_at: Utc::now(),
        };
        let id = notification.id;
        self.active
            .lock()
            .expect("notification lock poisoned")
            .push(notification);

        let center = self.clone();
        let delay = self.dismiss_after;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            center.dismiss(id);
        });
        id
    }

    /// Remove a toast by id. Idempotent: returns `false` when the id is
    /// already gone (timer fired first, or a second dismissal).
    pub fn dismiss(&self, id: Uuid) -> bool {
        let mut active = self.active.lock().expect("notification lock poisoned");
        let before = active.len();
        active.retain(|n| n.id != id);
        active.len() != before
    }

    /// Snapshot of the active toasts in creation order.
    pub fn active(&self) -> Vec<Notification> {
        self.active
            .lock()
            .expect("notification lock poisoned")
            .clone()
    }
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new()
    }
}
