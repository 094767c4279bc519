// Transient notifications - one message at a time, gone after a few seconds
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

/// How long a notification stays up before it clears itself
pub const NOTIFICATION_TIMEOUT: Duration = Duration::from_millis(5000);

/// Severity tag. Only used for styling, never for control flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Light,
    Info,
    Warning,
    Error,
    /// Whatever tag the caller made up
    Other(String),
}

impl Severity {
    pub fn as_str(&self) -> &str {
        match self {
            Severity::Light => "light",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Other(tag) => tag,
        }
    }
}

impl From<&str> for Severity {
    fn from(tag: &str) -> Self {
        match tag.to_ascii_lowercase().as_str() {
            "light" => Severity::Light,
            "info" => Severity::Info,
            "warning" => Severity::Warning,
            "error" | "danger" => Severity::Error,
            _ => Severity::Other(tag.to_string()),
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
}

/// What views observe. `generation` ticks on every Set so a stale timer can
/// tell it no longer owns the notification on screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationState {
    pub notification: Option<Notification>,
    generation: u64,
}

impl NotificationState {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationAction {
    Set(Notification),
    Remove,
    /// Timer fired for the notification set at `generation`
    Expire { generation: u64 },
}

/// Pure transition function
pub fn reduce(state: &mut NotificationState, action: NotificationAction) {
    match action {
        NotificationAction::Set(notification) => {
            state.notification = Some(notification);
            state.generation += 1;
        }
        NotificationAction::Remove => {
            state.notification = None;
        }
        NotificationAction::Expire { generation } => {
            if generation == state.generation {
                state.notification = None;
            }
        }
    }
}

/// Holds at most one live notification
///
/// `set_notification` spawns the expiry timer on the current tokio runtime,
/// so it must be called from inside one.
pub struct NotificationStore {
    state: Arc<watch::Sender<NotificationState>>,
    timer: Mutex<Option<JoinHandle<()>>>,
    timeout: Duration,
}

impl NotificationStore {
    pub fn new() -> Self {
        Self::with_timeout(NOTIFICATION_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        let (state, _) = watch::channel(NotificationState::default());
        Self {
            state: Arc::new(state),
            timer: Mutex::new(None),
            timeout,
        }
    }

    /// Replace whatever is showing and schedule its removal
    pub fn set_notification(&self, message: impl Into<String>, severity: impl Into<Severity>) {
        let notification = Notification {
            message: message.into(),
            severity: severity.into(),
        };
        debug!("Notification [{}]: {}", notification.severity, notification.message);

        let mut generation = 0;
        self.state.send_modify(|state| {
            reduce(state, NotificationAction::Set(notification));
            generation = state.generation;
        });

        let state = Arc::clone(&self.state);
        let timeout = self.timeout;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            state.send_modify(|s| reduce(s, NotificationAction::Expire { generation }));
        });

        // The old timer can't clear the new notification anyway, but there's
        // no reason to keep it around
        let mut timer = self.timer.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(old) = timer.replace(handle) {
            old.abort();
        }
    }

    pub fn clear_notification(&self) {
        self.state
            .send_modify(|state| reduce(state, NotificationAction::Remove));
    }

    pub fn current(&self) -> Option<Notification> {
        self.state.borrow().notification.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<NotificationState> {
        self.state.subscribe()
    }
}

impl Default for NotificationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for NotificationStore {
    fn drop(&mut self) {
        if let Ok(mut timer) = self.timer.lock() {
            if let Some(handle) = timer.take() {
                handle.abort();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    fn note(message: &str) -> Notification {
        Notification {
            message: message.to_string(),
            severity: Severity::Info,
        }
    }

    #[test]
    fn test_reduce_set_replaces_previous() {
        let mut state = NotificationState::default();
        reduce(&mut state, NotificationAction::Set(note("first")));
        reduce(&mut state, NotificationAction::Set(note("second")));
        assert_eq!(state.notification.as_ref().unwrap().message, "second");
        assert_eq!(state.generation(), 2);
    }

    #[test]
    fn test_reduce_ignores_stale_expiry() {
        let mut state = NotificationState::default();
        reduce(&mut state, NotificationAction::Set(note("first")));
        let first = state.generation();
        reduce(&mut state, NotificationAction::Set(note("second")));

        reduce(&mut state, NotificationAction::Expire { generation: first });
        assert_eq!(state.notification.as_ref().unwrap().message, "second");

        let second = state.generation();
        reduce(&mut state, NotificationAction::Expire { generation: second });
        assert!(state.notification.is_none());
    }

    #[test]
    fn test_severity_tags() {
        assert_eq!(Severity::from("light"), Severity::Light);
        assert_eq!(Severity::from("danger"), Severity::Error);
        assert_eq!(Severity::from("sparkly"), Severity::Other("sparkly".to_string()));
        assert_eq!(Severity::Other("sparkly".to_string()).to_string(), "sparkly");
    }

    #[tokio::test(start_paused = true)]
    async fn test_notification_expires_after_timeout() {
        let store = NotificationStore::new();
        store.set_notification("Please enter something", Severity::Light);

        sleep(Duration::from_millis(4999)).await;
        assert_eq!(
            store.current().map(|n| n.message),
            Some("Please enter something".to_string())
        );

        sleep(Duration::from_millis(2)).await;
        assert!(store.current().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_older_timer_never_clears_newer_notification() {
        let store = NotificationStore::new();
        store.set_notification("first", "info");

        sleep(Duration::from_millis(3000)).await;
        store.set_notification("second", "warning");

        // Past the first notification's deadline
        sleep(Duration::from_millis(2500)).await;
        let current = store.current().unwrap();
        assert_eq!(current.message, "second");
        assert_eq!(current.severity, Severity::Warning);

        // Past the second one's
        sleep(Duration::from_millis(2600)).await;
        assert!(store.current().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_is_immediate_regardless_of_timer() {
        let store = NotificationStore::new();
        store.set_notification("boom", Severity::Error);
        store.clear_notification();
        assert!(store.current().is_none());

        // A pending timer firing later leaves things empty
        sleep(Duration::from_millis(6000)).await;
        assert!(store.current().is_none());

        // Clearing with nothing set is fine too
        store.clear_notification();
        assert!(store.current().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribers_see_changes() {
        let store = NotificationStore::new();
        let mut rx = store.subscribe();

        store.set_notification("hello", Severity::Info);
        rx.changed().await.unwrap();
        assert_eq!(
            rx.borrow_and_update().notification.as_ref().map(|n| n.message.as_str()),
            Some("hello")
        );

        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().notification.is_none());
    }
}
