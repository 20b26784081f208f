//! User-facing notifications
//!
//! The pipeline reports each failed request exactly once through a
//! [`Notifier`]; the host decides how to render it (toast, status bar, log
//! line). `redirect_to_login` fires when the session is torn down after an
//! unrecoverable authorization failure.

use parking_lot::Mutex;

pub trait Notifier: Send + Sync {
    /// A request failed; `message` is ready to show as-is.
    fn error(&self, message: &str);

    /// A mutation succeeded.
    fn success(&self, _message: &str) {}

    /// The session was cleared; send the admin back to sign in.
    fn redirect_to_login(&self);
}

/// Default notifier: writes to the tracing subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn error(&self, message: &str) {
        tracing::warn!(notification = "error", "{}", message);
    }

    fn success(&self, message: &str) {
        tracing::info!(notification = "success", "{}", message);
    }

    fn redirect_to_login(&self) {
        tracing::info!(notification = "redirect", "Session ended, sign-in required");
    }
}

/// Something the admin was shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Error(String),
    Success(String),
    RedirectToLogin,
}

/// Keeps every notification in order, for headless hosts and tests.
#[derive(Debug, Default)]
pub struct CollectingNotifier {
    seen: Mutex<Vec<Notification>>,
}

impl CollectingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<Notification> {
        self.seen.lock().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.seen
            .lock()
            .iter()
            .filter_map(|n| match n {
                Notification::Error(m) => Some(m.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn redirects(&self) -> usize {
        self.seen
            .lock()
            .iter()
            .filter(|n| matches!(n, Notification::RedirectToLogin))
            .count()
    }

    pub fn take(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.seen.lock())
    }
}

impl Notifier for CollectingNotifier {
    fn error(&self, message: &str) {
        self.seen.lock().push(Notification::Error(message.to_string()));
    }

    fn success(&self, message: &str) {
        self.seen.lock().push(Notification::Success(message.to_string()));
    }

    fn redirect_to_login(&self) {
        self.seen.lock().push(Notification::RedirectToLogin);
    }
}
