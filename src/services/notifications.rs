//! User-facing messages emitted by the client components.

use std::fmt::{Display, Formatter};

use parking_lot::Mutex;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Success,
    Info,
    Error,
}

impl Level {
    pub const fn as_str(self) -> &'static str {
        match self {
            Level::Success => "success",
            Level::Info => "info",
            Level::Error => "error",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub level: Level,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: Level::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: Level::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: Level::Error,
            message: message.into(),
        }
    }
}

impl Display for Notification {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.level.as_str(), self.message)
    }
}

/// Sink for notifications; the presentation layer decides how to show them.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Collects notifications until the presentation layer drains them.
#[derive(Debug, Default)]
pub struct NotificationLog {
    entries: Mutex<Vec<Notification>>,
}

impl NotificationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns everything collected so far.
    pub fn drain(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.entries.lock())
    }

    pub fn snapshot(&self) -> Vec<Notification> {
        self.entries.lock().clone()
    }
}

impl Notifier for NotificationLog {
    fn notify(&self, notification: Notification) {
        log::debug!("Notification: {notification}");
        self.entries.lock().push(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_to_str_mappings() {
        assert_eq!(Level::Success.as_str(), "success");
        assert_eq!(Level::Info.as_str(), "info");
        assert_eq!(Level::Error.as_str(), "error");
    }

    #[test]
    fn drain_empties_the_log() {
        let log = NotificationLog::new();
        log.notify(Notification::success("one"));
        log.notify(Notification::error("two"));

        let drained = log.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[1].to_string(), "[error] two");
        assert!(log.snapshot().is_empty());
    }
}
