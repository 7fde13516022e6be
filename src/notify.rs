//! Transient user-facing notifications.

use std::time::Duration;

/// How a notification should be styled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

/// A message shown to the viewer for `duration`.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
    pub duration: Duration,
}

impl Notification {
    pub fn new(message: impl Into<String>, severity: Severity, duration_ms: u64) -> Self {
        Self {
            message: message.into(),
            severity,
            duration: Duration::from_millis(duration_ms),
        }
    }

    pub fn info(message: impl Into<String>, duration_ms: u64) -> Self {
        Self::new(message, Severity::Info, duration_ms)
    }

    pub fn success(message: impl Into<String>, duration_ms: u64) -> Self {
        Self::new(message, Severity::Success, duration_ms)
    }

    pub fn warning(message: impl Into<String>, duration_ms: u64) -> Self {
        Self::new(message, Severity::Warning, duration_ms)
    }

    pub fn error(message: impl Into<String>, duration_ms: u64) -> Self {
        Self::new(message, Severity::Error, duration_ms)
    }
}

/// Receives notifications. Fire and forget.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Writes notifications to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, n: Notification) {
        let shown_ms = n.duration.as_millis();
        match n.severity {
            Severity::Info | Severity::Success => {
                tracing::info!(severity = n.severity.as_str(), shown_ms, "{}", n.message)
            }
            Severity::Warning => tracing::warn!(shown_ms, "{}", n.message),
            Severity::Error => tracing::error!(shown_ms, "{}", n.message),
        }
    }
}
