//! Single auto-dismissing notification ("toast").
//!
//! Only one notification is visible at a time; showing a new one replaces the
//! old one and restarts the timer.

use std::time::Duration;

use tokio::time::Instant;

/// How long a notification stays visible unless configured otherwise.
pub const DEFAULT_TOAST_TTL: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone)]
struct Notice {
    message: String,
    shown_at: Instant,
}

/// The notification slot.
#[derive(Debug, Clone)]
pub struct Toast {
    ttl: Duration,
    current: Option<Notice>,
}

impl Default for Toast {
    fn default() -> Self {
        Self::new(DEFAULT_TOAST_TTL)
    }
}

impl Toast {
    #[must_use]
    pub const fn new(ttl: Duration) -> Self {
        Self { ttl, current: None }
    }

    /// Show `message`, replacing whatever was visible.
    pub fn show(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!(message = %message, "Notification");
        self.current = Some(Notice {
            message,
            shown_at: Instant::now(),
        });
    }

    /// The visible message, if it has not yet timed out.
    #[must_use]
    pub fn visible(&self) -> Option<&str> {
        self.visible_at(Instant::now())
    }

    /// The message visible at `now`.
    #[must_use]
    pub fn visible_at(&self, now: Instant) -> Option<&str> {
        self.current
            .as_ref()
            .filter(|notice| now.saturating_duration_since(notice.shown_at) < self.ttl)
            .map(|notice| notice.message.as_str())
    }

    /// The last message shown, whether or not it has timed out.
    #[must_use]
    pub fn last(&self) -> Option<&str> {
        self.current.as_ref().map(|notice| notice.message.as_str())
    }
}
