//! Notifier adapter that records notifications as log events.
//!
//! Used by headless hosts (the reference backend, batch tooling) where no
//! user is watching a toast area.

use tracing::{error, info};

use crate::domain::ports::{Notification, NotificationKind, Notifier};

/// Emits each notification as a `tracing` event at a matching level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.kind {
            NotificationKind::Success => {
                info!(kind = "success", message = %notification.message, "notification");
            }
            NotificationKind::Info => {
                info!(kind = "info", message = %notification.message, "notification");
            }
            NotificationKind::Error => {
                error!(kind = "error", message = %notification.message, "notification");
            }
        }
    }
}
