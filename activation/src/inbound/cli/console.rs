//! Notifier that writes one line per notification to a console sink.

use std::io::Write;
use std::sync::{Mutex, PoisonError};

use tracing::debug;

use crate::domain::ports::{Notification, NotificationKind, Notifier};

/// Console notification sink; stdout in the binary, a buffer in tests.
pub struct ConsoleNotifier<W> {
    sink: Mutex<W>,
}

impl<W> ConsoleNotifier<W> {
    /// Wrap `sink`.
    pub const fn new(sink: W) -> Self {
        Self {
            sink: Mutex::new(sink),
        }
    }

    /// Recover the sink.
    pub fn into_inner(self) -> W {
        self.sink.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

const fn label(kind: NotificationKind) -> &'static str {
    match kind {
        NotificationKind::Success => "ok",
        NotificationKind::Info => "info",
        NotificationKind::Error => "error",
    }
}

impl<W: Write + Send> Notifier for ConsoleNotifier<W> {
    fn notify(&self, notification: Notification) {
        let mut sink = self.sink.lock().unwrap_or_else(PoisonError::into_inner);
        let written = writeln!(sink, "{}: {}", label(notification.kind), notification.message)
            .and_then(|()| sink.flush());
        if let Err(error) = written {
            debug!(error = %error, "failed to write notification");
        }
    }
}
