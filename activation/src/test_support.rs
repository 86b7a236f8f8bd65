//! Test utilities for the activation crate.
//!
//! Shared by unit tests (in `src/`) and integration tests (in `tests/`, via
//! the `test-support` feature).

use std::io;
use std::net::TcpListener;
use std::sync::{Arc, Mutex, MutexGuard};

use actix_web::dev::ServerHandle;
use chrono::{DateTime, Local, TimeDelta, Utc};
use mockable::{Clock, DefaultClock};
use url::Url;

use crate::domain::ActivationCode;
use crate::domain::ports::{FixtureAuthenticator, Notification, NotificationKind, Notifier};
use crate::inbound::http::{HttpState, ServerOptions, reference_server};
use crate::outbound::registry::InMemoryActivationRegistry;

/// Notifier that remembers everything it was asked to show.
#[derive(Debug, Default)]
pub struct RecordingNotifier(Mutex<Vec<Notification>>);

impl RecordingNotifier {
    /// Every notification so far, oldest first.
    pub fn notifications(&self) -> Vec<Notification> {
        self.lock().clone()
    }

    /// Messages of notifications with `kind`.
    pub fn messages(&self, kind: NotificationKind) -> Vec<String> {
        self.lock()
            .iter()
            .filter(|notification| notification.kind == kind)
            .map(|notification| notification.message.clone())
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Notification>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("notifier mutex"),
        }
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.lock().push(notification);
    }
}

/// Clock whose time only moves when told to.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    /// Clock frozen at `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    /// Move time forward by whole seconds.
    pub fn advance_seconds(&self, seconds: i64) {
        *self.lock_clock() += TimeDelta::seconds(seconds);
    }

    fn lock_clock(&self) -> MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex"),
        }
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

/// A reference backend listening on an ephemeral local port.
pub struct ReferenceServer {
    /// Base URL for gateway clients.
    pub base_url: Url,
    /// Handle used to stop the server.
    pub handle: ServerHandle,
    /// Registry backing the server, for direct inspection.
    pub registry: Arc<InMemoryActivationRegistry>,
}

/// Start the reference backend with `codes` issued.
///
/// Must be called from inside a Tokio `LocalSet` (actix spawns its server
/// task locally). Stop it with `server.handle.stop(true).await`.
///
/// # Errors
///
/// Returns an error when no local port can be bound.
pub fn spawn_reference_server(
    codes: impl IntoIterator<Item = ActivationCode>,
) -> io::Result<ReferenceServer> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;
    let registry = Arc::new(InMemoryActivationRegistry::with_codes(
        Arc::new(DefaultClock),
        codes,
    ));
    let state = HttpState::new(registry.clone(), Arc::new(FixtureAuthenticator));
    let server = reference_server(
        listener,
        state,
        ServerOptions {
            workers: 1,
            handle_signals: false,
        },
    )?;
    let handle = server.handle();
    actix_web::rt::spawn(server);

    let base_url = Url::parse(&format!("http://{addr}")).map_err(io::Error::other)?;
    Ok(ReferenceServer {
        base_url,
        handle,
        registry,
    })
}
