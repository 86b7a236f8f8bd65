//! Reference-server harness shared by integration suites.
//!
//! Owns a single-threaded Tokio runtime plus a `LocalSet` because actix spawns
//! its server task with `spawn_local`. Dropping the harness stops the server
//! even if a test panics.

use std::future::Future;
use std::net::TcpListener;
use std::time::Duration;

use activation::domain::ActivationCode;
use activation::outbound::activation::HttpActivationGateway;
use activation::test_support::{ReferenceServer, spawn_reference_server};
use tokio::runtime::Runtime;
use tokio::task::LocalSet;
use url::Url;

pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

pub(crate) struct Harness {
    runtime: Runtime,
    local: LocalSet,
    pub(crate) server: ReferenceServer,
}

impl Harness {
    pub(crate) fn start(codes: &[&str]) -> Self {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("tokio runtime");
        let local = LocalSet::new();
        let codes: Vec<ActivationCode> = codes.iter().map(|raw| code(raw)).collect();
        let server = local.block_on(&runtime, async move {
            spawn_reference_server(codes).expect("reference server should start")
        });
        Self {
            runtime,
            local,
            server,
        }
    }

    pub(crate) fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.local.block_on(&self.runtime, future)
    }

    pub(crate) fn gateway(&self) -> HttpActivationGateway {
        HttpActivationGateway::new(self.server.base_url.clone(), REQUEST_TIMEOUT)
            .expect("HTTP client should build")
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        let handle = self.server.handle.clone();
        self.local.block_on(&self.runtime, async move {
            handle.stop(true).await;
        });
    }
}

pub(crate) fn code(raw: &str) -> ActivationCode {
    ActivationCode::new(raw).expect("fixture code")
}

/// Base URL of a port nothing listens on.
pub(crate) fn unreachable_base_url() -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local address");
    drop(listener);
    Url::parse(&format!("http://{addr}")).expect("base URL")
}
