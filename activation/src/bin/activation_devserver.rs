//! Reference activation backend for local development and tests.
//!
//! Codes come from `ACTIVATION_DEV_CODES`; bearer tokens are user ids.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::io;
use std::net::TcpListener;
use std::sync::Arc;

use activation::config::DevServerSettings;
use activation::domain::ports::FixtureAuthenticator;
use activation::inbound::http::{HttpState, ServerOptions, reference_server};
use activation::outbound::registry::InMemoryActivationRegistry;
use mockable::DefaultClock;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = DevServerSettings::load_from_iter([OsString::from("activation-devserver")])
        .map_err(|error| io::Error::other(format!("load settings: {error}")))?;
    let bind_addr = settings.bind_addr().map_err(io::Error::other)?;
    let codes = settings.codes().map_err(io::Error::other)?;

    let registry = Arc::new(InMemoryActivationRegistry::with_codes(
        Arc::new(DefaultClock),
        codes,
    ));
    info!(address = %bind_addr, codes = registry.len(), "starting activation reference backend");
    let state = HttpState::new(registry, Arc::new(FixtureAuthenticator));

    let listener = TcpListener::bind(bind_addr)?;
    reference_server(listener, state, ServerOptions::default())?.await
}
