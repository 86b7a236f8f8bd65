//! `activation` command: check, claim, and redeem activation codes.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::io;
use std::process::ExitCode;
use std::sync::Arc;

use activation::config::ClientSettings;
use activation::domain::ports::{ActivationGateway, Notifier, PendingCodeStore};
use activation::domain::{ActivationCodeService, ActivationFlow};
use activation::inbound::cli::{Cli, CliContext, ConsoleNotifier, run_command};
use activation::outbound::activation::HttpActivationGateway;
use activation::outbound::pending::FilePendingCodeStore;
use clap::Parser;
use ortho_config::OrthoConfig;
use tokio::runtime::Builder;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

fn main() -> io::Result<ExitCode> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .compact()
        .with_writer(io::stderr)
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let cli = Cli::parse();
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| io::Error::other(format!("create Tokio runtime: {error}")))?;
    let succeeded = runtime.block_on(async_main(cli))?;
    Ok(if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

async fn async_main(cli: Cli) -> io::Result<bool> {
    let settings = ClientSettings::load_from_iter([OsString::from("activation")])
        .map_err(|error| io::Error::other(format!("load settings: {error}")))?;
    let context = build_context(&settings)?;
    let stdin = io::stdin();
    run_command(&context, cli.command, stdin.lock(), io::stdout()).await
}

fn build_context(settings: &ClientSettings) -> io::Result<CliContext> {
    let base_url = settings.api_base_url().map_err(io::Error::other)?;
    let timeout = settings.request_timeout().map_err(io::Error::other)?;
    let session = settings.session().map_err(io::Error::other)?;
    let state_dir = settings.state_dir();

    let gateway: Arc<dyn ActivationGateway> = Arc::new(
        HttpActivationGateway::new(base_url, timeout)
            .map_err(|error| io::Error::other(format!("create HTTP client: {error}")))?,
    );
    let notifier: Arc<dyn Notifier> = Arc::new(ConsoleNotifier::new(io::stdout()));
    let pending: Arc<dyn PendingCodeStore> =
        Arc::new(FilePendingCodeStore::open(&state_dir).map_err(|error| {
            io::Error::other(format!(
                "open state directory '{}': {error}",
                state_dir.display()
            ))
        })?);

    let service = Arc::new(ActivationCodeService::new(gateway, notifier));
    Ok(CliContext {
        flow: ActivationFlow::new(service, pending),
        session,
    })
}
