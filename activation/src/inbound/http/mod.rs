//! HTTP inbound adapter exposing the activation endpoints.
//!
//! ```text
//! GET  /activation/check/{code}
//! POST /activation/claim {"code":"ABC123"}   (Authorization: Bearer <token>)
//! ```

use std::io;
use std::net::TcpListener;

use actix_web::dev::Server;
use actix_web::{App, HttpServer, web};

use crate::domain::Error;

pub mod activation;
pub mod auth;
pub mod error;
pub mod state;

pub use error::ApiResult;
pub use state::HttpState;

/// Register the activation routes and JSON error handling on an app.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use activation::inbound::http::configure;
///
/// let app = App::new().configure(configure);
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        Error::invalid_request(format!("invalid request body: {err}")).into()
    }))
    .service(activation::check_code)
    .service(activation::claim_code);
}

/// Runtime knobs for [`reference_server`].
#[derive(Debug, Clone, Copy)]
pub struct ServerOptions {
    /// Worker threads; at least one is always started.
    pub workers: usize,
    /// Install Ctrl-C/SIGTERM handlers for graceful shutdown.
    pub handle_signals: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            workers: 1,
            handle_signals: true,
        }
    }
}

/// Build the reference backend server on an already-bound listener.
///
/// The server is not started: await it, or spawn it on an actix or Tokio
/// `LocalSet`, to serve requests.
///
/// # Errors
///
/// Returns an error when the listener cannot be handed to actix.
pub fn reference_server(
    listener: TcpListener,
    state: HttpState,
    options: ServerOptions,
) -> io::Result<Server> {
    let data = web::Data::new(state);
    let mut server =
        HttpServer::new(move || App::new().app_data(data.clone()).configure(configure))
            .workers(options.workers.max(1));
    if !options.handle_signals {
        server = server.disable_signals();
    }
    Ok(server.listen(listener)?.run())
}
