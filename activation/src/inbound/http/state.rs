//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they only depend
//! on domain ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{ActivationRegistry, Authenticator};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Authoritative code storage.
    pub registry: Arc<dyn ActivationRegistry>,
    /// Bearer-token verification.
    pub authenticator: Arc<dyn Authenticator>,
}

impl HttpState {
    /// Bundle the ports used by the activation handlers.
    pub fn new(
        registry: Arc<dyn ActivationRegistry>,
        authenticator: Arc<dyn Authenticator>,
    ) -> Self {
        Self {
            registry,
            authenticator,
        }
    }
}
