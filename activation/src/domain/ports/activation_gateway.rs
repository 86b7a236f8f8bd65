//! Driven port for the external activation backend.
//!
//! The domain owns the request and response shapes so the service and flow
//! stay independent of the HTTP adapter.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::{ActivationCode, ClaimReceipt, CodeStatus, Session};

define_port_error! {
    /// Errors surfaced while calling the activation backend.
    pub enum ActivationGatewayError {
        /// Network transport failed before a response was received.
        Transport { message: String } =>
            "activation backend transport failed: {message}",
        /// The request exceeded the transport timeout.
        Timeout { message: String } =>
            "activation backend timed out: {message}",
        /// The response body could not be decoded.
        Decode { message: String } =>
            "activation backend response decode failed: {message}",
        /// The backend answered with a non-success status.
        Rejected {
            /// HTTP status returned by the backend.
            status: u16,
            /// `detail` field of the structured error payload, if any.
            detail: Option<String>,
        } => "activation backend rejected request with status {status}",
    }
}

impl ActivationGatewayError {
    /// Server-provided explanation suitable for showing to the user.
    #[must_use]
    pub fn server_detail(&self) -> Option<&str> {
        match self {
            Self::Rejected {
                detail: Some(detail),
                ..
            } if !detail.trim().is_empty() => Some(detail.as_str()),
            _ => None,
        }
    }
}

/// Port for the status-check and claim endpoints.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ActivationGateway: Send + Sync {
    /// Fetch the current status of `code`. Must not mutate backend state.
    async fn check(&self, code: &ActivationCode) -> Result<CodeStatus, ActivationGatewayError>;

    /// Ask the backend to bind `code` to the session's user.
    async fn claim(
        &self,
        session: &Session,
        code: &ActivationCode,
    ) -> Result<ClaimReceipt, ActivationGatewayError>;
}
