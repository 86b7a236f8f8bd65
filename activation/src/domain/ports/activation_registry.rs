//! Driven port for the backend's authoritative code storage.
//!
//! Used by the reference backend only; the client never writes codes.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::{ActivationCode, ActivationCodeRecord, UserId};

define_port_error! {
    /// Errors surfaced by registry implementations.
    pub enum ActivationRegistryError {
        /// The code was never issued.
        NotFound { code: String } =>
            "activation code {code} not found",
        /// The code is already bound to an owner.
        AlreadyClaimed { code: String } =>
            "activation code {code} has already been claimed",
        /// Storage failed.
        Storage { message: String } =>
            "activation registry storage failed: {message}",
    }
}

/// Port for reading and atomically claiming codes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ActivationRegistry: Send + Sync {
    /// Fetch the record for `code`, if it was issued.
    async fn find(
        &self,
        code: &ActivationCode,
    ) -> Result<Option<ActivationCodeRecord>, ActivationRegistryError>;

    /// Transition `code` from active to claimed by `owner`.
    ///
    /// Implementations must make the check-and-set atomic: of any number of
    /// concurrent claims on one active code, exactly one succeeds and the
    /// rest fail with [`ActivationRegistryError::AlreadyClaimed`].
    async fn claim(
        &self,
        code: &ActivationCode,
        owner: &UserId,
    ) -> Result<ActivationCodeRecord, ActivationRegistryError>;
}
