//! Driven port for the code deferred while a visitor signs up.
//!
//! Models session-scoped storage: at most one pending code, replaced on each
//! stash and removed when taken.

use super::define_port_error;
use crate::domain::ActivationCode;

define_port_error! {
    /// Errors raised by pending-code storage.
    pub enum PendingCodeStoreError {
        /// Backing storage could not be read or written.
        Storage { message: String } =>
            "pending code storage failed: {message}",
        /// Stored content no longer parses as a code.
        Corrupt { message: String } =>
            "pending code storage is corrupt: {message}",
    }
}

/// Port for stashing one activation code across authentication.
pub trait PendingCodeStore: Send + Sync {
    /// Remember `code`, replacing any previously stashed value.
    fn stash(&self, code: &ActivationCode) -> Result<(), PendingCodeStoreError>;

    /// Read the stashed code without removing it.
    fn peek(&self) -> Result<Option<ActivationCode>, PendingCodeStoreError>;

    /// Remove and return the stashed code.
    fn take(&self) -> Result<Option<ActivationCode>, PendingCodeStoreError>;
}
