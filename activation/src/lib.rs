//! Activation-code lifecycle: client service, caller-side flow, and a
//! reference backend speaking the same wire contract.
//!
//! The crate follows a hexagonal layout:
//! - [`domain`] holds value types, the claim/check service, and the flow
//!   state machine, talking to the outside world only through
//!   [`domain::ports`].
//! - [`outbound`] provides adapters for those ports (HTTP gateway, in-memory
//!   registry, pending-code stores, notifiers).
//! - [`inbound`] drives the domain: actix-web handlers for the reference
//!   backend and the command-line presenter.
//! - [`config`] loads settings through OrthoConfig.

pub mod config;
pub mod domain;
pub mod inbound;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
