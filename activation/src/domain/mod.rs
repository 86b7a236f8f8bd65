//! Domain primitives, services, and ports.
//!
//! Purpose: define the strongly typed activation-code model and the use-cases
//! built on it. Types are immutable once constructed; constructors validate
//! their invariants and serde contracts are documented on each type.
//!
//! Public surface:
//! - [`ActivationCode`], [`ActivationStatus`], [`CodeStatus`]: client view
//!   of a code.
//! - [`ActivationCodeRecord`], [`CodeState`]: backend view of a code.
//! - [`UserId`], [`AccessToken`], [`Session`]: caller identity.
//! - [`ActivationCodeService`], [`ActivationState`]: check/claim use-cases
//!   with observable busy flags.
//! - [`ActivationFlow`], [`classify`], [`FlowOutcome`]: caller-side
//!   orchestration.
//! - [`Error`], [`ErrorCode`]: transport-agnostic failures for inbound
//!   adapters.

pub mod activation_code;
pub mod activation_flow;
pub mod activation_service;
pub mod error;
pub mod ports;
pub mod user;

pub use self::activation_code::{
    ActivationCode, ActivationCodeRecord, ActivationCodeValidationError, ActivationStatus,
    ClaimReceipt, CodeState, CodeStatus,
};
pub use self::activation_flow::{
    ActivationFlow, CodeDecision, ConfirmOutcome, FlowOutcome, Navigation, classify,
};
pub use self::activation_service::{
    ActivationCodeService, ActivationState, CHECK_FAILED_MESSAGE, CLAIM_FAILED_MESSAGE,
};
pub use self::error::{Error, ErrorCode};
pub use self::user::{AccessToken, Session, UserId, UserValidationError};
