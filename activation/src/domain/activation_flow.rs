//! Caller-side activation flow.
//!
//! A code arrives from a link or query parameter; the flow checks it and
//! decides what the presentation layer should do next:
//!
//! ```text
//! idle -> checking -> claimed by viewer      => own profile
//!                  -> claimed by someone     => owner's public profile
//!                  -> claimed, owner unknown => "already claimed" error
//!                  -> active, signed in      => confirmation -> claim
//!                  -> active, anonymous      => stash code -> sign up
//!                  -> anything else          => "invalid code" error
//! ```
//!
//! [`classify`] is the pure decision; [`ActivationFlow`] adds the
//! confirmation guard and the deferred-code store. Neither renders
//! anything: outcomes are typed and the presenter interprets them.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use crate::domain::ports::{ActivationGateway, Notifier, PendingCodeStore};
use crate::domain::{
    ActivationCode, ActivationCodeService, ActivationStatus, CodeStatus, Session, UserId,
};

/// What a status record means for the current viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeDecision {
    /// Claimed by the viewer.
    ClaimedBySelf,
    /// Claimed by another user.
    ClaimedByOther {
        /// The owning user.
        owner: UserId,
    },
    /// Claimed, but the backend recorded no owner.
    ClaimedWithoutOwner,
    /// Active and redeemable.
    Claimable,
    /// Any status other than `active` or `claimed`.
    Invalid {
        /// Raw status reported by the backend.
        status: String,
    },
}

/// Classify a status record for `viewer` (`None` when signed out).
///
/// # Examples
/// ```
/// use activation::domain::{CodeDecision, CodeStatus, UserId, classify};
///
/// let owner = UserId::new("u1").expect("user id");
/// let status = CodeStatus::claimed_by(owner.clone());
/// assert_eq!(classify(&status, Some(&owner)), CodeDecision::ClaimedBySelf);
/// assert_eq!(
///     classify(&status, None),
///     CodeDecision::ClaimedByOther { owner }
/// );
/// ```
#[must_use]
pub fn classify(status: &CodeStatus, viewer: Option<&UserId>) -> CodeDecision {
    match (&status.status, status.owner_id.as_ref()) {
        (ActivationStatus::Claimed, Some(owner)) if Some(owner) == viewer => {
            CodeDecision::ClaimedBySelf
        }
        (ActivationStatus::Claimed, Some(owner)) => CodeDecision::ClaimedByOther {
            owner: owner.clone(),
        },
        (ActivationStatus::Claimed, None) => CodeDecision::ClaimedWithoutOwner,
        (ActivationStatus::Active, _) => CodeDecision::Claimable,
        (ActivationStatus::Unrecognised(raw), _) => CodeDecision::Invalid {
            status: raw.clone(),
        },
    }
}

/// Where the presentation layer should take the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// The viewer's own profile.
    OwnProfile,
    /// Another user's public profile.
    PublicProfile(UserId),
    /// Account creation.
    SignUp,
}

/// Result of feeding a code into the flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowOutcome {
    /// A confirmation for this code is already open; nothing was checked.
    AlreadyPresenting {
        /// The code being confirmed.
        code: ActivationCode,
    },
    /// The status check failed; treated as invalid with no further action.
    Unavailable {
        /// The code that could not be checked.
        code: ActivationCode,
    },
    /// The viewer already owns the code.
    OwnedBySelf {
        /// The owned code.
        code: ActivationCode,
    },
    /// Another user owns the code.
    OwnedByOther {
        /// The claimed code.
        code: ActivationCode,
        /// Its owner.
        owner: UserId,
    },
    /// The code is claimed but has no recorded owner.
    ClaimedWithoutOwner {
        /// The inconsistent code.
        code: ActivationCode,
    },
    /// The code is claimable and a confirmation is now open.
    AwaitingConfirmation {
        /// The code to confirm.
        code: ActivationCode,
    },
    /// The visitor must sign up first; the code was stashed.
    SignUpRequired {
        /// The deferred code.
        code: ActivationCode,
    },
    /// The backend reported an unknown status.
    Invalid {
        /// The rejected code.
        code: ActivationCode,
        /// Raw status reported by the backend.
        status: String,
    },
}

impl FlowOutcome {
    /// The code this outcome concerns.
    #[must_use]
    pub fn code(&self) -> &ActivationCode {
        match self {
            Self::AlreadyPresenting { code }
            | Self::Unavailable { code }
            | Self::OwnedBySelf { code }
            | Self::OwnedByOther { code, .. }
            | Self::ClaimedWithoutOwner { code }
            | Self::AwaitingConfirmation { code }
            | Self::SignUpRequired { code }
            | Self::Invalid { code, .. } => code,
        }
    }

    /// Navigation implied by the outcome, if any.
    #[must_use]
    pub fn navigation(&self) -> Option<Navigation> {
        match self {
            Self::OwnedBySelf { .. } => Some(Navigation::OwnProfile),
            Self::OwnedByOther { owner, .. } => Some(Navigation::PublicProfile(owner.clone())),
            Self::SignUpRequired { .. } => Some(Navigation::SignUp),
            Self::AlreadyPresenting { .. }
            | Self::Unavailable { .. }
            | Self::ClaimedWithoutOwner { .. }
            | Self::AwaitingConfirmation { .. }
            | Self::Invalid { .. } => None,
        }
    }
}

/// Result of confirming an open claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmOutcome {
    /// The claim succeeded.
    Claimed {
        /// The claimed code.
        code: ActivationCode,
    },
    /// The backend refused or the call failed.
    Rejected {
        /// The code that was not claimed.
        code: ActivationCode,
        /// User-facing reason recorded by the service.
        reason: Option<String>,
    },
    /// No confirmation was open.
    NothingToConfirm,
}

/// Orchestrates check, confirmation, claim, and sign-up deferral.
pub struct ActivationFlow<G: ?Sized, N: ?Sized, S: ?Sized> {
    service: Arc<ActivationCodeService<G, N>>,
    pending: Arc<S>,
    presenting: Mutex<Option<ActivationCode>>,
}

impl<G: ?Sized, N: ?Sized, S: ?Sized> ActivationFlow<G, N, S> {
    /// Build a flow over a shared service and a pending-code store.
    pub fn new(service: Arc<ActivationCodeService<G, N>>, pending: Arc<S>) -> Self {
        Self {
            service,
            pending,
            presenting: Mutex::new(None),
        }
    }

    /// The underlying service, for binding busy flags and errors.
    #[must_use]
    pub fn service(&self) -> &ActivationCodeService<G, N> {
        &self.service
    }

    /// Code whose confirmation is currently open.
    #[must_use]
    pub fn presenting(&self) -> Option<ActivationCode> {
        self.lock_presenting().clone()
    }

    /// Close an open confirmation without claiming.
    pub fn dismiss(&self) -> Option<ActivationCode> {
        self.lock_presenting().take()
    }

    fn lock_presenting(&self) -> MutexGuard<'_, Option<ActivationCode>> {
        self.presenting
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn close_if_presenting(&self, code: &ActivationCode) {
        let mut presenting = self.lock_presenting();
        if presenting.as_ref() == Some(code) {
            *presenting = None;
        }
    }
}

impl<G, N, S> ActivationFlow<G, N, S>
where
    G: ActivationGateway + ?Sized,
    N: Notifier + ?Sized,
    S: PendingCodeStore + ?Sized,
{
    /// Feed a code from a link or query parameter into the flow.
    pub async fn receive_code(
        &self,
        code: ActivationCode,
        session: Option<&Session>,
    ) -> FlowOutcome {
        if self.presenting().as_ref() == Some(&code) {
            debug!(code = %code, "confirmation already open; skipping check");
            return FlowOutcome::AlreadyPresenting { code };
        }

        let Some(status) = self.service.check_code(&code).await else {
            return FlowOutcome::Unavailable { code };
        };

        match classify(&status, session.map(Session::user_id)) {
            CodeDecision::ClaimedBySelf => FlowOutcome::OwnedBySelf { code },
            CodeDecision::ClaimedByOther { owner } => FlowOutcome::OwnedByOther { code, owner },
            CodeDecision::ClaimedWithoutOwner => {
                warn!(code = %code, "claimed activation code has no recorded owner");
                FlowOutcome::ClaimedWithoutOwner { code }
            }
            CodeDecision::Claimable if session.is_some() => {
                *self.lock_presenting() = Some(code.clone());
                FlowOutcome::AwaitingConfirmation { code }
            }
            CodeDecision::Claimable => {
                if let Err(error) = self.pending.stash(&code) {
                    warn!(code = %code, error = %error, "failed to stash pending activation code");
                }
                FlowOutcome::SignUpRequired { code }
            }
            CodeDecision::Invalid { status } => FlowOutcome::Invalid { code, status },
        }
    }

    /// Claim the code whose confirmation is open, then close it.
    pub async fn confirm(&self, session: &Session) -> ConfirmOutcome {
        let Some(code) = self.presenting() else {
            return ConfirmOutcome::NothingToConfirm;
        };
        let claimed = self.service.claim_code(session, &code).await;
        self.close_if_presenting(&code);
        if claimed {
            ConfirmOutcome::Claimed { code }
        } else {
            ConfirmOutcome::Rejected {
                code,
                reason: self.service.snapshot().error,
            }
        }
    }

    /// Re-present a code deferred while the visitor signed up.
    ///
    /// The stashed code is removed and re-checked with the new session, since
    /// it may have been claimed in the meantime.
    pub async fn resume_after_sign_in(&self, session: &Session) -> Option<FlowOutcome> {
        let code = match self.pending.take() {
            Ok(code) => code?,
            Err(error) => {
                warn!(error = %error, "failed to read pending activation code");
                return None;
            }
        };
        Some(self.receive_code(code, Some(session)).await)
    }
}
