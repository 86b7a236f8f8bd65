//! Activation-code check and claim use-cases.
//!
//! [`ActivationCodeService`] is the state container the presentation layer
//! binds to. It is constructed once per application session and shared by
//! `Arc`; tests build isolated instances. Every failure is absorbed here and
//! converted into a stored error string plus a notification, so callers only
//! ever see `Option`/`bool` results.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::domain::ports::{ActivationGateway, Notification, Notifier};
use crate::domain::{ActivationCode, CodeStatus, Session};

/// Error stored when a status check fails for any reason.
pub const CHECK_FAILED_MESSAGE: &str = "Failed to verify activation code";

/// Error stored when a claim fails without a server-provided detail.
pub const CLAIM_FAILED_MESSAGE: &str =
    "Failed to claim activation code. It may be invalid or already claimed.";

const CLAIM_SUCCEEDED_MESSAGE: &str = "Activation code claimed";

/// Observable state exposed to callers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivationState {
    /// At least one status check is in flight.
    pub is_loading: bool,
    /// At least one claim is in flight.
    pub is_claiming: bool,
    /// Last user-facing error, if the most recent call failed.
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy)]
enum Busy {
    Loading,
    Claiming,
}

impl Busy {
    fn set(self, state: &mut ActivationState, value: bool) {
        match self {
            Self::Loading => state.is_loading = value,
            Self::Claiming => state.is_claiming = value,
        }
    }
}

/// Counts one in-flight call for its lifetime, so the flag is lowered even
/// when the awaiting future is dropped mid-call.
///
/// The counter only changes inside `send_modify`, so it and the published
/// flag move together: overlapping calls keep the flag raised until the last
/// one finishes.
struct BusyGuard<'a> {
    state: &'a watch::Sender<ActivationState>,
    in_flight: &'a AtomicUsize,
    busy: Busy,
}

impl<'a> BusyGuard<'a> {
    fn raise(
        state: &'a watch::Sender<ActivationState>,
        in_flight: &'a AtomicUsize,
        busy: Busy,
    ) -> Self {
        state.send_modify(|current| {
            in_flight.fetch_add(1, Ordering::AcqRel);
            busy.set(current, true);
        });
        Self {
            state,
            in_flight,
            busy,
        }
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        let busy = self.busy;
        let in_flight = self.in_flight;
        self.state.send_modify(|current| {
            let remaining = in_flight.fetch_sub(1, Ordering::AcqRel).saturating_sub(1);
            busy.set(current, remaining > 0);
        });
    }
}

/// Client-side activation-code service.
pub struct ActivationCodeService<G: ?Sized, N: ?Sized> {
    gateway: Arc<G>,
    notifier: Arc<N>,
    state: watch::Sender<ActivationState>,
    checks_in_flight: AtomicUsize,
    claims_in_flight: AtomicUsize,
}

impl<G: ?Sized, N: ?Sized> ActivationCodeService<G, N> {
    /// Create a service talking to `gateway` and reporting through `notifier`.
    pub fn new(gateway: Arc<G>, notifier: Arc<N>) -> Self {
        let (state, _) = watch::channel(ActivationState::default());
        Self {
            gateway,
            notifier,
            state,
            checks_in_flight: AtomicUsize::new(0),
            claims_in_flight: AtomicUsize::new(0),
        }
    }

    /// Current busy flags and last error.
    #[must_use]
    pub fn snapshot(&self) -> ActivationState {
        self.state.borrow().clone()
    }

    /// Observe state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ActivationState> {
        self.state.subscribe()
    }

    /// Forget the last error.
    pub fn clear_error(&self) {
        self.state.send_if_modified(|current| current.error.take().is_some());
    }

    fn record_failure(&self, message: &str) {
        self.state
            .send_modify(|current| current.error = Some(message.to_owned()));
    }
}

impl<G, N> ActivationCodeService<G, N>
where
    G: ActivationGateway + ?Sized,
    N: Notifier + ?Sized,
{
    /// Query the backend for the status of `code`.
    ///
    /// Returns `None` on any failure; the reason is logged, stored as
    /// [`CHECK_FAILED_MESSAGE`], and notified.
    pub async fn check_code(&self, code: &ActivationCode) -> Option<CodeStatus> {
        let _busy = BusyGuard::raise(&self.state, &self.checks_in_flight, Busy::Loading);
        match self.gateway.check(code).await {
            Ok(status) => {
                debug!(
                    code = %code,
                    status = %status.status,
                    owner = ?status.owner_id,
                    "activation code checked"
                );
                self.clear_error();
                Some(status)
            }
            Err(error) => {
                warn!(code = %code, error = %error, "activation code check failed");
                self.record_failure(CHECK_FAILED_MESSAGE);
                self.notifier.notify(Notification::error(CHECK_FAILED_MESSAGE));
                None
            }
        }
    }

    /// Ask the backend to bind `code` to the session's user.
    ///
    /// A lost race with another session is an ordinary `false`.
    pub async fn claim_code(&self, session: &Session, code: &ActivationCode) -> bool {
        let _busy = BusyGuard::raise(&self.state, &self.claims_in_flight, Busy::Claiming);
        let failure = match self.gateway.claim(session, code).await {
            Ok(receipt) if receipt.success => {
                info!(code = %code, owner = %session.user_id(), "activation code claimed");
                self.clear_error();
                let message = non_blank(&receipt.message).unwrap_or(CLAIM_SUCCEEDED_MESSAGE);
                self.notifier.notify(Notification::success(message));
                return true;
            }
            Ok(receipt) => {
                warn!(code = %code, message = %receipt.message, "activation code claim refused");
                non_blank(&receipt.message)
                    .unwrap_or(CLAIM_FAILED_MESSAGE)
                    .to_owned()
            }
            Err(error) => {
                warn!(code = %code, error = %error, "activation code claim failed");
                error
                    .server_detail()
                    .unwrap_or(CLAIM_FAILED_MESSAGE)
                    .to_owned()
            }
        };
        self.record_failure(&failure);
        self.notifier.notify(Notification::error(failure));
        false
    }
}

fn non_blank(message: &str) -> Option<&str> {
    let trimmed = message.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}
