//! Renders flow outcomes for the terminal and drives each subcommand.
//!
//! Decisions stay in the domain; this module only turns typed outcomes into
//! lines of text and asks for confirmation when a claim is pending.

use std::io::{self, BufRead, Write};

use super::Command;
use crate::domain::ports::{ActivationGateway, Notifier, PendingCodeStore};
use crate::domain::{
    ActivationCode, ActivationFlow, ConfirmOutcome, FlowOutcome, Navigation, Session,
};

/// Flow over type-erased ports, as wired by the binary.
pub type DynActivationFlow =
    ActivationFlow<dyn ActivationGateway, dyn Notifier, dyn PendingCodeStore>;

/// Everything a subcommand needs.
pub struct CliContext {
    /// Activation flow (and, through it, the service).
    pub flow: DynActivationFlow,
    /// Signed-in session, if credentials were configured.
    pub session: Option<Session>,
}

/// Human-readable next step for a navigation target.
#[must_use]
pub fn describe_navigation(navigation: &Navigation) -> String {
    match navigation {
        Navigation::OwnProfile => "next: open your profile".to_owned(),
        Navigation::PublicProfile(owner) => format!("next: open the profile of {owner}"),
        Navigation::SignUp => "next: create an account, then run `activation resume`".to_owned(),
    }
}

/// Message for a flow outcome, if the outcome has anything to say.
///
/// A failed status check returns `None`: the service has already notified.
#[must_use]
pub fn render_outcome(outcome: &FlowOutcome) -> Option<String> {
    let message = match outcome {
        FlowOutcome::Unavailable { .. } => return None,
        FlowOutcome::AlreadyPresenting { code } => {
            format!("A confirmation for activation code {code} is already open")
        }
        FlowOutcome::OwnedBySelf { code } => format!("You already own activation code {code}"),
        FlowOutcome::OwnedByOther { code, owner } => {
            format!("Activation code {code} has been claimed by {owner}")
        }
        FlowOutcome::ClaimedWithoutOwner { code } => {
            format!("Activation code {code} has already been claimed")
        }
        FlowOutcome::AwaitingConfirmation { code } => format!("Claim activation code {code}?"),
        FlowOutcome::SignUpRequired { code } => format!(
            "Sign up to claim activation code {code}; it will be offered again after you sign in"
        ),
        FlowOutcome::Invalid { code, status } => {
            format!("Invalid activation code {code} (status: {status})")
        }
    };
    Some(message)
}

/// Message for the result of a confirmation.
#[must_use]
pub fn render_confirm(outcome: &ConfirmOutcome) -> String {
    match outcome {
        ConfirmOutcome::Claimed { code } => format!("Activation code {code} is now yours"),
        ConfirmOutcome::Rejected { code, .. } => format!("Activation code {code} was not claimed"),
        ConfirmOutcome::NothingToConfirm => "Nothing to confirm".to_owned(),
    }
}

const fn outcome_succeeded(outcome: &FlowOutcome) -> bool {
    !matches!(
        outcome,
        FlowOutcome::Unavailable { .. }
            | FlowOutcome::ClaimedWithoutOwner { .. }
            | FlowOutcome::Invalid { .. }
    )
}

fn require_session(session: Option<&Session>) -> io::Result<&Session> {
    session.ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "sign in first: set ACTIVATION_USER_ID and ACTIVATION_ACCESS_TOKEN",
        )
    })
}

fn confirmed<R: BufRead, W: Write>(
    code: &ActivationCode,
    input: &mut R,
    out: &mut W,
) -> io::Result<bool> {
    write!(out, "Claim activation code {code}? [y/N] ")?;
    out.flush()?;
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

async fn settle<R: BufRead, W: Write>(
    context: &CliContext,
    outcome: FlowOutcome,
    yes: bool,
    input: &mut R,
    out: &mut W,
) -> io::Result<bool> {
    if let (FlowOutcome::AwaitingConfirmation { code }, Some(session)) =
        (&outcome, context.session.as_ref())
    {
        if !yes && !confirmed(code, input, out)? {
            context.flow.dismiss();
            writeln!(out, "Claim of activation code {code} cancelled")?;
            return Ok(true);
        }
        let confirmation = context.flow.confirm(session).await;
        writeln!(out, "{}", render_confirm(&confirmation))?;
        if matches!(confirmation, ConfirmOutcome::Claimed { .. }) {
            writeln!(out, "{}", describe_navigation(&Navigation::OwnProfile))?;
            return Ok(true);
        }
        return Ok(false);
    }

    if let Some(message) = render_outcome(&outcome) {
        writeln!(out, "{message}")?;
    }
    if let Some(navigation) = outcome.navigation() {
        writeln!(out, "{}", describe_navigation(&navigation))?;
    }
    Ok(outcome_succeeded(&outcome))
}

/// Run one subcommand. Returns whether it succeeded.
///
/// # Errors
///
/// Returns an error when a signed-in command runs without credentials or
/// when the console cannot be read or written.
pub async fn run_command<R: BufRead, W: Write>(
    context: &CliContext,
    command: Command,
    mut input: R,
    mut out: W,
) -> io::Result<bool> {
    let service = context.flow.service();
    match command {
        Command::Check { code } => {
            let Some(status) = service.check_code(&code).await else {
                return Ok(false);
            };
            writeln!(out, "code: {code}")?;
            writeln!(out, "status: {}", status.status)?;
            if let Some(owner) = status.owner_id {
                writeln!(out, "owner: {owner}")?;
            }
            Ok(true)
        }
        Command::Claim { code } => {
            let session = require_session(context.session.as_ref())?;
            Ok(service.claim_code(session, &code).await)
        }
        Command::Open { code, yes } => {
            let outcome = context
                .flow
                .receive_code(code, context.session.as_ref())
                .await;
            settle(context, outcome, yes, &mut input, &mut out).await
        }
        Command::Resume { yes } => {
            let session = require_session(context.session.as_ref())?;
            match context.flow.resume_after_sign_in(session).await {
                Some(outcome) => settle(context, outcome, yes, &mut input, &mut out).await,
                None => {
                    writeln!(out, "No pending activation code")?;
                    Ok(true)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    //! Presenter coverage over scripted gateways.
    use std::io::Cursor;
    use std::sync::Arc;

    use rstest::rstest;

    use super::*;
    use crate::domain::ports::{ActivationGatewayError, MockActivationGateway};
    use crate::domain::{AccessToken, ActivationCodeService, ClaimReceipt, CodeStatus, UserId};
    use crate::outbound::pending::InMemoryPendingCodeStore;
    use crate::test_support::RecordingNotifier;

    fn code(raw: &str) -> ActivationCode {
        ActivationCode::new(raw).expect("fixture code")
    }

    fn session(raw: &str) -> Session {
        Session::new(
            UserId::new(raw).expect("fixture user"),
            AccessToken::new(raw).expect("fixture token"),
        )
    }

    fn context(gateway: MockActivationGateway, session: Option<Session>) -> CliContext {
        let gateway: Arc<dyn ActivationGateway> = Arc::new(gateway);
        let notifier: Arc<dyn Notifier> = Arc::new(RecordingNotifier::default());
        let pending: Arc<dyn PendingCodeStore> = Arc::new(InMemoryPendingCodeStore::default());
        let service = Arc::new(ActivationCodeService::new(gateway, notifier));
        CliContext {
            flow: ActivationFlow::new(service, pending),
            session,
        }
    }

    async fn run(context: &CliContext, command: Command, answer: &str) -> (bool, String) {
        let mut out = Vec::new();
        let succeeded = run_command(context, command, Cursor::new(answer.to_owned()), &mut out)
            .await
            .expect("command should run");
        (succeeded, String::from_utf8(out).expect("utf-8 output"))
    }

    #[rstest]
    fn renders_foreign_owner_navigation() {
        let outcome = FlowOutcome::OwnedByOther {
            code: code("ABC123"),
            owner: UserId::new("u2").expect("user"),
        };
        assert_eq!(
            render_outcome(&outcome).as_deref(),
            Some("Activation code ABC123 has been claimed by u2")
        );
        assert_eq!(
            outcome.navigation().as_ref().map(describe_navigation).as_deref(),
            Some("next: open the profile of u2")
        );
    }

    #[rstest]
    #[tokio::test]
    async fn check_prints_status_and_owner() {
        let mut gateway = MockActivationGateway::new();
        gateway
            .expect_check()
            .returning(|_| Ok(CodeStatus::claimed_by(UserId::new("u1").expect("user"))));
        let context = context(gateway, None);

        let (succeeded, output) = run(&context, Command::Check { code: code("ABC123") }, "").await;

        assert!(succeeded);
        assert_eq!(output, "code: ABC123\nstatus: claimed\nowner: u1\n");
    }

    #[rstest]
    #[tokio::test]
    async fn check_failure_reports_unsuccessful() {
        let mut gateway = MockActivationGateway::new();
        gateway
            .expect_check()
            .returning(|_| Err(ActivationGatewayError::timeout("deadline elapsed")));
        let context = context(gateway, None);

        let (succeeded, output) = run(&context, Command::Check { code: code("ABC123") }, "").await;

        assert!(!succeeded);
        assert!(output.is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn claim_requires_a_session() {
        let context = context(MockActivationGateway::new(), None);
        let error = run_command(
            &context,
            Command::Claim { code: code("ABC123") },
            Cursor::new(String::new()),
            Vec::new(),
        )
        .await
        .expect_err("claim without session must fail");
        assert_eq!(error.kind(), io::ErrorKind::InvalidInput);
    }

    #[rstest]
    #[case::accepted("y\n", true)]
    #[case::declined("n\n", false)]
    #[case::eof("", false)]
    #[tokio::test]
    async fn open_asks_before_claiming(#[case] answer: &str, #[case] expect_claim: bool) {
        let mut gateway = MockActivationGateway::new();
        gateway.expect_check().returning(|_| Ok(CodeStatus::active()));
        gateway
            .expect_claim()
            .times(usize::from(expect_claim))
            .returning(|_, _| {
                Ok(ClaimReceipt {
                    success: true,
                    message: "Activation code claimed".to_owned(),
                })
            });
        let context = context(gateway, Some(session("u1")));

        let (succeeded, output) = run(
            &context,
            Command::Open {
                code: code("ABC123"),
                yes: false,
            },
            answer,
        )
        .await;

        assert!(succeeded);
        assert!(output.starts_with("Claim activation code ABC123? [y/N] "));
        if expect_claim {
            assert!(output.contains("Activation code ABC123 is now yours"));
        } else {
            assert!(output.contains("cancelled"));
        }
        assert!(context.flow.presenting().is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn open_signed_out_defers_and_resume_offers_again() {
        let mut gateway = MockActivationGateway::new();
        gateway.expect_check().times(2).returning(|_| Ok(CodeStatus::active()));
        gateway.expect_claim().times(1).returning(|_, _| {
            Ok(ClaimReceipt {
                success: true,
                message: String::new(),
            })
        });
        let mut context = context(gateway, None);

        let (opened, open_output) = run(
            &context,
            Command::Open {
                code: code("XYZ999"),
                yes: false,
            },
            "",
        )
        .await;
        context.session = Some(session("u3"));
        let (resumed, resume_output) = run(&context, Command::Resume { yes: true }, "").await;

        assert!(opened && resumed);
        assert!(open_output.contains("next: create an account"));
        assert!(resume_output.contains("Activation code XYZ999 is now yours"));
    }

    #[rstest]
    #[tokio::test]
    async fn resume_without_pending_code_says_so() {
        let context = context(MockActivationGateway::new(), Some(session("u1")));

        let (succeeded, output) = run(&context, Command::Resume { yes: true }, "").await;

        assert!(succeeded);
        assert_eq!(output, "No pending activation code\n");
    }
}
