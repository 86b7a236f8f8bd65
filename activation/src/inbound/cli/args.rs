//! `activation` command arguments.

use clap::{Parser, Subcommand};

use crate::domain::ActivationCode;

/// `activation` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "activation",
    about = "Check, claim, and redeem activation codes against an activation backend",
    version
)]
pub struct Cli {
    /// Operation to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported operations.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Print the status of a code without changing it.
    Check {
        /// Raw code or activation link.
        #[arg(value_name = "code-or-link", value_parser = parse_code)]
        code: ActivationCode,
    },
    /// Claim a code for the signed-in user without confirmation.
    Claim {
        /// Raw code or activation link.
        #[arg(value_name = "code-or-link", value_parser = parse_code)]
        code: ActivationCode,
    },
    /// Follow an activation link the way the app does.
    Open {
        /// Raw code or activation link.
        #[arg(value_name = "code-or-link", value_parser = parse_code)]
        code: ActivationCode,
        /// Claim without asking for confirmation.
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// Offer the code stashed before sign-up again.
    Resume {
        /// Claim without asking for confirmation.
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

fn parse_code(raw: &str) -> Result<ActivationCode, String> {
    ActivationCode::parse_input(raw).map_err(|error| error.to_string())
}
