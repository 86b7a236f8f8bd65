//! Command-line inbound adapter for the activation client.
//!
//! ```text
//! activation check ABC123
//! activation open "https://app.example/activate?code=ABC123" --yes
//! activation resume
//! ```

mod args;
mod console;
mod presenter;

pub use args::{Cli, Command};
pub use console::ConsoleNotifier;
pub use presenter::{
    CliContext, DynActivationFlow, describe_navigation, render_confirm, render_outcome, run_command,
};
