//! Command Line Interface module
//!
//! Argument parsing lives in [`args`]; each subcommand is implemented in
//! [`commands`].

pub mod args;
pub mod commands;

pub use args::*;

use anyhow::Result;

use crate::config::ConfigStore;
use crate::errors::BasecampError;
use crate::utils::logging::init_cli_logging;
use commands::CommandContext;

/// Main CLI application runner
pub async fn run() -> Result<()> {
    let cli = Cli::parse_args();
    init_cli_logging(cli.verbose, cli.quiet)?;

    let config = ConfigStore::from_env()?;
    log::debug!("Using configuration at {}", config.file().display());

    let ctx = CommandContext::new(config);
    commands::execute_command(cli.command, &ctx).await
}

const REAUTH_HINT: &str = "Run `basecamp auth` to sign in again.";

/// Sign-in advice for failures caused by missing or rejected credentials,
/// unless the error message already gives it
pub fn reauth_hint(err: &anyhow::Error) -> Option<&'static str> {
    let needs_reauth = err
        .chain()
        .filter_map(|cause| cause.downcast_ref::<BasecampError>())
        .any(BasecampError::requires_reauth);
    (needs_reauth && !format!("{:#}", err).contains("basecamp auth")).then_some(REAUTH_HINT)
}
