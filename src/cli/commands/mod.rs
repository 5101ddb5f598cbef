//! CLI command implementations

pub mod auth;
pub mod configure;
pub mod people;
pub mod projects;
pub mod recordings;
pub mod search;
pub mod todos;

use std::io;
use std::sync::Arc;

use anyhow::{Context, Result};
use log::debug;
use serde_json::Value;

use crate::api::{ApiClient, PageRequest};
use crate::auth::{KeyringTokenStore, TokenStore, clear_slots, resolve_slot, usable_token};
use crate::cli::args::{Commands, ListArgs};
use crate::config::ConfigStore;
use crate::errors::BasecampError;
use crate::output::{OutputFormat, Pager, format_output};

/// State shared by every command of one invocation
pub struct CommandContext {
    pub config: ConfigStore,
}

impl CommandContext {
    pub fn new(config: ConfigStore) -> Self {
        Self { config }
    }

    /// `--account-id`, else the configured default
    pub fn account_id(&self, flag: Option<u64>) -> Result<Option<u64>> {
        match flag {
            Some(id) => Ok(Some(id)),
            None => Ok(self.config.account_id()?),
        }
    }

    pub fn require_account_id(&self, flag: Option<u64>) -> Result<u64> {
        Ok(self
            .account_id(flag)?
            .ok_or(BasecampError::AccountRequired)?)
    }

    /// Keychain slot commands read `account`'s token from
    pub fn token_store(&self, account: Option<u64>) -> Result<KeyringTokenStore> {
        Ok(resolve_slot(account, KeyringTokenStore::for_account)?)
    }

    /// Remove every keychain token `token_store` could hand out for `account`
    pub fn clear_tokens(&self, account: Option<u64>) -> Result<()> {
        Ok(clear_slots(account, KeyringTokenStore::for_account)?)
    }

    /// API client for an account, after checking configuration and token
    /// freshness
    pub fn client(&self, account_flag: Option<u64>) -> Result<(ApiClient, u64)> {
        self.config.oauth_config()?;
        let account = self.require_account_id(account_flag)?;
        let store = self.token_store(Some(account))?;
        usable_token(&store)?;
        let client = ApiClient::new(Arc::new(store) as Arc<dyn TokenStore>)?;
        Ok((client, account))
    }
}

/// Print a single result
pub fn print_value(value: &Value, format: OutputFormat) -> Result<()> {
    println!("{}", format_output(value, format)?);
    Ok(())
}

/// Page through a listing on the terminal
pub async fn show_list(client: &ApiClient, request: PageRequest, list: &ListArgs) -> Result<()> {
    debug!("Listing {}", request.path);
    let stdin = io::stdin();
    let mut pager = Pager::new(
        stdin.lock(),
        io::stdout().lock(),
        io::stderr(),
        list.output.format,
    );
    pager
        .run(client.pages(request, None), list.all_pages)
        .await
        .context("Failed to list results")?;
    Ok(())
}

/// Execute a CLI command
pub async fn execute_command(command: Commands, ctx: &CommandContext) -> Result<()> {
    match command {
        Commands::Configure {
            client_id,
            client_secret,
            redirect_uri,
        } => configure::execute_configure_command(ctx, client_id, client_secret, redirect_uri),
        Commands::ConfigPath => configure::execute_config_path_command(ctx),
        Commands::Auth {
            account_id,
            manual,
            no_browser,
            timeout,
        } => auth::execute_auth_command(ctx, account_id, manual, no_browser, timeout).await,
        Commands::Refresh { account_id } => auth::execute_refresh_command(ctx, account_id).await,
        Commands::Logout { account_id } => auth::execute_logout_command(ctx, account_id),
        Commands::Tokens { output, show_full } => {
            auth::execute_tokens_command(ctx, &output, show_full)
        }
        Commands::Projects { command } => projects::execute_projects_command(ctx, command).await,
        Commands::Todos { command } => todos::execute_todos_command(ctx, command).await,
        Commands::Recordings { command } => {
            recordings::execute_recordings_command(ctx, command).await
        }
        Commands::Search(args) => search::execute_search_command(ctx, &args).await,
        Commands::SearchMetadata { output } => {
            search::execute_search_metadata_command(ctx, &output).await
        }
        Commands::People { command } => people::execute_people_command(ctx, command).await,
    }
}
