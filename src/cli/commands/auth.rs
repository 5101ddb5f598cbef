//! Auth, refresh, logout and tokens command implementations

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use dialoguer::Input;
use log::{info, warn};
use serde_json::{Value, json};

use super::{CommandContext, print_value};
use crate::auth::{Authenticator, CallbackListener, KeyringTokenStore, TokenStore, extract_code, listener_target};
use crate::cli::args::OutputArgs;
use crate::config::{DEFAULT_REDIRECT_URI, OAuthConfig};
use crate::errors::BasecampError;
use crate::models::{TokenRecord, mask_token};

pub async fn execute_auth_command(
    ctx: &CommandContext,
    account_flag: Option<u64>,
    manual: bool,
    no_browser: bool,
    timeout_secs: u64,
) -> Result<()> {
    let oauth = ctx.config.oauth_config()?;
    let account = ctx.account_id(account_flag)?;
    if let Some(id) = account_flag {
        ctx.config
            .set_account_id(id)
            .context("Failed to save default account")?;
        println!("📌 Account ID {} saved as default", id);
    }

    let authenticator = Authenticator::new(oauth.clone());
    let account_hint = account.map(|id| id.to_string());
    let url = authenticator.build_authorization_url(account_hint.as_deref())?;

    if oauth.is_oob() {
        warn_oob();
    }

    // The listener has to be up before the browser can redirect to it
    let listener = if manual || oauth.is_oob() {
        None
    } else {
        start_listener(&oauth)
    };

    println!("🌐 Opening browser for authentication...");
    println!("   If the browser doesn't open, visit:");
    println!("   {}", url);
    if !no_browser {
        if let Err(e) = open::that(url.as_str()) {
            warn!("Could not open a browser: {}", e);
        }
    }

    let code = match listener {
        Some(listener) => {
            println!(
                "⏳ Waiting for the redirect to {} (up to {}s)...",
                oauth.redirect_uri, timeout_secs
            );
            listener
                .wait_for_code(Duration::from_secs(timeout_secs))
                .await?
        }
        None => prompt_for_code(&oauth)?,
    };

    let record = authenticator.exchange_code_for_token(&code).await?;
    let store = KeyringTokenStore::for_account(account);
    store.save(&record).context("Failed to store tokens")?;

    println!("✅ Authentication successful! Tokens stored securely.");
    if let Some(expires_at) = record.expires_at {
        println!("   Access token expires at {}", expires_at.to_rfc3339());
    }
    Ok(())
}

/// Bind the redirect listener, or `None` to fall back to pasting the code
fn start_listener(oauth: &OAuthConfig) -> Option<CallbackListener> {
    let (port, path) = match listener_target(&oauth.redirect_uri) {
        Some(target) => target,
        None => {
            info!(
                "Redirect URI {} is not a local HTTP address; using manual entry",
                oauth.redirect_uri
            );
            return None;
        }
    };

    match CallbackListener::bind(port, &path) {
        Ok(listener) => Some(listener),
        Err(e) => {
            eprintln!("⚠️  {}", e);
            eprintln!("   Falling back to manual code entry.");
            None
        }
    }
}

fn prompt_for_code(oauth: &OAuthConfig) -> Result<String> {
    println!();
    println!("After authorizing, you'll be redirected to: {}", oauth.redirect_uri);
    println!("Copy the 'code' parameter (or the whole URL) from the address bar.");

    let input: String = Input::new()
        .with_prompt("Authorization code")
        .interact_text()
        .context("Failed to read authorization code")?;

    extract_code(&input).ok_or_else(|| anyhow!("No authorization code entered"))
}

fn warn_oob() {
    eprintln!("⚠️  Warning: the OOB redirect URI may not work in modern browsers.");
    eprintln!("   If the browser cannot follow the redirect, look for 'code=' in the");
    eprintln!("   address bar or console, or switch to a local redirect:");
    eprintln!("   1. Register '{}' in Basecamp Launchpad", DEFAULT_REDIRECT_URI);
    eprintln!(
        "   2. Run: basecamp configure --redirect-uri {}",
        DEFAULT_REDIRECT_URI
    );
}

pub async fn execute_refresh_command(ctx: &CommandContext, account_flag: Option<u64>) -> Result<()> {
    let oauth = ctx.config.oauth_config()?;
    let account = ctx.account_id(account_flag)?;
    let store = ctx.token_store(account)?;

    let current = store.load()?.ok_or(BasecampError::NotAuthenticated)?;
    let refresh_token = current
        .refresh_token
        .as_deref()
        .ok_or_else(|| anyhow!("No refresh token stored. Run `basecamp auth` to sign in again."))?;

    let record = Authenticator::new(oauth).refresh_token(refresh_token).await?;
    store.save(&record).context("Failed to store tokens")?;

    println!("✅ Access token refreshed");
    if let Some(expires_at) = record.expires_at {
        println!("   Expires at {}", expires_at.to_rfc3339());
    }
    Ok(())
}

pub fn execute_logout_command(ctx: &CommandContext, account_flag: Option<u64>) -> Result<()> {
    let account = account_flag.or(ctx.config.load_or_default().account_id);
    ctx.clear_tokens(account).context("Failed to clear tokens")?;
    println!(
        "👋 Logged out successfully. Tokens cleared for account '{}'.",
        KeyringTokenStore::for_account(account).account()
    );
    Ok(())
}

pub fn execute_tokens_command(ctx: &CommandContext, output: &OutputArgs, show_full: bool) -> Result<()> {
    let account = ctx.account_id(output.account_id)?;
    let store = ctx.token_store(account)?;
    let record = store
        .load()?
        .ok_or_else(|| anyhow!("No tokens found. Run 'basecamp auth' to authenticate."))?;

    print_value(&token_summary(store.account(), &record, show_full), output.format)
}

/// What `basecamp tokens` shows for a stored record
pub fn token_summary(account: &str, record: &TokenRecord, show_full: bool) -> Value {
    let reveal = |token: &str| {
        if show_full {
            token.to_string()
        } else {
            mask_token(token)
        }
    };

    json!({
        "account_id": account,
        "has_access_token": !record.access_token.is_empty(),
        "has_refresh_token": record.refresh_token.is_some(),
        "is_expired": record.is_expired(),
        "expires_at": record.expires_at.map(|at| at.to_rfc3339()),
        "access_token": reveal(&record.access_token),
        "refresh_token": record.refresh_token.as_deref().map(reveal),
    })
}
