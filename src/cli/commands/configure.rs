//! Configure and config-path command implementations

use anyhow::{Context, Result};
use dialoguer::{Confirm, Input, Password};

use super::CommandContext;
use crate::config::{
    CLIENT_ID_ENV, CLIENT_SECRET_ENV, DEFAULT_REDIRECT_URI, OAuthConfig, OOB_REDIRECT_URI,
};

pub fn execute_configure_command(
    ctx: &CommandContext,
    client_id: Option<String>,
    client_secret: Option<String>,
    redirect_uri: Option<String>,
) -> Result<()> {
    let existing = ctx.config.load_or_default().oauth;

    let client_id = match client_id.or_else(|| env_default(CLIENT_ID_ENV)) {
        Some(id) => id,
        None => {
            let mut input = Input::<String>::new().with_prompt("OAuth2 Client ID");
            if let Some(current) = existing.as_ref().filter(|o| !o.client_id.is_empty()) {
                input = input.default(current.client_id.clone());
            }
            input.interact_text().context("Failed to read client ID")?
        }
    };

    let client_secret = match client_secret.or_else(|| env_default(CLIENT_SECRET_ENV)) {
        Some(secret) => secret,
        None => Password::new()
            .with_prompt("OAuth2 Client Secret")
            .interact()
            .context("Failed to read client secret")?,
    };

    let current_redirect = existing
        .as_ref()
        .map(|o| o.redirect_uri.clone())
        .filter(|uri| !uri.is_empty());
    let mut redirect_uri = match redirect_uri {
        Some(uri) => uri,
        None => current_redirect
            .clone()
            .unwrap_or_else(|| DEFAULT_REDIRECT_URI.to_string()),
    };
    if redirect_uri == OOB_REDIRECT_URI && current_redirect.as_deref() != Some(OOB_REDIRECT_URI) {
        eprintln!("⚠️  Warning: OOB redirect URI has known browser compatibility issues.");
        eprintln!("   Modern browsers cannot handle 'urn:' scheme redirects.");
        eprintln!("   Recommended: use '{}' instead.", DEFAULT_REDIRECT_URI);
        let keep = Confirm::new()
            .with_prompt("Continue with OOB anyway?")
            .default(false)
            .interact()
            .unwrap_or(false);
        if !keep {
            redirect_uri = DEFAULT_REDIRECT_URI.to_string();
            println!("Using recommended redirect URI: {}", redirect_uri);
        }
    }

    let oauth = OAuthConfig::new(client_id.trim(), client_secret.trim(), redirect_uri.trim());
    if !oauth.is_complete() {
        anyhow::bail!("Client ID and client secret must not be empty");
    }
    ctx.config
        .configure_oauth(oauth.clone())
        .context("Failed to save configuration")?;

    println!("✅ OAuth2 configuration saved");
    println!("📁 Configuration stored in: {}", ctx.config.file().display());

    if !oauth.is_oob() {
        println!();
        println!("📝 Next steps:");
        println!("   1. Register this redirect URI in Basecamp Launchpad:");
        println!("      {}", oauth.redirect_uri);
        println!("   2. Run `basecamp auth --account-id <ID>` to sign in");
    }
    Ok(())
}

pub fn execute_config_path_command(ctx: &CommandContext) -> Result<()> {
    println!("Configuration directory: {}", ctx.config.dir().display());
    println!("Configuration file: {}", ctx.config.file().display());
    if ctx.config.exists() {
        println!("✓ Configuration file exists");
    } else {
        println!("✗ Configuration file does not exist (run 'basecamp configure' first)");
    }
    Ok(())
}

fn env_default(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
