//! OAuth2 authorization-code flow against Basecamp Launchpad

use chrono::Utc;
use log::{debug, info};
use reqwest::Client;
use serde_json::Value;
use url::Url;

use crate::config::OAuthConfig;
use crate::errors::{BasecampError, Result};
use crate::models::{TokenRecord, TokenResponse};

/// Browser-facing authorization endpoint
pub const AUTHORIZATION_URL: &str = "https://launchpad.37signals.com/authorization/new";
/// Token exchange endpoint
pub const TOKEN_URL: &str = "https://launchpad.37signals.com/authorization/token";

const MAX_REASON_LEN: usize = 200;

/// Grant sent to the token endpoint
enum Grant<'a> {
    AuthorizationCode(&'a str),
    RefreshToken(&'a str),
}

impl Grant<'_> {
    fn grant_type(&self) -> &'static str {
        match self {
            Grant::AuthorizationCode(_) => "authorization_code",
            Grant::RefreshToken(_) => "refresh_token",
        }
    }

    /// Launchpad's own `type` parameter
    fn launchpad_type(&self) -> &'static str {
        match self {
            Grant::AuthorizationCode(_) => "web_server",
            Grant::RefreshToken(_) => "refresh",
        }
    }
}

/// Builds authorization URLs and trades codes or refresh tokens for access
/// tokens. Persisting the result is up to the caller.
#[derive(Debug, Clone)]
pub struct Authenticator {
    oauth: OAuthConfig,
    authorization_url: String,
    token_url: String,
    http: Client,
}

impl Authenticator {
    pub fn new(oauth: OAuthConfig) -> Self {
        Self {
            oauth,
            authorization_url: AUTHORIZATION_URL.to_string(),
            token_url: TOKEN_URL.to_string(),
            http: Client::new(),
        }
    }

    /// Point the flow at different endpoints
    pub fn with_endpoints(
        mut self,
        authorization_url: impl Into<String>,
        token_url: impl Into<String>,
    ) -> Self {
        self.authorization_url = authorization_url.into();
        self.token_url = token_url.into();
        self
    }

    /// URL the user opens to grant access. Pure; same input, same URL.
    pub fn build_authorization_url(&self, account_hint: Option<&str>) -> Result<Url> {
        let mut url = Url::parse(&self.authorization_url)?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("type", "web_server")
                .append_pair("response_type", "code")
                .append_pair("client_id", &self.oauth.client_id)
                .append_pair("redirect_uri", &self.oauth.redirect_uri);
            if let Some(account) = account_hint {
                query.append_pair("account_id", account);
            }
        }
        Ok(url)
    }

    /// Trade an authorization code for a token record
    pub async fn exchange_code_for_token(&self, code: &str) -> Result<TokenRecord> {
        info!("Exchanging authorization code for an access token");
        self.request_token(Grant::AuthorizationCode(code)).await
    }

    /// Trade a refresh token for a new token record.
    ///
    /// Launchpad does not rotate refresh tokens, so the one passed in is kept
    /// when the response omits it.
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<TokenRecord> {
        info!("Refreshing access token");
        let mut record = self
            .request_token(Grant::RefreshToken(refresh_token))
            .await?;
        if record.refresh_token.is_none() {
            record.refresh_token = Some(refresh_token.to_string());
        }
        Ok(record)
    }

    async fn request_token(&self, grant: Grant<'_>) -> Result<TokenRecord> {
        let (secret_name, secret_value) = match &grant {
            Grant::AuthorizationCode(code) => ("code", *code),
            Grant::RefreshToken(token) => ("refresh_token", *token),
        };

        let form = [
            ("type", grant.launchpad_type()),
            ("grant_type", grant.grant_type()),
            ("client_id", self.oauth.client_id.as_str()),
            ("client_secret", self.oauth.client_secret.as_str()),
            ("redirect_uri", self.oauth.redirect_uri.as_str()),
            (secret_name, secret_value),
        ];

        debug!("POST {} (grant_type={})", self.token_url, grant.grant_type());
        let issued_at = Utc::now();
        let response = self.http.post(&self.token_url).form(&form).send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!("Token endpoint answered {}", status);

        if !status.is_success() {
            return Err(BasecampError::Authentication {
                status: status.as_u16(),
                reason: error_reason(&body, status.canonical_reason()),
            });
        }

        let parsed: TokenResponse = serde_json::from_str(&body)?;
        parsed
            .into_record(issued_at)
            .map_err(|reason| BasecampError::Authentication {
                status: status.as_u16(),
                reason: reason.to_string(),
            })
    }
}

/// Best reason a token endpoint gave for refusing a request
fn error_reason(body: &str, fallback: Option<&str>) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        let field = ["error_description", "error", "message"]
            .iter()
            .find_map(|key| map.get(*key).filter(|v| !v.is_null()));
        if let Some(value) = field {
            return match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
        }
    }

    let text = body.trim();
    if text.is_empty() {
        return fallback.unwrap_or("unknown error").to_string();
    }
    text.chars().take(MAX_REASON_LEN).collect()
}

/// Pull the code out of whatever the user pasted: the bare code, a full
/// redirect URL, or a `code=...` fragment.
pub fn extract_code(input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Ok(url) = Url::parse(input) {
        if let Some((_, code)) = url.query_pairs().find(|(k, _)| k == "code") {
            return Some(code.into_owned());
        }
    }

    if let Some(pos) = input.find("code=") {
        let rest = &input[pos + "code=".len()..];
        let code: String = rest.chars().take_while(|c| *c != '&' && *c != '#').collect();
        return (!code.is_empty()).then_some(code);
    }

    Some(input.to_string())
}
