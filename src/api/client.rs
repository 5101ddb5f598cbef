//! Authenticated HTTP client for the Basecamp 3 REST API

use std::sync::Arc;

use log::debug;
use reqwest::header::{ACCEPT, CONTENT_TYPE, LINK};
use reqwest::{Client, Method};
use serde_json::{Map, Value};
use url::Url;

use crate::auth::TokenStore;
use crate::errors::{BasecampError, Result};

pub const BASE_URL: &str = "https://3.basecampapi.com";

/// Basecamp rejects requests without an identifying agent
pub const USER_AGENT: &str = concat!("basecamp-cli/", env!("CARGO_PKG_VERSION"));

const MAX_ERROR_TEXT: usize = 200;

/// Query parameters in the order they are sent
pub type Params = [(String, String)];

/// Decoded body plus the raw `Link` header, if any
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub body: Value,
    pub link: Option<String>,
}

/// Issues one request at a time with the stored bearer token.
///
/// The token is read from the store on every call and never refreshed here;
/// commands check expiry before building a client.
#[derive(Clone)]
pub struct ApiClient {
    base_url: Url,
    http: Client,
    tokens: Arc<dyn TokenStore>,
}

impl ApiClient {
    pub fn new(tokens: Arc<dyn TokenStore>) -> Result<Self> {
        Self::with_base_url(BASE_URL, tokens)
    }

    pub fn with_base_url(base_url: &str, tokens: Arc<dyn TokenStore>) -> Result<Self> {
        let http = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            base_url: Url::parse(base_url)?,
            http,
            tokens,
        })
    }

    /// Send a request and return the decoded body, object or array as the
    /// server sent it. Empty bodies decode to `{}`.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        params: &Params,
        body: Option<&Value>,
    ) -> Result<Value> {
        Ok(self.send(method, path, params, body).await?.body)
    }

    /// Like [`request`](Self::request) but keeps the `Link` header for paging
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        params: &Params,
        body: Option<&Value>,
    ) -> Result<ApiResponse> {
        let url = self.resolve(path)?;
        let token = self
            .tokens
            .load()?
            .ok_or(BasecampError::NotAuthenticated)?;

        debug!("{} {}", method, url);
        let mut builder = self
            .http
            .request(method, url)
            .bearer_auth(&token.access_token)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json");
        if !params.is_empty() {
            builder = builder.query(params);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let link = response
            .headers()
            .get(LINK)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let text = response.text().await?;
        debug!("HTTP {} ({} bytes)", status.as_u16(), text.len());

        if status.is_client_error() || status.is_server_error() {
            return Err(BasecampError::Api {
                status: status.as_u16(),
                message: api_error_message(&text),
            });
        }

        let body = if text.trim().is_empty() {
            Value::Object(Map::new())
        } else {
            serde_json::from_str(&text)?
        };
        Ok(ApiResponse { body, link })
    }

    /// Not supported: the API version this client targets has no accounts
    /// listing. Always empty; account ids come from `--account-id` or the
    /// configured default.
    pub fn get_accounts(&self) -> Vec<Value> {
        Vec::new()
    }

    /// Join a relative path onto the base URL. Absolute URLs (next-page links)
    /// are used verbatim but must stay on the API host, since they carry the
    /// bearer token.
    fn resolve(&self, path: &str) -> Result<Url> {
        match Url::parse(path) {
            Ok(url) => {
                if url.origin() != self.base_url.origin() {
                    return Err(BasecampError::invalid_argument(format!(
                        "refusing to send credentials to {}",
                        url.origin().ascii_serialization()
                    )));
                }
                Ok(url)
            }
            Err(url::ParseError::RelativeUrlWithoutBase) => Ok(self.base_url.join(path)?),
            Err(e) => Err(e.into()),
        }
    }
}

/// Message for a failed API call: `error`, `message` or `errors` from a JSON
/// body, otherwise the start of the raw text.
fn api_error_message(body: &str) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        let field = ["error", "message", "errors"]
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
        return "no response body".to_string();
    }
    text.chars().take(MAX_ERROR_TEXT).collect()
}
