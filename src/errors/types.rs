//! Error types for the Basecamp CLI

use thiserror::Error;

/// Main error type for Basecamp CLI operations
#[derive(Debug, Error)]
pub enum BasecampError {
    /// Configuration file missing, unreadable or incomplete
    #[error("Configuration error: {0}. Run `basecamp configure` first.")]
    Config(String),

    /// The token endpoint rejected an exchange or refresh
    #[error("Authentication failed (HTTP {status}): {reason}")]
    Authentication { status: u16, reason: String },

    /// No token stored for the account
    #[error("Not authenticated. Run `basecamp auth` first.")]
    NotAuthenticated,

    /// Stored token is past its expiry
    #[error(
        "Access token expired. Run `basecamp refresh` or `basecamp auth` to sign in again."
    )]
    TokenExpired,

    /// Non-success HTTP status from the Basecamp API
    #[error("API request failed (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// Local redirect listener saw no callback in time
    #[error(
        "No authorization callback received within {seconds}s. Re-run `basecamp auth --manual` and paste the code instead."
    )]
    ListenerTimeout { seconds: u64 },

    /// Local redirect listener could not start or was interrupted
    #[error("Callback listener error: {0}")]
    Listener(String),

    /// Secure token storage failure
    #[error("Token storage error: {0}")]
    Storage(String),

    /// No account id given and none configured
    #[error(
        "Account ID is required. Pass --account-id or set a default with `basecamp auth --account-id <ID>`."
    )]
    AccountRequired,

    /// Caller supplied arguments the API would reject
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Transport level HTTP failure
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed URL
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

impl BasecampError {
    pub fn config(msg: impl Into<String>) -> Self {
        BasecampError::Config(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        BasecampError::Storage(msg.into())
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        BasecampError::InvalidArgument(msg.into())
    }

    /// True when the user has to go through `basecamp auth` again
    pub fn requires_reauth(&self) -> bool {
        matches!(
            self,
            BasecampError::NotAuthenticated
                | BasecampError::TokenExpired
                | BasecampError::Authentication { .. }
                | BasecampError::Api { status: 401, .. }
        )
    }
}

impl From<keyring::Error> for BasecampError {
    fn from(err: keyring::Error) -> Self {
        BasecampError::Storage(err.to_string())
    }
}

/// Result type alias for Basecamp CLI operations
pub type Result<T> = std::result::Result<T, BasecampError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_mentions_configure() {
        let err = BasecampError::config("no OAuth settings");
        assert!(err.to_string().contains("basecamp configure"));
    }

    #[test]
    fn test_api_error_carries_status() {
        let err = BasecampError::Api {
            status: 404,
            message: "Not found".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("404"));
        assert!(msg.contains("Not found"));
    }

    #[test]
    fn test_requires_reauth() {
        assert!(BasecampError::TokenExpired.requires_reauth());
        assert!(BasecampError::NotAuthenticated.requires_reauth());
        assert!(
            BasecampError::Api {
                status: 401,
                message: String::new()
            }
            .requires_reauth()
        );
        assert!(
            !BasecampError::Api {
                status: 500,
                message: String::new()
            }
            .requires_reauth()
        );
        assert!(!BasecampError::AccountRequired.requires_reauth());
    }
}
