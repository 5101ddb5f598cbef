//! OAuth token models

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Seconds subtracted from the expiry to absorb clock skew
pub const EXPIRY_MARGIN_SECS: i64 = 60;

pub fn expiry_margin() -> Duration {
    Duration::seconds(EXPIRY_MARGIN_SECS)
}

/// Access token plus what is needed to renew it.
///
/// `expires_at` is `None` when the token endpoint did not report a lifetime;
/// such a token is treated as valid until the API rejects it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl TokenRecord {
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: Option<String>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token,
            expires_at,
        }
    }

    /// Expired once `now + margin` reaches `expires_at`
    pub fn is_expired_at(&self, now: DateTime<Utc>, margin: Duration) -> bool {
        match self.expires_at {
            Some(expires_at) => now + margin >= expires_at,
            None => false,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now(), expiry_margin())
    }
}

impl std::fmt::Debug for TokenRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenRecord")
            .field("access_token", &mask_token(&self.access_token))
            .field(
                "refresh_token",
                &self.refresh_token.as_deref().map(mask_token),
            )
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Body returned by the OAuth token endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Lifetime in seconds from the moment of issue
    #[serde(default)]
    pub expires_in: Option<i64>,
}

impl TokenResponse {
    /// Convert the relative lifetime into an absolute record. The error is
    /// the reason the response is unusable.
    pub fn into_record(self, issued_at: DateTime<Utc>) -> Result<TokenRecord, &'static str> {
        let access_token = self
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or("no access_token in response")?;
        let expires_at = match self.expires_in {
            Some(secs) => Some(
                Duration::try_seconds(secs)
                    .and_then(|lifetime| issued_at.checked_add_signed(lifetime))
                    .ok_or("invalid expires_in")?,
            ),
            None => None,
        };
        Ok(TokenRecord::new(access_token, self.refresh_token, expires_at))
    }
}

/// First 8 and last 4 characters; short tokens are fully starred
pub fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 12 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..8].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_expiring_at(expires_at: DateTime<Utc>) -> TokenRecord {
        TokenRecord::new("token", None, Some(expires_at))
    }

    #[test]
    fn test_past_expiry_is_expired() {
        let now = Utc::now();
        assert!(record_expiring_at(now).is_expired_at(now, Duration::zero()));
        assert!(record_expiring_at(now - Duration::hours(1)).is_expired_at(now, expiry_margin()));
    }

    #[test]
    fn test_future_expiry_beyond_margin_is_valid() {
        let now = Utc::now();
        let record = record_expiring_at(now + Duration::hours(1));
        assert!(!record.is_expired_at(now, expiry_margin()));
        assert!(!record.is_expired());
    }

    #[test]
    fn test_expiry_within_margin_counts_as_expired() {
        let now = Utc::now();
        let record = record_expiring_at(now + Duration::seconds(30));
        assert!(record.is_expired_at(now, expiry_margin()));
        assert!(!record.is_expired_at(now, Duration::zero()));
    }

    #[test]
    fn test_missing_expiry_never_expires() {
        let record = TokenRecord::new("token", None, None);
        assert!(!record.is_expired());
    }

    #[test]
    fn test_response_into_record() {
        let issued_at = Utc::now();
        let response: TokenResponse =
            serde_json::from_str(r#"{"access_token":"T1","expires_in":3600}"#).unwrap();
        let record = response.into_record(issued_at).unwrap();
        assert_eq!(record.access_token, "T1");
        assert_eq!(record.refresh_token, None);
        assert_eq!(record.expires_at, Some(issued_at + Duration::seconds(3600)));
    }

    #[test]
    fn test_response_without_access_token() {
        let response: TokenResponse = serde_json::from_str(r#"{"expires_in":10}"#).unwrap();
        assert_eq!(
            response.into_record(Utc::now()).unwrap_err(),
            "no access_token in response"
        );
    }

    #[test]
    fn test_out_of_range_lifetime_is_rejected() {
        for raw in [
            r#"{"access_token":"T1","expires_in":10000000000000}"#,
            r#"{"access_token":"T1","expires_in":9223372036854775807}"#,
        ] {
            let response: TokenResponse = serde_json::from_str(raw).unwrap();
            assert_eq!(response.into_record(Utc::now()).unwrap_err(), "invalid expires_in");
        }
    }

    #[test]
    fn test_record_json_shape() {
        let record: TokenRecord = serde_json::from_str(
            r#"{"access_token":"a","refresh_token":null,"expires_at":"2030-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(record.access_token, "a");
        assert!(record.expires_at.is_some());
    }

    #[test]
    fn test_mask_token() {
        assert_eq!(mask_token("short"), "*****");
        assert_eq!(mask_token("abcdefgh12345678wxyz"), "abcdefgh...wxyz");
        let debug = format!("{:?}", TokenRecord::new("abcdefgh12345678wxyz", None, None));
        assert!(!debug.contains("12345678"));
    }
}
