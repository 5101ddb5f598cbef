//! Secure token storage.
//!
//! Tokens live in the operating system's credential manager (macOS Keychain,
//! Secret Service on Linux, Windows Credential Manager), never in the
//! configuration file. Every CLI invocation is a fresh process, so nothing is
//! cached here between calls.

use std::sync::Mutex;

use chrono::{Duration, Utc};
use keyring::Entry;
use log::debug;

use crate::errors::{BasecampError, Result};
use crate::models::{TokenRecord, expiry_margin};

/// Keychain service name shared by every account
pub const SERVICE_NAME: &str = "basecamp-cli";

/// Account slot used when no account id is known
pub const DEFAULT_ACCOUNT: &str = "default";

/// Capability interface over a credential backend
pub trait TokenStore: Send + Sync {
    /// Store the record, replacing any previous one
    fn save(&self, record: &TokenRecord) -> Result<()>;

    /// Stored record, or `None` when nothing has been saved
    fn load(&self) -> Result<Option<TokenRecord>>;

    /// Remove the record; clearing an empty store succeeds
    fn clear(&self) -> Result<()>;
}

impl<T: TokenStore + ?Sized> TokenStore for &T {
    fn save(&self, record: &TokenRecord) -> Result<()> {
        (**self).save(record)
    }

    fn load(&self) -> Result<Option<TokenRecord>> {
        (**self).load()
    }

    fn clear(&self) -> Result<()> {
        (**self).clear()
    }
}

/// Slots that may hold the token for `account`: its own, then the default
/// slot where tokens obtained before an account was known are kept
fn candidate_slots(account: Option<u64>) -> Vec<Option<u64>> {
    match account {
        Some(id) => vec![Some(id), None],
        None => vec![None],
    }
}

/// First candidate slot holding a token, else the account's own slot.
/// `open` maps a slot (`None` = default) to its store.
pub fn resolve_slot<S: TokenStore>(
    account: Option<u64>,
    open: impl Fn(Option<u64>) -> S,
) -> Result<S> {
    for slot in candidate_slots(account) {
        let store = open(slot);
        if store.load()?.is_some() {
            if slot != account {
                debug!("No token for account {:?}; using the default slot", account);
            }
            return Ok(store);
        }
    }
    Ok(open(account))
}

/// Clear every slot [`resolve_slot`] could pick for `account`, so no
/// command can authenticate with a leftover token afterwards
pub fn clear_slots<S: TokenStore>(
    account: Option<u64>,
    open: impl Fn(Option<u64>) -> S,
) -> Result<()> {
    for slot in candidate_slots(account) {
        open(slot).clear()?;
    }
    Ok(())
}

/// `now + margin >= expires_at`
pub fn is_expired(record: &TokenRecord, margin: Duration) -> bool {
    record.is_expired_at(Utc::now(), margin)
}

/// Load a token that can be used right now.
///
/// Expired tokens are reported, not refreshed.
pub fn usable_token(store: &dyn TokenStore) -> Result<TokenRecord> {
    let record = store.load()?.ok_or(BasecampError::NotAuthenticated)?;
    if is_expired(&record, expiry_margin()) {
        return Err(BasecampError::TokenExpired);
    }
    Ok(record)
}

/// Token storage backed by the OS keychain
#[derive(Debug, Clone)]
pub struct KeyringTokenStore {
    account: String,
}

impl KeyringTokenStore {
    /// One keychain entry per Basecamp account
    pub fn for_account(account_id: Option<u64>) -> Self {
        let account = account_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| DEFAULT_ACCOUNT.to_string());
        Self { account }
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    fn entry_name(&self) -> String {
        format!("tokens:{}", self.account)
    }

    fn entry(&self) -> Result<Entry> {
        Entry::new(SERVICE_NAME, &self.entry_name())
            .map_err(|e| BasecampError::storage(format!("cannot open keychain entry: {}", e)))
    }
}

impl TokenStore for KeyringTokenStore {
    fn save(&self, record: &TokenRecord) -> Result<()> {
        let json = serde_json::to_string(record)?;
        self.entry()?.set_password(&json)?;
        debug!("Stored token for account '{}'", self.account);
        Ok(())
    }

    fn load(&self) -> Result<Option<TokenRecord>> {
        match self.entry()?.get_password() {
            Ok(json) => {
                let record = serde_json::from_str(&json).map_err(|e| {
                    BasecampError::storage(format!("stored token is not valid JSON: {}", e))
                })?;
                Ok(Some(record))
            }
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn clear(&self) -> Result<()> {
        match self.entry()?.delete_password() {
            Ok(()) => {
                debug!("Removed token for account '{}'", self.account);
                Ok(())
            }
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process store for tests and dry runs
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    record: Mutex<Option<TokenRecord>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(record: TokenRecord) -> Self {
        Self {
            record: Mutex::new(Some(record)),
        }
    }

    fn slot(&self) -> Result<std::sync::MutexGuard<'_, Option<TokenRecord>>> {
        self.record
            .lock()
            .map_err(|_| BasecampError::storage("memory store lock poisoned"))
    }
}

impl TokenStore for MemoryTokenStore {
    fn save(&self, record: &TokenRecord) -> Result<()> {
        *self.slot()? = Some(record.clone());
        Ok(())
    }

    fn load(&self) -> Result<Option<TokenRecord>> {
        Ok(self.slot()?.clone())
    }

    fn clear(&self) -> Result<()> {
        *self.slot()? = None;
        Ok(())
    }
}
