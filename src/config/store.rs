//! On-disk configuration store (`~/.basecamp/config.json`)

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use super::app_config::{AppConfig, OAuthConfig};
use crate::errors::{BasecampError, Result};

/// Overrides the configuration directory
pub const CONFIG_DIR_ENV: &str = "BASECAMP_CONFIG_DIR";
/// Overrides the stored OAuth client id
pub const CLIENT_ID_ENV: &str = "BASECAMP_CLIENT_ID";
/// Overrides the stored OAuth client secret
pub const CLIENT_SECRET_ENV: &str = "BASECAMP_CLIENT_SECRET";

const CONFIG_DIR_NAME: &str = ".basecamp";
const CONFIG_FILE_NAME: &str = "config.json";

/// Reads and writes the JSON configuration file.
///
/// Constructed once at startup and handed to whatever needs it; nothing in
/// the crate reads configuration from global state.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    dir: PathBuf,
    file: PathBuf,
}

impl ConfigStore {
    /// Store rooted at an explicit directory
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let file = dir.join(CONFIG_FILE_NAME);
        Self { dir, file }
    }

    /// Store at `$BASECAMP_CONFIG_DIR`, falling back to `~/.basecamp`
    pub fn from_env() -> Result<Self> {
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|d| !d.is_empty()) {
            return Ok(Self::new(PathBuf::from(dir)));
        }

        let home = dirs::home_dir()
            .ok_or_else(|| BasecampError::config("cannot determine the home directory"))?;
        Ok(Self::new(home.join(CONFIG_DIR_NAME)))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn exists(&self) -> bool {
        self.file.is_file()
    }

    /// Load the configuration; a missing file is an empty configuration
    pub fn load(&self) -> Result<AppConfig> {
        if !self.exists() {
            debug!("No configuration file at {}", self.file.display());
            return Ok(AppConfig::default());
        }

        let raw = fs::read_to_string(&self.file).map_err(|e| {
            BasecampError::config(format!("cannot read {}: {}", self.file.display(), e))
        })?;

        serde_json::from_str(&raw).map_err(|e| {
            BasecampError::config(format!("{} is not valid JSON: {}", self.file.display(), e))
        })
    }

    /// Like [`load`](Self::load), but an unreadable file counts as empty
    pub fn load_or_default(&self) -> AppConfig {
        self.load().unwrap_or_else(|e| {
            warn!("Ignoring existing configuration: {}", e);
            AppConfig::default()
        })
    }

    /// Write the configuration, owner read/write only
    pub fn save(&self, config: &AppConfig) -> Result<()> {
        create_private_dir(&self.dir)?;

        let json = serde_json::to_string_pretty(config)?;
        let mut file = open_private_file(&self.file)?;
        file.write_all(json.as_bytes())?;
        file.write_all(b"\n")?;
        restrict_permissions(&self.file)?;

        debug!("Configuration written to {}", self.file.display());
        Ok(())
    }

    /// Replace the OAuth client settings, keeping everything else
    pub fn configure_oauth(&self, oauth: OAuthConfig) -> Result<()> {
        let mut config = self.load_or_default();
        config.oauth = Some(oauth);
        self.save(&config)
    }

    /// OAuth settings with environment overrides applied
    pub fn oauth_config(&self) -> Result<OAuthConfig> {
        let stored = self.load()?.oauth;
        resolve_oauth(
            stored,
            env_value(CLIENT_ID_ENV),
            env_value(CLIENT_SECRET_ENV),
        )
    }

    pub fn account_id(&self) -> Result<Option<u64>> {
        Ok(self.load()?.account_id)
    }

    pub fn set_account_id(&self, account_id: u64) -> Result<()> {
        let mut config = self.load_or_default();
        config.account_id = Some(account_id);
        self.save(&config)
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Merge stored OAuth settings with optional client id/secret overrides
pub fn resolve_oauth(
    stored: Option<OAuthConfig>,
    client_id: Option<String>,
    client_secret: Option<String>,
) -> Result<OAuthConfig> {
    let mut oauth = match (stored, &client_id, &client_secret) {
        (Some(oauth), _, _) => oauth,
        (None, Some(_), Some(_)) => OAuthConfig::new(
            String::new(),
            String::new(),
            super::app_config::DEFAULT_REDIRECT_URI,
        ),
        (None, _, _) => return Err(BasecampError::config("OAuth2 is not configured")),
    };

    if let Some(id) = client_id {
        oauth.client_id = id;
    }
    if let Some(secret) = client_secret {
        oauth.client_secret = secret;
    }

    if !oauth.is_complete() {
        return Err(BasecampError::config(
            "OAuth2 client_id and client_secret are required",
        ));
    }
    Ok(oauth)
}

fn create_private_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(dir, fs::Permissions::from_mode(0o700))?;
    }
    Ok(())
}

fn open_private_file(path: &Path) -> Result<fs::File> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    Ok(options.open(path)?)
}

fn restrict_permissions(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    }
    #[cfg(not(unix))]
    let _ = path;
    Ok(())
}
