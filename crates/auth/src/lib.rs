pub mod assertion;

pub use assertion::{AppCredentials, AuthError, Claims, ASSERTION_TTL_SECS};

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

#[cfg(unix)]
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

/// Key under which a profile's user API token is stored.
pub fn token_key(profile: &str) -> String {
    format!("{profile}:api_token")
}

/// Key under which a profile's app shared secret is stored.
pub fn shared_secret_key(profile: &str) -> String {
    format!("{profile}:shared_secret")
}

/// Secrets kept in a JSON file readable only by the owner.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    /// Store located at `~/.<app>/credentials`.
    pub fn new(app: &str) -> Self {
        let path = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(format!(".{app}"))
            .join("credentials");
        Self { path }
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn set_secret(&self, account: &str, secret: &str) -> Result<()> {
        let mut creds = self.read_all()?;
        creds.insert(account.to_string(), secret.to_string());
        self.write_all(&creds)
    }

    pub fn get_secret(&self, account: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(account))
    }

    pub fn delete_secret(&self, account: &str) -> Result<()> {
        if !self.path.exists() {
            return Ok(());
        }
        let mut creds = self.read_all()?;
        if creds.remove(account).is_some() {
            self.write_all(&creds)?;
        }
        Ok(())
    }

    fn read_all(&self) -> Result<HashMap<String, String>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Unable to read credentials at {}", self.path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Malformed credentials file {}", self.path.display()))
    }

    fn write_all(&self, creds: &HashMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(0o600);

        let file = options
            .open(&self.path)
            .with_context(|| format!("Unable to write credentials at {}", self.path.display()))?;
        // `mode` only applies on creation; tighten a file that already existed.
        #[cfg(unix)]
        file.set_permissions(fs::Permissions::from_mode(0o600))
            .with_context(|| format!("Unable to restrict {}", self.path.display()))?;
        serde_json::to_writer_pretty(file, creds)?;
        tracing::debug!(path = %self.path.display(), entries = creds.len(), "Credentials saved");
        Ok(())
    }
}
