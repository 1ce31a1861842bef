//! Persisted OAuth tokens.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ProviderError, ProviderResult};

/// Access tokens are treated as expired this long before their real expiry.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// A stored token set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub scopes: Vec<String>,
}

impl TokenInfo {
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: Option<String>,
        expires_in_secs: Option<i64>,
        scopes: Vec<String>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token,
            expires_at: expires_in_secs.map(expiry_from_now),
            scopes,
        }
    }

    /// True once the access token is within the expiry margin. Tokens without
    /// a known expiry never expire.
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Utc::now() >= at)
    }

    pub fn has_scopes(&self, required: &[String]) -> bool {
        required.iter().all(|scope| self.scopes.contains(scope))
    }

    /// Replaces the access token after a refresh. Google may rotate the
    /// refresh token too; the old one is kept when it does not.
    pub fn refreshed(
        mut self,
        access_token: impl Into<String>,
        refresh_token: Option<String>,
        expires_in_secs: Option<i64>,
    ) -> Self {
        self.access_token = access_token.into();
        if refresh_token.is_some() {
            self.refresh_token = refresh_token;
        }
        self.expires_at = expires_in_secs.map(expiry_from_now);
        self
    }
}

fn expiry_from_now(secs: i64) -> DateTime<Utc> {
    Utc::now() + Duration::seconds(secs) - Duration::seconds(EXPIRY_MARGIN_SECS)
}

/// Token set backed by a JSON file.
#[derive(Debug)]
pub struct TokenStorage {
    path: PathBuf,
    tokens: Mutex<Option<TokenInfo>>,
}

impl TokenStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            tokens: Mutex::new(None),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<TokenInfo>> {
        self.tokens.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Loads the token file. Returns `Ok(false)` if there is none yet.
    pub fn load(&self) -> ProviderResult<bool> {
        if !self.path.exists() {
            debug!("no token file at {}", self.path.display());
            return Ok(false);
        }

        let content = fs::read_to_string(&self.path).map_err(|e| {
            ProviderError::configuration(format!("failed to read token file: {}", e))
        })?;
        let tokens: TokenInfo = serde_json::from_str(&content).map_err(|e| {
            ProviderError::configuration(format!(
                "failed to parse token file {}: {}",
                self.path.display(),
                e
            ))
        })?;

        debug!("loaded tokens from {}", self.path.display());
        *self.lock() = Some(tokens);
        Ok(true)
    }

    pub fn get(&self) -> Option<TokenInfo> {
        self.lock().clone()
    }

    /// Replaces the token set and writes it to disk.
    pub fn set(&self, tokens: TokenInfo) -> ProviderResult<()> {
        write_token_file(&self.path, &tokens)?;
        *self.lock() = Some(tokens);
        Ok(())
    }

    /// True if the stored tokens are missing or lack one of `scopes`.
    pub fn needs_reauth(&self, scopes: &[String]) -> bool {
        self.lock().as_ref().is_none_or(|t| !t.has_scopes(scopes))
    }

    /// Forgets the token set and removes the file.
    pub fn clear(&self) -> ProviderResult<()> {
        *self.lock() = None;
        if self.path.exists() {
            fs::remove_file(&self.path).map_err(|e| {
                ProviderError::configuration(format!("failed to remove token file: {}", e))
            })?;
            info!("removed token file {}", self.path.display());
        }
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Writes through a temporary file and renames it into place, with
/// owner-only permissions on Unix.
fn write_token_file(path: &Path, tokens: &TokenInfo) -> ProviderResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            ProviderError::configuration(format!("failed to create token directory: {}", e))
        })?;
    }

    let content = serde_json::to_string_pretty(tokens)
        .map_err(|e| ProviderError::internal(format!("failed to serialize tokens: {}", e)))?;
    let temp_path = path.with_extension("json.tmp");
    fs::write(&temp_path, content).map_err(|e| {
        ProviderError::configuration(format!("failed to write token file: {}", e))
    })?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&temp_path, fs::Permissions::from_mode(0o600)).map_err(|e| {
            ProviderError::configuration(format!("failed to restrict token file: {}", e))
        })?;
    }

    fs::rename(&temp_path, path).map_err(|e| {
        ProviderError::configuration(format!("failed to move token file into place: {}", e))
    })?;

    debug!("saved tokens to {}", path.display());
    Ok(())
}
