//! Google Calendar configuration and OAuth client credentials.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{ProviderError, ProviderResult};

/// OAuth client id and secret of an installed application.
#[derive(Clone)]
pub struct OAuthCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl std::fmt::Debug for OAuthCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// Layout of a client secrets file downloaded from the Google Cloud Console.
///
/// Both the nested `installed`/`web` form and a flat form are accepted.
#[derive(Debug, Deserialize)]
struct ClientSecretsFile {
    installed: Option<ClientSecrets>,
    web: Option<ClientSecrets>,
    client_id: Option<String>,
    client_secret: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ClientSecrets {
    client_id: String,
    client_secret: String,
}

impl OAuthCredentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Reads a client secrets JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> ProviderResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ProviderError::configuration(format!(
                "failed to read credentials file {}: {}",
                path.display(),
                e
            ))
            .with_source(e)
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> ProviderResult<Self> {
        let file: ClientSecretsFile = serde_json::from_str(json).map_err(|e| {
            ProviderError::configuration(format!("failed to parse credentials JSON: {}", e))
        })?;

        if let Some(secrets) = file.installed.or(file.web) {
            return Ok(Self::new(secrets.client_id, secrets.client_secret));
        }
        match (file.client_id, file.client_secret) {
            (Some(id), Some(secret)) => Ok(Self::new(id, secret)),
            _ => Err(ProviderError::configuration(
                "credentials JSON needs an 'installed' or 'web' section, or top-level client_id and client_secret",
            )),
        }
    }

    pub fn validate(&self) -> ProviderResult<()> {
        if self.client_id.trim().is_empty() {
            return Err(ProviderError::configuration("client_id is required"));
        }
        if self.client_secret.trim().is_empty() {
            return Err(ProviderError::configuration("client_secret is required"));
        }
        Ok(())
    }
}

/// Settings for [`super::GoogleCalendar`].
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    pub credentials: OAuthCredentials,
    /// Where the OAuth token set is persisted between runs.
    pub token_path: PathBuf,
    pub scopes: Vec<String>,
    pub timeout: Duration,
    /// Ports tried, in order, for the loopback redirect.
    pub loopback_port_range: (u16, u16),
    /// How long to wait for the browser redirect.
    pub callback_timeout: Duration,
    /// Base URL of the Calendar v3 REST API.
    pub api_base_url: String,
    pub auth_url: String,
    pub token_url: String,
    /// When false, a missing or unusable token fails instead of opening a
    /// browser.
    pub interactive: bool,
}

impl GoogleConfig {
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
    /// Read/write access is needed to insert events.
    pub const CALENDAR_SCOPE: &'static str = "https://www.googleapis.com/auth/calendar";
    pub const DEFAULT_API_BASE_URL: &'static str = "https://www.googleapis.com/calendar/v3";
    pub const DEFAULT_AUTH_URL: &'static str = "https://accounts.google.com/o/oauth2/v2/auth";
    pub const DEFAULT_TOKEN_URL: &'static str = "https://oauth2.googleapis.com/token";

    pub fn new(credentials: OAuthCredentials) -> Self {
        Self {
            credentials,
            token_path: Self::default_token_path(),
            scopes: vec![Self::CALENDAR_SCOPE.to_string()],
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            loopback_port_range: (8080, 8090),
            callback_timeout: Duration::from_secs(300),
            api_base_url: Self::DEFAULT_API_BASE_URL.to_string(),
            auth_url: Self::DEFAULT_AUTH_URL.to_string(),
            token_url: Self::DEFAULT_TOKEN_URL.to_string(),
            interactive: true,
        }
    }

    /// `$XDG_DATA_HOME/contestcal/google-token.json` or the platform
    /// equivalent.
    pub fn default_token_path() -> PathBuf {
        dirs::data_dir()
            .or_else(|| dirs::home_dir().map(|h| h.join(".local").join("share")))
            .unwrap_or_else(|| PathBuf::from("."))
            .join("contestcal")
            .join("google-token.json")
    }

    pub fn with_token_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.token_path = path.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_loopback_port_range(mut self, start: u16, end: u16) -> Self {
        self.loopback_port_range = (start, end);
        self
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    pub fn with_interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    pub fn validate(&self) -> ProviderResult<()> {
        self.credentials.validate()?;
        if self.scopes.is_empty() {
            return Err(ProviderError::configuration(
                "at least one OAuth scope is required",
            ));
        }
        if self.loopback_port_range.0 > self.loopback_port_range.1 {
            return Err(ProviderError::configuration("invalid loopback port range"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> OAuthCredentials {
        OAuthCredentials::new("id.apps.googleusercontent.com", "secret")
    }

    #[test]
    fn defaults() {
        let config = GoogleConfig::new(credentials());
        assert_eq!(config.scopes, vec![GoogleConfig::CALENDAR_SCOPE.to_string()]);
        assert!(config.interactive);
        assert!(config.token_path.ends_with("contestcal/google-token.json"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validation_failures() {
        assert!(OAuthCredentials::new("", "secret").validate().is_err());
        assert!(OAuthCredentials::new("id", " ").validate().is_err());

        let config = GoogleConfig::new(credentials()).with_loopback_port_range(9000, 8000);
        assert!(config.validate().is_err());
    }

    #[test]
    fn secret_is_not_debug_printed() {
        let debug = format!("{:?}", credentials());
        assert!(debug.contains("id.apps.googleusercontent.com"));
        assert!(!debug.contains("\"secret\""));
    }

    #[test]
    fn credentials_json_layouts() {
        let installed = r#"{"installed":{"client_id":"a","client_secret":"b","project_id":"p"}}"#;
        let creds = OAuthCredentials::from_json(installed).unwrap();
        assert_eq!((creds.client_id.as_str(), creds.client_secret.as_str()), ("a", "b"));

        let web = r#"{"web":{"client_id":"c","client_secret":"d"}}"#;
        assert_eq!(OAuthCredentials::from_json(web).unwrap().client_id, "c");

        let flat = r#"{"client_id":"e","client_secret":"f","type":"authorized_user"}"#;
        assert_eq!(OAuthCredentials::from_json(flat).unwrap().client_secret, "f");

        assert!(OAuthCredentials::from_json(r#"{"client_id":"only"}"#).is_err());
        assert!(OAuthCredentials::from_json("not json").is_err());
    }

    #[test]
    fn credentials_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("client_secret.json");
        std::fs::write(&path, r#"{"installed":{"client_id":"x","client_secret":"y"}}"#).unwrap();
        assert_eq!(OAuthCredentials::from_file(&path).unwrap().client_id, "x");

        let err = OAuthCredentials::from_file(dir.path().join("missing.json")).unwrap_err();
        assert!(err.message().contains("missing.json"));
    }
}
