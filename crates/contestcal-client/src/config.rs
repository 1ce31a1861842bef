//! `config.toml` loading and conversion into runtime settings.
//!
//! The file lives at `~/.config/contestcal/config.toml` by default. Every
//! section has defaults, so an empty or missing file gives a working setup
//! once Google credentials are provided.
//!
//! ```toml
//! [sync]
//! calendar_id = "primary"
//! target_zone = "Asia/Tehran"
//! attendees = ["me@example.com"]
//!
//! [google]
//! client_id = "xxx.apps.googleusercontent.com"
//! client_secret = "env::CONTESTCAL_GOOGLE_SECRET"
//!
//! [sources.codeforces]
//! divisions = ["div. 2", "div. 3"]
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono_tz::Tz;
use contestcal_core::{ReminderOverride, ReminderProfile, parse_zone};
use contestcal_providers::google::{GoogleConfig, OAuthCredentials};
use contestcal_sources::{AtCoderConfig, CodeforcesConfig, MarkerRule};
use contestcal_sync::SyncSettings;
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ClientResult};
use crate::secret;

/// Upper bound for `sync.window_days`.
pub const MAX_WINDOW_DAYS: u32 = 366;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub sync: SyncSection,
    pub google: GoogleSettings,
    pub sources: SourcesSettings,
}

/// `[sync]`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncSection {
    pub calendar_id: String,
    /// IANA zone identifier.
    pub target_zone: String,
    pub window_days: u32,
    /// Empty disables the color tag.
    pub color_id: String,
    pub attendees: Vec<String>,
    pub reminders: Vec<ReminderOverride>,
    /// Per-request timeout for sources and the calendar.
    pub timeout_secs: u64,
}

impl Default for SyncSection {
    fn default() -> Self {
        Self {
            calendar_id: SyncSettings::DEFAULT_CALENDAR_ID.to_string(),
            target_zone: "Asia/Tehran".to_string(),
            window_days: SyncSettings::DEFAULT_WINDOW_DAYS,
            color_id: SyncSettings::DEFAULT_COLOR_ID.to_string(),
            attendees: Vec::new(),
            reminders: ReminderProfile::standard().overrides,
            timeout_secs: 30,
        }
    }
}

/// `[google]`
///
/// `client_id` and `client_secret` accept `pass::` and `env::` references.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    /// Client secrets JSON from the Google Cloud Console.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials_file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesSettings {
    pub atcoder: AtCoderSettings,
    pub codeforces: CodeforcesSettings,
}

/// `[sources.atcoder]`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AtCoderSettings {
    pub enabled: bool,
    pub listing_url: String,
    pub base_url: String,
    pub rules: Vec<MarkerRule>,
}

impl Default for AtCoderSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            listing_url: AtCoderConfig::DEFAULT_LISTING_URL.to_string(),
            base_url: AtCoderConfig::DEFAULT_BASE_URL.to_string(),
            rules: AtCoderConfig::default_rules(),
        }
    }
}

/// `[sources.codeforces]`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeforcesSettings {
    pub enabled: bool,
    pub api_url: String,
    pub contest_url_base: String,
    pub divisions: Vec<String>,
}

impl Default for CodeforcesSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            api_url: CodeforcesConfig::DEFAULT_API_URL.to_string(),
            contest_url_base: CodeforcesConfig::DEFAULT_CONTEST_URL_BASE.to_string(),
            divisions: CodeforcesConfig::default_divisions(),
        }
    }
}

impl ClientConfig {
    /// Loads the default config file, or defaults if it does not exist.
    pub fn load() -> ClientResult<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads an explicitly given config file, which must exist.
    pub fn load_from(path: &Path) -> ClientResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ClientError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
            .map_err(|e| ClientError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("contestcal")
            .join("config.toml")
    }

    pub fn target_zone(&self) -> ClientResult<Tz> {
        parse_zone(&self.sync.target_zone).map_err(ClientError::Config)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.sync.timeout_secs.max(1))
    }

    pub fn sync_settings(&self, dry_run: bool) -> ClientResult<SyncSettings> {
        if !(1..=MAX_WINDOW_DAYS).contains(&self.sync.window_days) {
            return Err(ClientError::Config(format!(
                "sync.window_days must be between 1 and {}, got {}",
                MAX_WINDOW_DAYS, self.sync.window_days
            )));
        }
        if self.sync.calendar_id.trim().is_empty() {
            return Err(ClientError::Config("sync.calendar_id is empty".to_string()));
        }

        let color_id = Some(self.sync.color_id.trim())
            .filter(|c| !c.is_empty())
            .map(str::to_string);

        Ok(SyncSettings::new(self.target_zone()?)
            .with_calendar_id(self.sync.calendar_id.trim())
            .with_window_days(self.sync.window_days)
            .with_reminders(ReminderProfile {
                overrides: self.sync.reminders.clone(),
            })
            .with_color_id(color_id)
            .with_attendees(self.sync.attendees.clone())
            .with_dry_run(dry_run))
    }

    /// AtCoder source settings, or `None` if disabled.
    pub fn atcoder_config(&self, zone: Tz) -> Option<AtCoderConfig> {
        let s = &self.sources.atcoder;
        s.enabled.then(|| {
            AtCoderConfig::new(zone)
                .with_listing_url(&s.listing_url)
                .with_base_url(&s.base_url)
                .with_rules(s.rules.clone())
                .with_timeout(self.timeout())
        })
    }

    /// Codeforces source settings, or `None` if disabled.
    pub fn codeforces_config(&self, zone: Tz) -> Option<CodeforcesConfig> {
        let s = &self.sources.codeforces;
        s.enabled.then(|| {
            CodeforcesConfig::new(zone)
                .with_api_url(&s.api_url)
                .with_contest_url_base(&s.contest_url_base)
                .with_divisions(s.divisions.iter().map(|d| d.to_lowercase()).collect())
                .with_timeout(self.timeout())
        })
    }

    pub fn google_config(&self) -> ClientResult<GoogleConfig> {
        let credentials = self.google.resolve_credentials()?;
        let mut config = GoogleConfig::new(credentials).with_timeout(self.timeout());
        if let Some(ref path) = self.google.token_path {
            config = config.with_token_path(path);
        }
        config.validate()?;
        Ok(config)
    }

    /// A copy safe to print: plain-text client secrets are masked.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if let Some(ref secret) = copy.google.client_secret
            && !secret::is_reference(secret)
        {
            copy.google.client_secret = Some("********".to_string());
        }
        copy
    }
}

impl GoogleSettings {
    /// Inline `client_id`/`client_secret` win over `credentials_file`.
    pub fn resolve_credentials(&self) -> ClientResult<OAuthCredentials> {
        match (&self.client_id, &self.client_secret) {
            (Some(id), Some(secret)) => {
                let id = secret::resolve(id)
                    .map_err(|source| ClientError::Secret {
                        field: "google.client_id",
                        source,
                    })?;
                let secret = secret::resolve(secret)
                    .map_err(|source| ClientError::Secret {
                        field: "google.client_secret",
                        source,
                    })?;
                Ok(OAuthCredentials::new(id, secret))
            }
            (Some(_), None) | (None, Some(_)) => Err(ClientError::Config(
                "google.client_id and google.client_secret must be set together".to_string(),
            )),
            (None, None) => match self.credentials_file {
                Some(ref path) => Ok(OAuthCredentials::from_file(path)?),
                None => Err(ClientError::Config(format!(
                    "Google credentials not found. Add to {}:\n  \
                     [google]\n  \
                     client_id = \"YOUR_ID.apps.googleusercontent.com\"\n  \
                     client_secret = \"YOUR_SECRET\"\n\
                     or point google.credentials_file at a client secrets JSON file",
                    ClientConfig::default_path().display()
                ))),
            },
        }
    }
}
