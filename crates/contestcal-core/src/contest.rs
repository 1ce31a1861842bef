//! The contest record shared by every source adapter.
//!
//! A [`ContestRecord`] is built fresh on each run from live source data and is
//! validated at construction: the name is normalized and non-empty, the start
//! time carries an explicit zone, and the URL is absolute. Anything that fails
//! validation is rejected with a [`ContestError`] so the caller can skip it.

use std::sync::LazyLock;

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use regex::Regex;
use thiserror::Error;
use url::Url;

/// Leading icons and other non-word decoration, except an opening parenthesis.
static LEADING_DECORATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\w(]+").expect("Invalid decoration regex"));

/// Runs of whitespace inside a name.
static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid whitespace regex"));

/// Reasons a contest record can be rejected at construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContestError {
    /// The name was empty after normalization.
    #[error("contest name is empty")]
    EmptyName,

    /// The URL could not be parsed as an absolute http(s) URL.
    #[error("contest URL is not absolute: {url}")]
    RelativeUrl { url: String },
}

/// A normalized upcoming contest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContestRecord {
    name: String,
    start_time: DateTime<Tz>,
    length_minutes: u32,
    url: String,
}

impl ContestRecord {
    /// Creates a validated record.
    ///
    /// The name is passed through [`normalize_name`].
    pub fn new(
        name: &str,
        start_time: DateTime<Tz>,
        length_minutes: u32,
        url: &str,
    ) -> Result<Self, ContestError> {
        let name = normalize_name(name);
        if name.is_empty() {
            return Err(ContestError::EmptyName);
        }

        let url = url.trim();
        let parsed = Url::parse(url).map_err(|_| ContestError::RelativeUrl {
            url: url.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
            return Err(ContestError::RelativeUrl {
                url: url.to_string(),
            });
        }

        Ok(Self {
            name,
            start_time,
            length_minutes,
            url: url.to_string(),
        })
    }

    /// The display name, also the primary dedup key.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Start time in the target zone.
    pub fn start_time(&self) -> DateTime<Tz> {
        self.start_time
    }

    /// Start time converted to UTC.
    pub fn start_utc(&self) -> DateTime<Utc> {
        self.start_time.with_timezone(&Utc)
    }

    /// End time, `start + length`.
    pub fn end_time(&self) -> DateTime<Tz> {
        self.start_time + Duration::minutes(i64::from(self.length_minutes))
    }

    /// Length in whole minutes.
    pub fn length_minutes(&self) -> u32 {
        self.length_minutes
    }

    /// Absolute contest page URL, the secondary dedup key.
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Normalizes a raw contest name into a display title.
///
/// Trims the input, strips leading decoration (icons, bullets) but keeps a
/// leading `(`, drops control characters and collapses whitespace runs into a
/// single space.
pub fn normalize_name(raw: &str) -> String {
    let trimmed = raw.trim();
    let stripped = LEADING_DECORATION.replace(trimmed, "");
    let collapsed = WHITESPACE_RUN.replace_all(&stripped, " ");
    collapsed
        .chars()
        .filter(|c| !c.is_control())
        .collect::<String>()
        .trim()
        .to_string()
}
