//! Codeforces contest API source.
//!
//! Queries `contest.list` and keeps contests that have not started yet and
//! whose name carries one of the configured division qualifiers.

use std::time::Duration;

use chrono_tz::Tz;
use contestcal_core::{BoxFuture, ContestRecord, from_epoch_seconds};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::{SourceError, SourceResult};
use crate::http;
use crate::source::ContestSource;

const SOURCE_NAME: &str = "codeforces";

/// Phase of a contest that has not started yet.
const PHASE_BEFORE: &str = "BEFORE";

/// Configuration for the Codeforces source.
#[derive(Debug, Clone)]
pub struct CodeforcesConfig {
    /// The `contest.list` endpoint.
    pub api_url: String,
    /// Contest pages live at `{contest_url_base}/{id}`.
    pub contest_url_base: String,
    /// Lowercase substrings; a contest is kept if its name contains any.
    pub divisions: Vec<String>,
    /// Zone every start time is converted into.
    pub target_zone: Tz,
    /// Request timeout.
    pub timeout: Duration,
}

impl CodeforcesConfig {
    pub const DEFAULT_API_URL: &'static str = "https://codeforces.com/api/contest.list?gym=false";
    pub const DEFAULT_CONTEST_URL_BASE: &'static str = "https://codeforces.com/contest";
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Creates a configuration with the default endpoint and divisions.
    pub fn new(target_zone: Tz) -> Self {
        Self {
            api_url: Self::DEFAULT_API_URL.to_string(),
            contest_url_base: Self::DEFAULT_CONTEST_URL_BASE.to_string(),
            divisions: Self::default_divisions(),
            target_zone,
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn default_divisions() -> Vec<String> {
        vec!["div. 2".to_string(), "div. 3".to_string(), "div. 4".to_string()]
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    pub fn with_contest_url_base(mut self, url: impl Into<String>) -> Self {
        self.contest_url_base = url.into();
        self
    }

    pub fn with_divisions(mut self, divisions: Vec<String>) -> Self {
        self.divisions = divisions;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns true if the lowercased name contains any configured division.
    pub fn is_target_contest(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.divisions
            .iter()
            .any(|division| name.contains(&division.to_lowercase()))
    }

    /// Canonical page URL for a contest id.
    pub fn contest_url(&self, id: u64) -> String {
        format!("{}/{}", self.contest_url_base.trim_end_matches('/'), id)
    }
}

/// Client for the Codeforces contest list.
#[derive(Debug)]
pub struct CodeforcesSource {
    config: CodeforcesConfig,
    http_client: reqwest::Client,
}

impl CodeforcesSource {
    pub fn new(config: CodeforcesConfig) -> SourceResult<Self> {
        if config.divisions.is_empty() {
            return Err(SourceError::configuration(
                SOURCE_NAME,
                "at least one division qualifier is required",
            ));
        }
        let http_client = http::build_client(SOURCE_NAME, config.timeout)?;
        Ok(Self {
            config,
            http_client,
        })
    }

    async fn fetch_impl(&self) -> SourceResult<Vec<ContestRecord>> {
        let body = http::get_text(&self.http_client, SOURCE_NAME, &self.config.api_url).await?;
        parse_response(&body, &self.config)
    }
}

impl ContestSource for CodeforcesSource {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    fn fetch(&self) -> BoxFuture<'_, SourceResult<Vec<ContestRecord>>> {
        Box::pin(async move { self.fetch_impl().await })
    }
}

/// Response envelope of the Codeforces API.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    status: String,
    #[serde(default)]
    comment: Option<String>,
    /// Entries are decoded one by one so a malformed contest only drops itself.
    #[serde(default)]
    result: Vec<serde_json::Value>,
}

/// A contest as listed by `contest.list`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiContest {
    id: u64,
    name: String,
    phase: String,
    start_time_seconds: Option<i64>,
    duration_seconds: i64,
}

/// Parses a `contest.list` body into records, in API order.
///
/// A non-OK status is logged and yields an empty list.
pub fn parse_response(body: &str, config: &CodeforcesConfig) -> SourceResult<Vec<ContestRecord>> {
    let response: ApiResponse = serde_json::from_str(body).map_err(|e| {
        SourceError::invalid_response(SOURCE_NAME, format!("failed to parse response: {}", e))
    })?;

    if response.status != "OK" {
        warn!(
            "Codeforces API returned status {}: {}",
            response.status,
            response.comment.as_deref().unwrap_or("no comment")
        );
        return Ok(Vec::new());
    }

    let mut contests = Vec::new();
    for (position, entry) in response.result.into_iter().enumerate() {
        let contest: ApiContest = match serde_json::from_value(entry) {
            Ok(contest) => contest,
            Err(e) => {
                warn!("skipping malformed contest entry #{}: {}", position, e);
                continue;
            }
        };
        if contest.phase != PHASE_BEFORE {
            continue;
        }
        if !config.is_target_contest(&contest.name) {
            debug!("filtered out contest: {}", contest.name);
            continue;
        }

        let Some(start_time) = contest
            .start_time_seconds
            .and_then(|secs| from_epoch_seconds(secs, config.target_zone))
        else {
            warn!("skipping contest {} ({}): no start time", contest.id, contest.name);
            continue;
        };

        // sub-minute remainders are truncated
        let length_minutes = u32::try_from(contest.duration_seconds.max(0) / 60).unwrap_or(u32::MAX);

        match ContestRecord::new(
            &contest.name,
            start_time,
            length_minutes,
            &config.contest_url(contest.id),
        ) {
            Ok(record) => {
                info!(
                    "added contest: {} at {} with length {} minutes",
                    record.name(),
                    record.start_time().format("%Y-%m-%d %H:%M:%S %Z%z"),
                    record.length_minutes()
                );
                contests.push(record);
            }
            Err(e) => warn!("skipping contest {}: {}", contest.id, e),
        }
    }

    Ok(contests)
}
