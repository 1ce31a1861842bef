//! AtCoder upcoming-contests scraper.
//!
//! The contest page renders upcoming contests as a table under
//! `#contest-table-upcoming`. Each row has three cells we care about:
//!
//! ```text
//! | <time>2024-03-16 21:00:00+0900</time> | Ⓐ ◉ <a href="/contests/abc345">AtCoder Beginner Contest 345</a> | 01:40 |
//! ```
//!
//! A row that cannot be parsed is skipped with a warning; the rest of the
//! table is still processed.

use std::time::Duration;

use chrono::DateTime;
use chrono_tz::Tz;
use contestcal_core::{BoxFuture, ContestError, ContestRecord, to_zone};
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{SourceError, SourceResult};
use crate::filter::MarkerRule;
use crate::http;
use crate::source::ContestSource;

const SOURCE_NAME: &str = "atcoder";

/// Timestamp format of the start cell, including its zone offset.
const START_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%z";

/// Rows of the upcoming-contests table.
const ROW_SELECTOR: &str = "#contest-table-upcoming table tbody tr";

/// Why a single listing row was skipped.
#[derive(Debug, Error)]
pub enum RowError {
    #[error("expected 3 cells, found {found}")]
    MissingCells { found: usize },

    #[error("no contest link in name cell")]
    MissingLink,

    #[error("contest link has no href")]
    MissingHref,

    #[error("unparseable start time {text:?}: {source}")]
    InvalidStartTime {
        text: String,
        source: chrono::ParseError,
    },

    #[error("unparseable duration {text:?}")]
    InvalidDuration { text: String },

    #[error("cannot resolve link {href:?}: {source}")]
    InvalidLink {
        href: String,
        source: url::ParseError,
    },

    #[error(transparent)]
    Record(#[from] ContestError),
}

/// Configuration for the AtCoder source.
#[derive(Debug, Clone)]
pub struct AtCoderConfig {
    /// Page listing upcoming contests.
    pub listing_url: String,
    /// Origin used to resolve relative contest links.
    pub base_url: String,
    /// Inclusion rules; a contest is kept if any rule matches.
    pub rules: Vec<MarkerRule>,
    /// Zone every start time is converted into.
    pub target_zone: Tz,
    /// Request timeout.
    pub timeout: Duration,
}

impl AtCoderConfig {
    pub const DEFAULT_LISTING_URL: &'static str = "https://atcoder.jp/contests/";
    pub const DEFAULT_BASE_URL: &'static str = "https://atcoder.jp";
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Creates a configuration with the default endpoints and rules.
    pub fn new(target_zone: Tz) -> Self {
        Self {
            listing_url: Self::DEFAULT_LISTING_URL.to_string(),
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            rules: Self::default_rules(),
            target_zone,
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Beginner contests, plus regular contests in division 2.
    pub fn default_rules() -> Vec<MarkerRule> {
        vec![
            MarkerRule::phrase("atcoder beginner contest"),
            MarkerRule::phrase_with("atcoder regular contest", "div. 2"),
        ]
    }

    pub fn with_listing_url(mut self, url: impl Into<String>) -> Self {
        self.listing_url = url.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_rules(mut self, rules: Vec<MarkerRule>) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns true if a contest named `name` should be kept.
    pub fn is_target_contest(&self, name: &str) -> bool {
        MarkerRule::any_match(&self.rules, name)
    }
}

/// Scraper for the AtCoder contest listing.
#[derive(Debug)]
pub struct AtCoderSource {
    config: AtCoderConfig,
    base_url: Url,
    http_client: reqwest::Client,
}

impl AtCoderSource {
    /// Creates a new source, validating the configured URLs.
    pub fn new(config: AtCoderConfig) -> SourceResult<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            SourceError::configuration(SOURCE_NAME, format!("invalid base_url: {}", e))
        })?;
        Url::parse(&config.listing_url).map_err(|e| {
            SourceError::configuration(SOURCE_NAME, format!("invalid listing_url: {}", e))
        })?;
        if config.rules.is_empty() {
            return Err(SourceError::configuration(
                SOURCE_NAME,
                "at least one inclusion rule is required",
            ));
        }

        let http_client = http::build_client(SOURCE_NAME, config.timeout)?;

        Ok(Self {
            config,
            base_url,
            http_client,
        })
    }

    async fn fetch_impl(&self) -> SourceResult<Vec<ContestRecord>> {
        let body = http::get_text(&self.http_client, SOURCE_NAME, &self.config.listing_url).await?;
        parse_listing(&body, &self.base_url, &self.config)
    }
}

impl ContestSource for AtCoderSource {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    fn fetch(&self) -> BoxFuture<'_, SourceResult<Vec<ContestRecord>>> {
        Box::pin(async move { self.fetch_impl().await })
    }
}

/// Parses the listing page into records that pass the configured rules.
///
/// Records keep page order.
pub fn parse_listing(
    html: &str,
    base_url: &Url,
    config: &AtCoderConfig,
) -> SourceResult<Vec<ContestRecord>> {
    let row_selector = Selector::parse(ROW_SELECTOR)
        .map_err(|e| SourceError::configuration(SOURCE_NAME, format!("bad selector: {}", e)))?;

    let document = Html::parse_document(html);
    let rows: Vec<ElementRef<'_>> = document.select(&row_selector).collect();
    info!("found {} upcoming AtCoder rows", rows.len());

    let mut contests = Vec::new();
    for (index, row) in rows.into_iter().enumerate() {
        let record = match parse_row(row, base_url, config.target_zone) {
            Ok(record) => record,
            Err(e) => {
                warn!("skipping malformed AtCoder row {}: {}", index + 1, e);
                continue;
            }
        };

        debug!(
            "row {}: {} at {} ({} min) {}",
            index + 1,
            record.name(),
            record.start_time().format("%Y-%m-%d %H:%M:%S"),
            record.length_minutes(),
            record.url()
        );

        if config.is_target_contest(record.name()) {
            info!(
                "added contest: {} at {} with length {} minutes",
                record.name(),
                record.start_time(),
                record.length_minutes()
            );
            contests.push(record);
        } else {
            debug!("filtered out contest: {}", record.name());
        }
    }

    Ok(contests)
}

/// Parses one table row into a record.
pub fn parse_row(row: ElementRef<'_>, base_url: &Url, target_zone: Tz) -> Result<ContestRecord, RowError> {
    let cells: Vec<ElementRef<'_>> = child_elements(row, "td").collect();
    if cells.len() < 3 {
        return Err(RowError::MissingCells { found: cells.len() });
    }

    let start_time = parse_start_time(&cell_text(cells[0]), target_zone)?;

    let link = child_elements(cells[1], "a")
        .next()
        .ok_or(RowError::MissingLink)?;
    let href = link.value().attr("href").ok_or(RowError::MissingHref)?;
    let url = resolve_link(base_url, href)?;
    let name = link.text().collect::<String>();

    let length_minutes = parse_duration(&cell_text(cells[2]))?;

    Ok(ContestRecord::new(&name, start_time, length_minutes, &url)?)
}

/// Parses a start cell such as `2024-03-16 21:00:00+0900` and converts it
/// into the target zone.
pub fn parse_start_time(text: &str, target_zone: Tz) -> Result<DateTime<Tz>, RowError> {
    let text = text.trim();
    let parsed = DateTime::parse_from_str(text, START_TIME_FORMAT).map_err(|source| {
        RowError::InvalidStartTime {
            text: text.to_string(),
            source,
        }
    })?;
    Ok(to_zone(&parsed, target_zone))
}

/// Parses an `HH:MM` duration into total minutes.
pub fn parse_duration(text: &str) -> Result<u32, RowError> {
    let text = text.trim();
    let invalid = || RowError::InvalidDuration {
        text: text.to_string(),
    };

    let (hours, minutes) = text.split_once(':').ok_or_else(invalid)?;
    let hours: u32 = hours.trim().parse().map_err(|_| invalid())?;
    let minutes: u32 = minutes.trim().parse().map_err(|_| invalid())?;

    hours
        .checked_mul(60)
        .and_then(|h| h.checked_add(minutes))
        .ok_or_else(invalid)
}

/// Returns `href` unchanged when absolute, otherwise resolved against `base_url`.
pub fn resolve_link(base_url: &Url, href: &str) -> Result<String, RowError> {
    let href = href.trim();
    if href.starts_with("http://") || href.starts_with("https://") {
        return Ok(href.to_string());
    }
    base_url
        .join(href)
        .map(String::from)
        .map_err(|source| RowError::InvalidLink {
            href: href.to_string(),
            source,
        })
}

fn child_elements<'a>(
    parent: ElementRef<'a>,
    tag: &'static str,
) -> impl Iterator<Item = ElementRef<'a>> {
    parent
        .children()
        .filter_map(ElementRef::wrap)
        .filter(move |el| el.value().name() == tag)
}

fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text().collect::<String>().trim().to_string()
}
