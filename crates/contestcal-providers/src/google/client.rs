//! Google Calendar API v3 REST calls.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use contestcal_core::TimeWindow;
use serde::Deserialize;
use tracing::debug;

use crate::error::{ProviderError, ProviderResult};
use crate::service::{CONTEST_URL_PROPERTY, CreatedEvent, ExistingEvent, NewEvent};

/// Events requested per page; the API maximum is 2500.
const PAGE_SIZE: u32 = 250;

/// Thin REST client. The bearer token is passed per call so the caller
/// decides when to refresh it.
#[derive(Debug)]
pub struct GoogleCalendarClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl GoogleCalendarClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> ProviderResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("contestcal/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                ProviderError::internal(format!("failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn events_url(&self, calendar_id: &str) -> String {
        format!(
            "{}/calendars/{}/events",
            self.base_url,
            urlencoding::encode(calendar_id)
        )
    }

    /// Lists every non-cancelled event starting in `window`, expanding
    /// recurring events, across all result pages.
    pub async fn list_events(
        &self,
        access_token: &str,
        calendar_id: &str,
        window: &TimeWindow,
    ) -> ProviderResult<Vec<ExistingEvent>> {
        let mut events = Vec::new();
        let mut page_token: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let page = self
                .list_events_page(access_token, calendar_id, window, page_token.as_deref())
                .await?;
            pages += 1;

            events.extend(
                page.items
                    .into_iter()
                    .filter(|e| e.status.as_deref() != Some("cancelled"))
                    .map(ExistingEvent::from),
            );

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        debug!(
            "listed {} events from calendar {} in {} page(s)",
            events.len(),
            calendar_id,
            pages
        );
        Ok(events)
    }

    async fn list_events_page(
        &self,
        access_token: &str,
        calendar_id: &str,
        window: &TimeWindow,
        page_token: Option<&str>,
    ) -> ProviderResult<EventListResponse> {
        let mut request = self
            .http_client
            .get(self.events_url(calendar_id))
            .bearer_auth(access_token)
            .query(&[
                ("timeMin", window.start.to_rfc3339()),
                ("timeMax", window.end.to_rfc3339()),
                ("singleEvents", "true".to_string()),
                ("orderBy", "startTime".to_string()),
                ("maxResults", PAGE_SIZE.to_string()),
            ]);
        if let Some(token) = page_token {
            request = request.query(&[("pageToken", token)]);
        }

        let response = request.send().await.map_err(request_error)?;
        let body = read_success_body(response).await?;
        serde_json::from_str(&body).map_err(|e| {
            ProviderError::invalid_response(format!("failed to parse event list: {}", e))
        })
    }

    /// Inserts an event into `calendar_id`.
    pub async fn insert_event(
        &self,
        access_token: &str,
        calendar_id: &str,
        event: &NewEvent,
    ) -> ProviderResult<CreatedEvent> {
        let response = self
            .http_client
            .post(self.events_url(calendar_id))
            .bearer_auth(access_token)
            .json(event)
            .send()
            .await
            .map_err(request_error)?;

        let body = read_success_body(response).await?;
        serde_json::from_str(&body).map_err(|e| {
            ProviderError::invalid_response(format!("failed to parse created event: {}", e))
        })
    }
}

fn request_error(e: reqwest::Error) -> ProviderError {
    let message = if e.is_timeout() {
        "request timeout".to_string()
    } else if e.is_connect() {
        format!("connection failed: {}", e)
    } else {
        format!("request failed: {}", e)
    };
    ProviderError::network(message).with_source(e)
}

async fn read_success_body(response: reqwest::Response) -> ProviderResult<String> {
    let status = response.status();
    let retry_after = response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = response
        .text()
        .await
        .map_err(|e| ProviderError::network(format!("failed to read response: {}", e)))?;

    if status.is_success() {
        return Ok(body);
    }

    let mut err = ProviderError::from_status(status.as_u16(), &body);
    if let Some(secs) = retry_after {
        err = ProviderError::new(
            err.code(),
            format!("{} (retry after {}s)", err.message(), secs),
        );
    }
    Err(err)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventListResponse {
    #[serde(default)]
    items: Vec<ApiEvent>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiEvent {
    id: Option<String>,
    status: Option<String>,
    summary: Option<String>,
    description: Option<String>,
    start: Option<ApiEventTime>,
    extended_properties: Option<ApiExtendedProperties>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiEventTime {
    date_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct ApiExtendedProperties {
    #[serde(default)]
    private: HashMap<String, String>,
}

impl From<ApiEvent> for ExistingEvent {
    fn from(event: ApiEvent) -> Self {
        let contest_url = event
            .extended_properties
            .and_then(|mut p| p.private.remove(CONTEST_URL_PROPERTY));
        Self {
            id: event.id,
            title: event.summary.unwrap_or_default(),
            description: event.description.unwrap_or_default(),
            contest_url,
            start: event.start.and_then(|s| s.date_time),
        }
    }
}
