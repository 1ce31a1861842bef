//! The calendar interface used by the sync core, plus its event shapes.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, Utc};
use contestcal_core::{BoxFuture, ReminderOverride, TimeWindow};
use serde::{Deserialize, Serialize};

use crate::error::ProviderResult;

/// Private extended-property key carrying a contest's canonical URL.
pub const CONTEST_URL_PROPERTY: &str = "contestUrl";

/// A calendar that contest events can be read from and written to.
///
/// Implementations must be `Send + Sync` so a single instance can back the
/// sync driver behind a shared reference.
pub trait CalendarService: Send + Sync {
    /// Short identifier used in logs and error prefixes.
    fn name(&self) -> &str;

    /// Lists events starting inside `window`, following pagination to the end.
    fn list_events<'a>(
        &'a self,
        calendar_id: &'a str,
        window: &'a TimeWindow,
    ) -> BoxFuture<'a, ProviderResult<Vec<ExistingEvent>>>;

    /// Inserts one event.
    fn create_event<'a>(
        &'a self,
        calendar_id: &'a str,
        event: &'a NewEvent,
    ) -> BoxFuture<'a, ProviderResult<CreatedEvent>>;
}

/// An event already present in the calendar, reduced to what duplicate
/// detection needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExistingEvent {
    pub id: Option<String>,
    /// Event title; may be empty.
    pub title: String,
    /// Event description; empty when the event has none.
    pub description: String,
    /// Value of the [`CONTEST_URL_PROPERTY`] private property, if set.
    pub contest_url: Option<String>,
    pub start: Option<DateTime<Utc>>,
}

impl ExistingEvent {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_contest_url(mut self, url: impl Into<String>) -> Self {
        self.contest_url = Some(url.into());
        self
    }
}

/// Start or end of a new event: an offset timestamp plus the IANA zone it
/// should be displayed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    pub date_time: DateTime<FixedOffset>,
    pub time_zone: String,
}

/// Reminder block of a new event. Defaults are always disabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminders {
    pub use_default: bool,
    pub overrides: Vec<ReminderOverride>,
}

impl Reminders {
    pub fn overrides(overrides: Vec<ReminderOverride>) -> Self {
        Self {
            use_default: false,
            overrides,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendee {
    pub email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendedProperties {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub private: BTreeMap<String, String>,
}

/// Body of an event insert request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEvent {
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub start: EventDateTime,
    pub end: EventDateTime,
    pub reminders: Reminders,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attendees: Vec<Attendee>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extended_properties: Option<ExtendedProperties>,
}

impl NewEvent {
    /// Records the contest URL as a private extended property.
    pub fn set_contest_url(&mut self, url: impl Into<String>) {
        self.extended_properties
            .get_or_insert_with(ExtendedProperties::default)
            .private
            .insert(CONTEST_URL_PROPERTY.to_string(), url.into());
    }

    /// The contest URL stored in the private extended properties, if any.
    pub fn contest_url(&self) -> Option<&str> {
        self.extended_properties
            .as_ref()
            .and_then(|p| p.private.get(CONTEST_URL_PROPERTY))
            .map(String::as_str)
    }
}

/// What the service returns for a successful insert.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedEvent {
    pub id: String,
    #[serde(default)]
    pub html_link: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use contestcal_core::ReminderMethod;

    fn sample() -> NewEvent {
        let start = FixedOffset::east_opt(3 * 3600 + 1800)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 16, 17, 35, 0)
            .unwrap();
        NewEvent {
            summary: "AtCoder Beginner Contest 345".to_string(),
            location: Some("https://atcoder.jp/contests/abc345".to_string()),
            description: Some("Contest URL: https://atcoder.jp/contests/abc345".to_string()),
            start: EventDateTime {
                date_time: start,
                time_zone: "Asia/Tehran".to_string(),
            },
            end: EventDateTime {
                date_time: start + chrono::Duration::minutes(100),
                time_zone: "Asia/Tehran".to_string(),
            },
            reminders: Reminders::overrides(vec![
                ReminderOverride::new(ReminderMethod::Email, 1440),
                ReminderOverride::new(ReminderMethod::Popup, 60),
            ]),
            color_id: Some("6".to_string()),
            attendees: vec![],
            extended_properties: None,
        }
    }

    #[test]
    fn serializes_wire_shape() {
        let mut event = sample();
        event.set_contest_url("https://atcoder.jp/contests/abc345");
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["summary"], "AtCoder Beginner Contest 345");
        assert_eq!(json["start"]["dateTime"], "2024-03-16T17:35:00+03:30");
        assert_eq!(json["start"]["timeZone"], "Asia/Tehran");
        assert_eq!(json["end"]["dateTime"], "2024-03-16T19:15:00+03:30");
        assert_eq!(json["reminders"]["useDefault"], false);
        assert_eq!(json["reminders"]["overrides"][0]["method"], "email");
        assert_eq!(json["reminders"]["overrides"][0]["minutes"], 1440);
        assert_eq!(json["reminders"]["overrides"][1]["method"], "popup");
        assert_eq!(json["colorId"], "6");
        assert_eq!(
            json["extendedProperties"]["private"]["contestUrl"],
            "https://atcoder.jp/contests/abc345"
        );
        assert!(json.get("attendees").is_none());
    }

    #[test]
    fn contest_url_property() {
        let mut event = sample();
        assert_eq!(event.contest_url(), None);
        event.set_contest_url("https://codeforces.com/contest/99");
        assert_eq!(event.contest_url(), Some("https://codeforces.com/contest/99"));
    }

    #[test]
    fn created_event_parses() {
        let created: CreatedEvent =
            serde_json::from_str(r#"{"id":"abc123","htmlLink":"https://calendar/x","status":"confirmed"}"#)
                .unwrap();
        assert_eq!(created.id, "abc123");
        assert_eq!(created.html_link.as_deref(), Some("https://calendar/x"));
    }
}
