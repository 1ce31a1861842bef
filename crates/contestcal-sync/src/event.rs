//! Building calendar event bodies from contest records.

use chrono::DateTime;
use chrono_tz::Tz;
use contestcal_core::ContestRecord;
use contestcal_providers::{Attendee, EventDateTime, NewEvent, Reminders};

use crate::index::URL_SENTINEL;
use crate::settings::SyncSettings;

/// Builds the insert body for one contest.
///
/// The description carries the URL after [`URL_SENTINEL`] and the same URL is
/// stored as a private extended property; the index reads both back.
pub fn build_event(record: &ContestRecord, settings: &SyncSettings) -> NewEvent {
    let mut event = NewEvent {
        summary: record.name().to_string(),
        location: Some(record.url().to_string()),
        description: Some(format!("{}{}", URL_SENTINEL, record.url())),
        start: event_time(record.start_time(), settings.target_zone),
        end: event_time(record.end_time(), settings.target_zone),
        reminders: Reminders::overrides(settings.reminders.overrides.clone()),
        color_id: settings.color_id.clone(),
        attendees: settings
            .attendees
            .iter()
            .map(|email| Attendee {
                email: email.clone(),
            })
            .collect(),
        extended_properties: None,
    };
    event.set_contest_url(record.url());
    event
}

fn event_time(at: DateTime<Tz>, zone: Tz) -> EventDateTime {
    EventDateTime {
        date_time: at.with_timezone(&zone).fixed_offset(),
        time_zone: zone.name().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{ExistingEventIndex, extract_sentinel_url};
    use chrono::{TimeZone, Utc};
    use contestcal_core::{ReminderMethod, ReminderOverride, ReminderProfile};
    use contestcal_providers::ExistingEvent;

    fn abc() -> ContestRecord {
        let start = Utc
            .with_ymd_and_hms(2024, 3, 16, 12, 0, 0)
            .unwrap()
            .with_timezone(&chrono_tz::Asia::Tehran);
        ContestRecord::new(
            "AtCoder Beginner Contest 345",
            start,
            100,
            "https://atcoder.jp/contests/abc345",
        )
        .unwrap()
    }

    #[test]
    fn event_body() {
        let settings = SyncSettings::default().with_attendees(vec!["me@example.com".to_string()]);
        let event = build_event(&abc(), &settings);

        assert_eq!(event.summary, "AtCoder Beginner Contest 345");
        assert_eq!(event.location.as_deref(), Some("https://atcoder.jp/contests/abc345"));
        assert_eq!(
            event.description.as_deref(),
            Some("Contest URL: https://atcoder.jp/contests/abc345")
        );
        assert_eq!(event.start.date_time.to_rfc3339(), "2024-03-16T15:30:00+03:30");
        assert_eq!(event.end.date_time.to_rfc3339(), "2024-03-16T17:10:00+03:30");
        assert_eq!(event.start.time_zone, "Asia/Tehran");
        assert!(!event.reminders.use_default);
        assert_eq!(
            event.reminders.overrides,
            vec![
                ReminderOverride::new(ReminderMethod::Email, 1440),
                ReminderOverride::new(ReminderMethod::Popup, 60),
            ]
        );
        assert_eq!(event.color_id.as_deref(), Some("6"));
        assert_eq!(event.attendees[0].email, "me@example.com");
        assert_eq!(event.contest_url(), Some("https://atcoder.jp/contests/abc345"));
    }

    #[test]
    fn custom_settings() {
        let settings = SyncSettings::new(chrono_tz::UTC)
            .with_color_id(None)
            .with_reminders(ReminderProfile {
                overrides: vec![ReminderOverride::new(ReminderMethod::Popup, 10)],
            });
        let event = build_event(&abc(), &settings);

        assert_eq!(event.start.date_time.to_rfc3339(), "2024-03-16T12:00:00+00:00");
        assert_eq!(event.start.time_zone, "UTC");
        assert!(event.color_id.is_none());
        assert_eq!(event.reminders.overrides.len(), 1);
        assert!(event.attendees.is_empty());
    }

    #[test]
    fn created_event_is_recognized_next_run() {
        let record = abc();
        let event = build_event(&record, &SyncSettings::default());
        let description = event.description.clone().unwrap_or_default();

        assert_eq!(extract_sentinel_url(&description), Some(record.url()));

        // a renamed event is still found through its description
        let index = ExistingEventIndex::from_events(&[
            ExistingEvent::new("renamed").with_description(description)
        ]);
        assert!(index.contains(&record));
    }
}
