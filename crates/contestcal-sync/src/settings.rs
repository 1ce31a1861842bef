//! Per-run sync settings.

use chrono_tz::Tz;
use contestcal_core::ReminderProfile;

/// Settings shared by every stage of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncSettings {
    /// Calendar that events are read from and written to.
    pub calendar_id: String,
    /// Zone that event times are displayed in.
    pub target_zone: Tz,
    /// Length of the `[now, now + days]` window.
    pub window_days: u32,
    pub reminders: ReminderProfile,
    /// Calendar color tag applied to created events.
    pub color_id: Option<String>,
    /// Attendee emails added to every created event.
    pub attendees: Vec<String>,
    /// Reconcile without creating anything.
    pub dry_run: bool,
}

impl SyncSettings {
    pub const DEFAULT_CALENDAR_ID: &'static str = "primary";
    pub const DEFAULT_WINDOW_DAYS: u32 = 7;
    pub const DEFAULT_COLOR_ID: &'static str = "6";

    pub fn new(target_zone: Tz) -> Self {
        Self {
            calendar_id: Self::DEFAULT_CALENDAR_ID.to_string(),
            target_zone,
            window_days: Self::DEFAULT_WINDOW_DAYS,
            reminders: ReminderProfile::standard(),
            color_id: Some(Self::DEFAULT_COLOR_ID.to_string()),
            attendees: Vec::new(),
            dry_run: false,
        }
    }

    pub fn with_calendar_id(mut self, id: impl Into<String>) -> Self {
        self.calendar_id = id.into();
        self
    }

    pub fn with_window_days(mut self, days: u32) -> Self {
        self.window_days = days;
        self
    }

    pub fn with_reminders(mut self, reminders: ReminderProfile) -> Self {
        self.reminders = reminders;
        self
    }

    pub fn with_color_id(mut self, color_id: Option<String>) -> Self {
        self.color_id = color_id;
        self
    }

    pub fn with_attendees(mut self, attendees: Vec<String>) -> Self {
        self.attendees = attendees;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self::new(chrono_tz::Asia::Tehran)
    }
}
