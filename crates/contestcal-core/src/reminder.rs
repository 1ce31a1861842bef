//! Reminder settings attached to created contest events.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How a reminder is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderMethod {
    /// Email reminder.
    Email,
    /// Popup notification in the calendar client.
    Popup,
}

impl ReminderMethod {
    /// Returns the wire name of this method.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Popup => "popup",
        }
    }
}

impl fmt::Display for ReminderMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single reminder override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderOverride {
    pub method: ReminderMethod,
    /// Lead time before the event start.
    pub minutes: u32,
}

impl ReminderOverride {
    pub fn new(method: ReminderMethod, minutes: u32) -> Self {
        Self { method, minutes }
    }
}

/// The fixed, non-default reminder configuration used for every event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderProfile {
    pub overrides: Vec<ReminderOverride>,
}

impl ReminderProfile {
    /// Email one day ahead, popup one hour ahead.
    pub fn standard() -> Self {
        Self {
            overrides: vec![
                ReminderOverride::new(ReminderMethod::Email, 24 * 60),
                ReminderOverride::new(ReminderMethod::Popup, 60),
            ],
        }
    }
}

impl Default for ReminderProfile {
    fn default() -> Self {
        Self::standard()
    }
}
