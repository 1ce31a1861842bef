//! Calendar service abstraction and implementations.
//!
//! The sync core only needs two calls from a calendar:
//!
//! - [`CalendarService::list_events`] - events starting inside a window, used
//!   to build the duplicate index
//! - [`CalendarService::create_event`] - insert one contest event
//!
//! ```text
//! ┌──────────────────────┐
//! │ Google Calendar API  │
//! └──────────┬───────────┘
//!            │ REST + OAuth 2.0
//!            ▼
//! ┌──────────────────────┐
//! │   GoogleCalendar     │
//! └──────────┬───────────┘
//!            │ CalendarService
//!            ▼
//!   ExistingEvent / NewEvent
//! ```

pub mod error;
#[cfg(feature = "google")]
pub mod google;
pub mod service;

pub use error::{ProviderError, ProviderErrorCode, ProviderResult};
pub use service::{
    Attendee, CONTEST_URL_PROPERTY, CalendarService, CreatedEvent, EventDateTime, ExistingEvent,
    ExtendedProperties, NewEvent, Reminders,
};
