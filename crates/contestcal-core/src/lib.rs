//! Core types: contest records, time windows, zones, reminders, tracing

use std::future::Future;
use std::pin::Pin;

pub mod contest;
pub mod reminder;
pub mod time;
pub mod tracing;

pub use contest::{ContestError, ContestRecord, normalize_name};
pub use reminder::{ReminderMethod, ReminderOverride, ReminderProfile};
pub use time::{TimeWindow, from_epoch_seconds, parse_zone, to_zone};
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};

/// A boxed future for async trait methods.
///
/// Source adapters and calendar services are used as trait objects, so their
/// async methods return boxed futures to stay object-safe.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
