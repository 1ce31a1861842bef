//! Errors that abort a sync run.

use contestcal_providers::ProviderError;
use thiserror::Error;

/// A failure that makes continuing unsafe.
///
/// Source and per-event failures are logged and counted in the
/// [`SyncReport`](crate::SyncReport) instead.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Existing events could not be listed, so duplicates cannot be detected.
    #[error("failed to list existing calendar events: {0}")]
    CalendarRead(#[source] ProviderError),
}

impl SyncError {
    /// True if the failure was caused by missing or rejected credentials.
    pub fn is_auth(&self) -> bool {
        match self {
            Self::CalendarRead(e) => e.code().is_auth(),
        }
    }
}
