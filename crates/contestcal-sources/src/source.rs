//! The ContestSource trait.

use contestcal_core::{BoxFuture, ContestRecord};

use crate::error::SourceResult;

/// A listing of upcoming contests.
///
/// Implementations fetch their listing once per call and return the records
/// that pass their inclusion rules, in listing order. Malformed entries are
/// skipped with a warning; only failures that lose the whole listing are
/// reported as errors.
pub trait ContestSource: Send + Sync {
    /// Returns the short name of this source (e.g., "atcoder").
    fn name(&self) -> &str;

    /// Fetches and normalizes the upcoming contests.
    fn fetch(&self) -> BoxFuture<'_, SourceResult<Vec<ContestRecord>>>;
}
