//! Removing candidates that are already scheduled.

use contestcal_core::ContestRecord;
use tracing::info;

use crate::index::ExistingEventIndex;

/// Returns the candidates that are not yet on the calendar, in input order.
///
/// A candidate is dropped if its name or its URL is in `existing`. Later
/// candidates that repeat an earlier one in the same list are dropped too.
pub fn reconcile(
    candidates: Vec<ContestRecord>,
    existing: &ExistingEventIndex,
) -> Vec<ContestRecord> {
    let mut seen = ExistingEventIndex::default();
    let mut fresh = Vec::with_capacity(candidates.len());

    for record in candidates {
        let duplicate = existing.find(&record).or_else(|| seen.find(&record));
        if let Some(key) = duplicate {
            info!(
                matched_by = key.as_str(),
                "skipping duplicate contest: {} ({})",
                record.name(),
                record.url()
            );
            continue;
        }
        seen.insert(&record);
        fresh.push(record);
    }

    fresh
}
