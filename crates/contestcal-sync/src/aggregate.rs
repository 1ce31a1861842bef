//! Merging source outputs and windowing them by start time.

use contestcal_core::{ContestRecord, TimeWindow};
use tracing::debug;

/// Concatenates source outputs in order and keeps the records whose start
/// falls inside `window`, bounds included.
///
/// Records are not re-filtered by name here; each source already applied its
/// own inclusion rules.
pub fn aggregate(outputs: Vec<Vec<ContestRecord>>, window: &TimeWindow) -> Vec<ContestRecord> {
    outputs
        .into_iter()
        .flatten()
        .filter(|record| {
            let keep = window.contains(&record.start_time());
            if !keep {
                debug!(
                    "outside sync window: {} at {}",
                    record.name(),
                    record.start_utc().to_rfc3339()
                );
            }
            keep
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap()
    }

    fn record(name: &str, start: DateTime<Utc>) -> ContestRecord {
        ContestRecord::new(
            name,
            start.with_timezone(&chrono_tz::Asia::Tehran),
            100,
            &format!("https://example.com/{}", name.replace(' ', "-")),
        )
        .unwrap()
    }

    #[test]
    fn window_is_inclusive() {
        let window = TimeWindow::starting_at(now(), 7);
        let outputs = vec![
            vec![
                record("at now", now()),
                record("before", now() - Duration::seconds(1)),
            ],
            vec![
                record("at end", now() + Duration::days(7)),
                record("after", now() + Duration::days(7) + Duration::seconds(1)),
            ],
        ];

        let names: Vec<String> = aggregate(outputs, &window)
            .iter()
            .map(|r| r.name().to_string())
            .collect();
        assert_eq!(names, vec!["at now", "at end"]);
    }

    #[test]
    fn preserves_source_order() {
        let window = TimeWindow::starting_at(now(), 7);
        let outputs = vec![
            vec![record("b", now() + Duration::days(3))],
            vec![],
            vec![
                record("a", now() + Duration::days(1)),
                record("c", now() + Duration::days(2)),
            ],
        ];

        let names: Vec<String> = aggregate(outputs, &window)
            .iter()
            .map(|r| r.name().to_string())
            .collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }

    #[test]
    fn empty_outputs() {
        let window = TimeWindow::starting_at(now(), 7);
        assert!(aggregate(Vec::new(), &window).is_empty());
    }
}
