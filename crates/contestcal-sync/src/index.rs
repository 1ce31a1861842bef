//! Index of contests already on the calendar.

use std::collections::HashSet;

use contestcal_core::ContestRecord;
use contestcal_providers::ExistingEvent;

/// Description prefix that introduces a contest's URL.
///
/// Events created by [`build_event`](crate::build_event) carry
/// `"Contest URL: <url>"`, and later runs read it back here.
pub const URL_SENTINEL: &str = "Contest URL: ";

/// Which key identified a candidate as already scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateKey {
    Name,
    Url,
}

impl DuplicateKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Url => "url",
        }
    }
}

/// Titles and contest URLs of the events in the sync window.
///
/// Built once per run and only used for membership tests.
#[derive(Debug, Clone, Default)]
pub struct ExistingEventIndex {
    names: HashSet<String>,
    urls: HashSet<String>,
}

impl ExistingEventIndex {
    pub fn from_events(events: &[ExistingEvent]) -> Self {
        let mut index = Self::default();
        for event in events {
            if !event.title.is_empty() {
                index.names.insert(event.title.clone());
            }
            if let Some(url) = extract_sentinel_url(&event.description) {
                index.urls.insert(url.to_string());
            }
            if let Some(url) = event.contest_url.as_deref().map(str::trim)
                && !url.is_empty()
            {
                index.urls.insert(url.to_string());
            }
        }
        index
    }

    /// Returns the key under which `record` is already present, if any.
    ///
    /// The name is checked first; either key alone is enough.
    pub fn find(&self, record: &ContestRecord) -> Option<DuplicateKey> {
        if self.names.contains(record.name()) {
            Some(DuplicateKey::Name)
        } else if self.urls.contains(record.url()) {
            Some(DuplicateKey::Url)
        } else {
            None
        }
    }

    pub fn contains(&self, record: &ContestRecord) -> bool {
        self.find(record).is_some()
    }

    /// Adds a record's keys.
    pub fn insert(&mut self, record: &ContestRecord) {
        self.names.insert(record.name().to_string());
        self.urls.insert(record.url().to_string());
    }

    pub fn name_count(&self) -> usize {
        self.names.len()
    }

    pub fn url_count(&self) -> usize {
        self.urls.len()
    }
}

/// Returns the URL following the last [`URL_SENTINEL`] in a description.
///
/// The URL ends at the first whitespace, so anything appended after it on the
/// same line (`"Contest URL: <url> (moved)"`) is ignored rather than kept as
/// part of the key. Descriptions without the sentinel, or with nothing after
/// it, yield `None`.
pub fn extract_sentinel_url(description: &str) -> Option<&str> {
    let (_, rest) = description.rsplit_once(URL_SENTINEL)?;
    rest.split_whitespace().next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(name: &str, url: &str) -> ContestRecord {
        let start = chrono_tz::Asia::Tehran
            .with_ymd_and_hms(2024, 3, 16, 15, 30, 0)
            .unwrap();
        ContestRecord::new(name, start, 100, url).unwrap()
    }

    #[test]
    fn sentinel_extraction() {
        assert_eq!(
            extract_sentinel_url("Contest URL: https://atcoder.jp/contests/abc345"),
            Some("https://atcoder.jp/contests/abc345")
        );
        assert_eq!(
            extract_sentinel_url("notes\nContest URL:   https://codeforces.com/contest/99  \nmore"),
            Some("https://codeforces.com/contest/99")
        );
        assert_eq!(
            extract_sentinel_url("Contest URL: old\nContest URL: https://new.example/1"),
            Some("https://new.example/1")
        );
        assert_eq!(
            extract_sentinel_url("Contest URL: https://codeforces.com/contest/99 (moved)"),
            Some("https://codeforces.com/contest/99")
        );
        assert_eq!(extract_sentinel_url("Contest URL:"), None);
        assert_eq!(extract_sentinel_url("Contest URL:   "), None);
        assert_eq!(extract_sentinel_url("no link here"), None);
        assert_eq!(extract_sentinel_url(""), None);
    }

    #[test]
    fn name_match_excludes_even_with_other_url() {
        let index = ExistingEventIndex::from_events(&[ExistingEvent::new(
            "AtCoder Beginner Contest 345",
        )
        .with_description("Contest URL: https://atcoder.jp/contests/other")]);

        let candidate = record(
            "AtCoder Beginner Contest 345",
            "https://atcoder.jp/contests/abc345",
        );
        assert_eq!(index.find(&candidate), Some(DuplicateKey::Name));
    }

    #[test]
    fn url_match_excludes_even_with_other_name() {
        let index = ExistingEventIndex::from_events(&[ExistingEvent::new("Renamed by hand")
            .with_description("Contest URL: https://codeforces.com/contest/99")]);

        let candidate = record("Codeforces Round (Div. 2)", "https://codeforces.com/contest/99");
        assert_eq!(index.find(&candidate), Some(DuplicateKey::Url));
    }

    #[test]
    fn structured_url_is_indexed() {
        let index = ExistingEventIndex::from_events(&[ExistingEvent::new("Renamed")
            .with_contest_url("https://codeforces.com/contest/100")]);

        assert!(index.contains(&record("Whatever", "https://codeforces.com/contest/100")));
        assert_eq!(index.url_count(), 1);
    }

    #[test]
    fn missing_description_is_fine() {
        let index = ExistingEventIndex::from_events(&[ExistingEvent::new("Team sync")]);
        assert_eq!(index.name_count(), 1);
        assert_eq!(index.url_count(), 0);
        assert!(!index.contains(&record("ABC 1", "https://atcoder.jp/contests/abc001")));
    }

    #[test]
    fn exact_name_only() {
        let index = ExistingEventIndex::from_events(&[ExistingEvent::new(
            "AtCoder Beginner Contest 345",
        )]);
        assert!(!index.contains(&record(
            "atcoder beginner contest 345",
            "https://atcoder.jp/contests/abc345"
        )));
    }

    #[test]
    fn insert_adds_both_keys() {
        let mut index = ExistingEventIndex::default();
        let abc = record("ABC 345", "https://atcoder.jp/contests/abc345");
        index.insert(&abc);
        assert!(index.contains(&record("Other", "https://atcoder.jp/contests/abc345")));
        assert!(index.contains(&record("ABC 345", "https://atcoder.jp/contests/x")));
    }
}
