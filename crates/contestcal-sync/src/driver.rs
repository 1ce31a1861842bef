//! The sync run: fetch, aggregate, reconcile, create.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use contestcal_core::{ContestRecord, TimeWindow};
use contestcal_providers::CalendarService;
use contestcal_sources::ContestSource;
use tracing::{error, info, warn};

use crate::aggregate::aggregate;
use crate::error::SyncError;
use crate::event::build_event;
use crate::index::ExistingEventIndex;
use crate::reconcile::reconcile;
use crate::settings::SyncSettings;

/// Counts from one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Sources whose fetch failed and were treated as empty.
    pub failed_sources: usize,
    /// Records returned by all sources.
    pub fetched: usize,
    /// Records starting inside the window.
    pub in_window: usize,
    /// Windowed records skipped as already scheduled.
    pub duplicates: usize,
    /// Events created, or that would be created in a dry run.
    pub created: usize,
    /// Creation calls that failed.
    pub failed: usize,
    pub dry_run: bool,
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} fetched, {} in window, {} duplicate, {} {}, {} failed",
            self.fetched,
            self.in_window,
            self.duplicates,
            self.created,
            if self.dry_run { "to create" } else { "created" },
            self.failed
        )?;
        if self.failed_sources > 0 {
            write!(f, ", {} source(s) unavailable", self.failed_sources)?;
        }
        Ok(())
    }
}

/// Runs contest sources against one calendar.
pub struct SyncDriver {
    settings: SyncSettings,
    sources: Vec<Box<dyn ContestSource>>,
    calendar: Arc<dyn CalendarService>,
}

impl SyncDriver {
    pub fn new(settings: SyncSettings, calendar: Arc<dyn CalendarService>) -> Self {
        Self {
            settings,
            sources: Vec::new(),
            calendar,
        }
    }

    pub fn with_source(mut self, source: Box<dyn ContestSource>) -> Self {
        self.sources.push(source);
        self
    }

    pub fn settings(&self) -> &SyncSettings {
        &self.settings
    }

    /// Runs one sync with the window starting at `now`.
    ///
    /// Source failures and individual creation failures are logged and
    /// counted. Only a failure to list existing events aborts, since without
    /// it duplicates cannot be detected.
    pub async fn run(&self, now: DateTime<Utc>) -> Result<SyncReport, SyncError> {
        let window = TimeWindow::starting_at(now, self.settings.window_days);
        let mut report = SyncReport {
            dry_run: self.settings.dry_run,
            ..SyncReport::default()
        };

        let outputs = self.fetch_all(&mut report).await;
        let windowed = aggregate(outputs, &window);
        report.in_window = windowed.len();
        info!(
            in_window = report.in_window,
            "{} of {} contests start before {}",
            report.in_window,
            report.fetched,
            window.end.with_timezone(&self.settings.target_zone).format("%Y-%m-%d %H:%M %Z")
        );

        let existing = self
            .calendar
            .list_events(&self.settings.calendar_id, &window)
            .await
            .map_err(SyncError::CalendarRead)?;
        let index = ExistingEventIndex::from_events(&existing);
        info!(
            calendar = %self.settings.calendar_id,
            events = existing.len(),
            "indexed existing calendar events"
        );

        let to_create = reconcile(windowed, &index);
        report.duplicates = report.in_window - to_create.len();

        if to_create.is_empty() {
            info!("no new contests to add");
        }
        for record in &to_create {
            self.create(record, &mut report).await;
        }

        info!("sync finished: {}", report);
        Ok(report)
    }

    async fn fetch_all(&self, report: &mut SyncReport) -> Vec<Vec<ContestRecord>> {
        let mut outputs = Vec::with_capacity(self.sources.len());

        for source in &self.sources {
            match source.fetch().await {
                Ok(records) => {
                    info!(
                        source = source.name(),
                        count = records.len(),
                        "fetched upcoming contests"
                    );
                    report.fetched += records.len();
                    outputs.push(records);
                }
                Err(e) => {
                    error!(source = source.name(), error = %e, "failed to fetch contests");
                    report.failed_sources += 1;
                }
            }
        }

        outputs
    }

    async fn create(&self, record: &ContestRecord, report: &mut SyncReport) {
        let event = build_event(record, &self.settings);

        if self.settings.dry_run {
            info!(
                "would create event: {} at {}",
                record.name(),
                event.start.date_time.to_rfc3339()
            );
            report.created += 1;
            return;
        }

        match self
            .calendar
            .create_event(&self.settings.calendar_id, &event)
            .await
        {
            Ok(created) => {
                info!(
                    id = %created.id,
                    link = created.html_link.as_deref().unwrap_or(""),
                    "event created: {} at {}",
                    record.name(),
                    event.start.date_time.to_rfc3339()
                );
                report.created += 1;
            }
            Err(e) => {
                if e.code().is_auth() {
                    warn!("calendar rejected credentials while creating events");
                }
                error!(error = %e, "failed to create event: {}", record.name());
                report.failed += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use chrono::{Duration, TimeZone};
    use contestcal_core::BoxFuture;
    use contestcal_providers::{
        CreatedEvent, ExistingEvent, NewEvent, ProviderError, ProviderResult,
    };
    use contestcal_sources::{CodeforcesConfig, CodeforcesSource, SourceError, SourceResult};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap()
    }

    fn record(name: &str, url: &str, offset: Duration) -> ContestRecord {
        ContestRecord::new(
            name,
            (now() + offset).with_timezone(&chrono_tz::Asia::Tehran),
            120,
            url,
        )
        .unwrap()
    }

    struct FakeSource {
        name: &'static str,
        records: Option<Vec<ContestRecord>>,
    }

    impl ContestSource for FakeSource {
        fn name(&self) -> &str {
            self.name
        }

        fn fetch(&self) -> BoxFuture<'_, SourceResult<Vec<ContestRecord>>> {
            Box::pin(async move {
                self.records
                    .clone()
                    .ok_or_else(|| SourceError::network(self.name, "connection reset"))
            })
        }
    }

    fn source(name: &'static str, records: Vec<ContestRecord>) -> Box<dyn ContestSource> {
        Box::new(FakeSource {
            name,
            records: Some(records),
        })
    }

    fn broken_source(name: &'static str) -> Box<dyn ContestSource> {
        Box::new(FakeSource {
            name,
            records: None,
        })
    }

    #[derive(Default)]
    struct FakeCalendar {
        existing: Vec<ExistingEvent>,
        fail_list: bool,
        reject_titles: Vec<String>,
        created: Mutex<Vec<NewEvent>>,
        listed_windows: Mutex<Vec<TimeWindow>>,
    }

    impl FakeCalendar {
        fn created_titles(&self) -> Vec<String> {
            self.created
                .lock()
                .unwrap()
                .iter()
                .map(|e| e.summary.clone())
                .collect()
        }
    }

    impl CalendarService for FakeCalendar {
        fn name(&self) -> &str {
            "fake"
        }

        fn list_events<'a>(
            &'a self,
            _calendar_id: &'a str,
            window: &'a TimeWindow,
        ) -> BoxFuture<'a, ProviderResult<Vec<ExistingEvent>>> {
            Box::pin(async move {
                self.listed_windows.lock().unwrap().push(*window);
                if self.fail_list {
                    return Err(ProviderError::authentication("token revoked"));
                }
                Ok(self.existing.clone())
            })
        }

        fn create_event<'a>(
            &'a self,
            _calendar_id: &'a str,
            event: &'a NewEvent,
        ) -> BoxFuture<'a, ProviderResult<CreatedEvent>> {
            Box::pin(async move {
                if self.reject_titles.contains(&event.summary) {
                    return Err(ProviderError::invalid_response("HTTP 400: bad event"));
                }
                let mut created = self.created.lock().unwrap();
                created.push(event.clone());
                Ok(CreatedEvent {
                    id: format!("evt{}", created.len()),
                    html_link: None,
                })
            })
        }
    }

    #[tokio::test]
    async fn creates_new_in_window_contests() {
        let calendar = Arc::new(FakeCalendar {
            existing: vec![ExistingEvent::new("ABC 344")],
            ..FakeCalendar::default()
        });
        let driver = SyncDriver::new(SyncSettings::default(), calendar.clone())
            .with_source(source(
                "atcoder",
                vec![
                    record("ABC 344", "https://atcoder.jp/contests/abc344", Duration::days(1)),
                    record("ABC 345", "https://atcoder.jp/contests/abc345", Duration::days(6)),
                    record("ABC 346", "https://atcoder.jp/contests/abc346", Duration::days(13)),
                ],
            ))
            .with_source(source(
                "codeforces",
                vec![record(
                    "Round (Div. 2)",
                    "https://codeforces.com/contest/99",
                    Duration::hours(5),
                )],
            ));

        let report = driver.run(now()).await.unwrap();

        assert_eq!(calendar.created_titles(), vec!["ABC 345", "Round (Div. 2)"]);
        assert_eq!(
            report,
            SyncReport {
                failed_sources: 0,
                fetched: 4,
                in_window: 3,
                duplicates: 1,
                created: 2,
                failed: 0,
                dry_run: false,
            }
        );

        let windows = calendar.listed_windows.lock().unwrap();
        assert_eq!(windows[0], TimeWindow::starting_at(now(), 7));
    }

    #[tokio::test]
    async fn failed_source_does_not_stop_others() {
        let calendar = Arc::new(FakeCalendar::default());
        let driver = SyncDriver::new(SyncSettings::default(), calendar.clone())
            .with_source(broken_source("atcoder"))
            .with_source(source(
                "codeforces",
                vec![record("Round (Div. 3)", "https://codeforces.com/contest/7", Duration::days(2))],
            ));

        let report = driver.run(now()).await.unwrap();
        assert_eq!(report.failed_sources, 1);
        assert_eq!(calendar.created_titles(), vec!["Round (Div. 3)"]);
    }

    #[tokio::test]
    async fn calendar_read_failure_is_fatal() {
        let calendar = Arc::new(FakeCalendar {
            fail_list: true,
            ..FakeCalendar::default()
        });
        let driver = SyncDriver::new(SyncSettings::default(), calendar.clone()).with_source(
            source(
                "atcoder",
                vec![record("ABC 345", "https://atcoder.jp/contests/abc345", Duration::days(1))],
            ),
        );

        let err = driver.run(now()).await.unwrap_err();
        assert!(err.is_auth());
        assert!(calendar.created_titles().is_empty());
    }

    #[tokio::test]
    async fn creation_failure_continues() {
        let calendar = Arc::new(FakeCalendar {
            reject_titles: vec!["ABC 345".to_string()],
            ..FakeCalendar::default()
        });
        let driver = SyncDriver::new(SyncSettings::default(), calendar.clone()).with_source(
            source(
                "atcoder",
                vec![
                    record("ABC 345", "https://atcoder.jp/contests/abc345", Duration::days(1)),
                    record("ARC 170 (Div. 2)", "https://atcoder.jp/contests/arc170", Duration::days(2)),
                ],
            ),
        );

        let report = driver.run(now()).await.unwrap();
        assert_eq!(report.failed, 1);
        assert_eq!(report.created, 1);
        assert_eq!(calendar.created_titles(), vec!["ARC 170 (Div. 2)"]);
    }

    #[tokio::test]
    async fn dry_run_creates_nothing() {
        let calendar = Arc::new(FakeCalendar::default());
        let driver = SyncDriver::new(SyncSettings::default().with_dry_run(true), calendar.clone())
            .with_source(source(
                "atcoder",
                vec![record("ABC 345", "https://atcoder.jp/contests/abc345", Duration::days(1))],
            ));

        let report = driver.run(now()).await.unwrap();
        assert!(report.dry_run);
        assert_eq!(report.created, 1);
        assert!(calendar.created_titles().is_empty());
        assert!(report.to_string().contains("1 to create"));
    }

    #[tokio::test]
    async fn nothing_to_add() {
        let calendar = Arc::new(FakeCalendar::default());
        let driver = SyncDriver::new(SyncSettings::default(), calendar.clone());

        let report = driver.run(now()).await.unwrap();
        assert_eq!(report, SyncReport::default());
    }

    #[tokio::test]
    async fn codeforces_contest_end_to_end() {
        let t = (now() + Duration::days(2)).timestamp();
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/contest.list"))
            .respond_with(ResponseTemplate::new(200).set_body_string(format!(
                r#"{{"status":"OK","result":[
                    {{"id":99,"name":"Codeforces Round (Div. 2)","phase":"BEFORE","startTimeSeconds":{t},"durationSeconds":7200}},
                    {{"id":98,"name":"Codeforces Round (Div. 2)","phase":"CODING","startTimeSeconds":{t},"durationSeconds":7200}}
                ]}}"#
            )))
            .mount(&server)
            .await;

        let codeforces = CodeforcesSource::new(
            CodeforcesConfig::new(chrono_tz::Asia::Tehran)
                .with_api_url(format!("{}/api/contest.list?gym=false", server.uri())),
        )
        .unwrap();
        let calendar = Arc::new(FakeCalendar::default());
        let driver = SyncDriver::new(SyncSettings::default(), calendar.clone())
            .with_source(Box::new(codeforces));

        let report = driver.run(now()).await.unwrap();
        assert_eq!(report.created, 1);

        let created = calendar.created.lock().unwrap();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].summary, "Codeforces Round (Div. 2)");
        assert_eq!(created[0].location.as_deref(), Some("https://codeforces.com/contest/99"));
        assert_eq!(
            created[0].end.date_time - created[0].start.date_time,
            Duration::minutes(120)
        );
    }
}
