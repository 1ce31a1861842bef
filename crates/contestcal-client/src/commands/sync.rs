//! The `sync` command.

use std::sync::Arc;

use chrono::Utc;
use contestcal_providers::google::GoogleCalendar;
use contestcal_sources::{AtCoderSource, CodeforcesSource, ContestSource};
use contestcal_sync::SyncDriver;
use tracing::{info, warn};

use crate::config::ClientConfig;
use crate::error::ClientResult;

/// Fetches contests and adds the ones missing from the calendar.
///
/// Authentication happens before any source is queried, so a missing or
/// revoked token fails the run without partial work.
pub async fn run(config: &ClientConfig, dry_run: bool) -> ClientResult<()> {
    let settings = config.sync_settings(dry_run)?;
    let sources = build_sources(config, settings.target_zone)?;
    if sources.is_empty() {
        warn!("no contest source is enabled; nothing to sync");
        println!("No contest source is enabled in the configuration.");
        return Ok(());
    }

    let calendar = GoogleCalendar::new(config.google_config()?)?;
    calendar.ensure_authenticated().await?;

    info!(
        calendar = %settings.calendar_id,
        zone = %settings.target_zone.name(),
        days = settings.window_days,
        dry_run,
        "starting sync"
    );

    let driver = sources
        .into_iter()
        .fold(SyncDriver::new(settings, Arc::new(calendar)), |d, s| {
            d.with_source(s)
        });
    let report = driver.run(Utc::now()).await?;

    println!("{}", report);
    Ok(())
}

/// Builds the enabled sources in a fixed order: AtCoder, then Codeforces.
pub fn build_sources(
    config: &ClientConfig,
    zone: chrono_tz::Tz,
) -> ClientResult<Vec<Box<dyn ContestSource>>> {
    let mut sources: Vec<Box<dyn ContestSource>> = Vec::new();
    if let Some(atcoder) = config.atcoder_config(zone) {
        sources.push(Box::new(AtCoderSource::new(atcoder)?));
    }
    if let Some(codeforces) = config.codeforces_config(zone) {
        sources.push(Box::new(CodeforcesSource::new(codeforces)?));
    }
    Ok(sources)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sources_follow_config() {
        let mut config = ClientConfig::default();
        let names: Vec<String> = build_sources(&config, chrono_tz::UTC)
            .unwrap()
            .iter()
            .map(|s| s.name().to_string())
            .collect();
        assert_eq!(names, vec!["atcoder", "codeforces"]);

        config.sources.atcoder.enabled = false;
        let sources = build_sources(&config, chrono_tz::UTC).unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].name(), "codeforces");

        config.sources.codeforces.enabled = false;
        assert!(build_sources(&config, chrono_tz::UTC).unwrap().is_empty());
    }

    #[test]
    fn invalid_source_url_is_rejected() {
        let mut config = ClientConfig::default();
        config.sources.atcoder.base_url = "not a url".to_string();
        assert!(build_sources(&config, chrono_tz::UTC).is_err());
    }
}
