//! [`CalendarService`] backed by Google Calendar.

use contestcal_core::{BoxFuture, TimeWindow};
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, info, warn};

use crate::error::{ProviderError, ProviderResult};
use crate::service::{CalendarService, CreatedEvent, ExistingEvent, NewEvent};

use super::client::GoogleCalendarClient;
use super::config::GoogleConfig;
use super::oauth::OAuthClient;
use super::tokens::TokenStorage;

const SERVICE_NAME: &str = "google";

/// Google Calendar with persisted OAuth tokens.
///
/// Tokens are loaded from disk on construction. Before each API call the
/// access token is refreshed if expired; if there is no usable token at all
/// the browser consent flow runs, unless the config disables it.
pub struct GoogleCalendar {
    config: GoogleConfig,
    tokens: TokenStorage,
    oauth: OAuthClient,
    client: GoogleCalendarClient,
    /// Serializes refreshes so one expired token triggers one request.
    auth_lock: AsyncMutex<()>,
}

impl GoogleCalendar {
    pub fn new(config: GoogleConfig) -> ProviderResult<Self> {
        config
            .validate()
            .map_err(|e| e.with_provider(SERVICE_NAME))?;

        let tokens = TokenStorage::new(&config.token_path);
        if let Err(e) = tokens.load() {
            warn!("ignoring unreadable token file: {}", e);
        }
        let oauth = OAuthClient::new(&config)?;
        let client = GoogleCalendarClient::new(&config.api_base_url, config.timeout)?;

        Ok(Self {
            config,
            tokens,
            oauth,
            client,
            auth_lock: AsyncMutex::new(()),
        })
    }

    /// Runs the browser consent flow and stores the resulting tokens,
    /// replacing any existing ones.
    pub async fn authenticate(&self) -> ProviderResult<()> {
        let _guard = self.auth_lock.lock().await;
        self.authorize_interactively().await
    }

    /// True if no token is stored or the stored one lacks the calendar scope.
    pub fn needs_reauth(&self) -> bool {
        self.tokens.needs_reauth(&self.config.scopes)
    }

    pub fn token_path(&self) -> &std::path::Path {
        self.tokens.path()
    }

    async fn authorize_interactively(&self) -> ProviderResult<()> {
        info!("starting Google authorization");
        let tokens = self
            .oauth
            .authorize(
                &self.config.scopes,
                self.config.loopback_port_range,
                self.config.callback_timeout,
            )
            .await?;
        self.tokens.set(tokens)?;
        info!("Google authorization stored at {}", self.tokens.path().display());
        Ok(())
    }

    /// Makes sure a non-expired access token with the calendar scope is
    /// stored.
    ///
    /// Authorizes in the browser when no usable token exists, and refreshes an
    /// expired one. A rejected refresh falls back to the browser flow. Both
    /// fallbacks fail instead when the config is not interactive.
    pub async fn ensure_authenticated(&self) -> ProviderResult<()> {
        let _guard = self.auth_lock.lock().await;
        self.ensure_authenticated_locked().await
    }

    async fn ensure_authenticated_locked(&self) -> ProviderResult<()> {
        if self.needs_reauth() {
            if !self.config.interactive {
                return Err(ProviderError::authentication(
                    "not authorized; run 'contestcal auth google'",
                )
                .with_provider(SERVICE_NAME));
            }
            return self.authorize_interactively().await;
        }

        let Some(tokens) = self.tokens.get().filter(|t| t.is_expired()) else {
            return Ok(());
        };

        debug!("access token expired, refreshing");
        match self.oauth.refresh_token(tokens).await {
            Ok(refreshed) => self.tokens.set(refreshed),
            Err(e) if self.config.interactive => {
                warn!("token refresh failed, re-authorizing: {}", e);
                self.authorize_interactively().await
            }
            Err(e) => Err(e.with_provider(SERVICE_NAME)),
        }
    }

    async fn access_token(&self) -> ProviderResult<String> {
        let _guard = self.auth_lock.lock().await;
        self.ensure_authenticated_locked().await?;
        self.tokens
            .get()
            .map(|t| t.access_token)
            .ok_or_else(|| ProviderError::internal("no token stored after authorization"))
    }

    async fn list_events_impl(
        &self,
        calendar_id: &str,
        window: &TimeWindow,
    ) -> ProviderResult<Vec<ExistingEvent>> {
        let token = self.access_token().await?;
        self.client
            .list_events(&token, calendar_id, window)
            .await
            .map_err(|e| e.with_provider(SERVICE_NAME))
    }

    async fn create_event_impl(
        &self,
        calendar_id: &str,
        event: &NewEvent,
    ) -> ProviderResult<CreatedEvent> {
        let token = self.access_token().await?;
        self.client
            .insert_event(&token, calendar_id, event)
            .await
            .map_err(|e| e.with_provider(SERVICE_NAME))
    }
}

impl CalendarService for GoogleCalendar {
    fn name(&self) -> &str {
        SERVICE_NAME
    }

    fn list_events<'a>(
        &'a self,
        calendar_id: &'a str,
        window: &'a TimeWindow,
    ) -> BoxFuture<'a, ProviderResult<Vec<ExistingEvent>>> {
        Box::pin(self.list_events_impl(calendar_id, window))
    }

    fn create_event<'a>(
        &'a self,
        calendar_id: &'a str,
        event: &'a NewEvent,
    ) -> BoxFuture<'a, ProviderResult<CreatedEvent>> {
        Box::pin(self.create_event_impl(calendar_id, event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderErrorCode;
    use crate::google::{OAuthCredentials, TokenInfo};
    use chrono::{TimeZone, Utc};
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(dir: &tempfile::TempDir, server: &MockServer) -> GoogleConfig {
        GoogleConfig::new(OAuthCredentials::new("id", "secret"))
            .with_token_path(dir.path().join("token.json"))
            .with_api_base_url(server.uri())
            .with_token_url(format!("{}/token", server.uri()))
            .with_interactive(false)
    }

    fn window() -> TimeWindow {
        TimeWindow::starting_at(Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap(), 7)
    }

    fn store(config: &GoogleConfig, tokens: TokenInfo) {
        TokenStorage::new(&config.token_path).set(tokens).unwrap();
    }

    #[tokio::test]
    async fn missing_token_fails_when_not_interactive() {
        let dir = tempfile::tempdir().unwrap();
        let server = MockServer::start().await;
        let calendar = GoogleCalendar::new(config(&dir, &server)).unwrap();

        assert!(calendar.needs_reauth());
        let err = calendar.list_events("primary", &window()).await.unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::AuthenticationFailed);
        assert!(err.to_string().starts_with("[google]"));
    }

    #[tokio::test]
    async fn valid_token_is_used_directly() {
        let dir = tempfile::tempdir().unwrap();
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/calendars/primary/events"))
            .and(header("authorization", "Bearer live"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"items":[]}"#))
            .expect(1)
            .mount(&server)
            .await;

        let config = config(&dir, &server);
        store(
            &config,
            TokenInfo::new("live", Some("r".to_string()), Some(3600), config.scopes.clone()),
        );

        let calendar = GoogleCalendar::new(config).unwrap();
        assert!(!calendar.needs_reauth());
        assert!(calendar.list_events("primary", &window()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn expired_token_is_refreshed_and_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"access_token":"renewed","expires_in":3600}"#,
            ))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/calendars/primary/events"))
            .and(header("authorization", "Bearer renewed"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(r#"{"items":[{"summary":"ABC"}]}"#),
            )
            .mount(&server)
            .await;

        let config = config(&dir, &server);
        store(
            &config,
            TokenInfo::new("stale", Some("r".to_string()), Some(0), config.scopes.clone()),
        );
        let token_path = config.token_path.clone();

        let calendar = GoogleCalendar::new(config).unwrap();
        let events = calendar.list_events("primary", &window()).await.unwrap();
        assert_eq!(events[0].title, "ABC");

        let saved = TokenStorage::new(token_path);
        saved.load().unwrap();
        assert_eq!(saved.get().unwrap().access_token, "renewed");
    }

    #[tokio::test]
    async fn wrong_scope_needs_reauth() {
        let dir = tempfile::tempdir().unwrap();
        let server = MockServer::start().await;
        let config = config(&dir, &server);
        store(
            &config,
            TokenInfo::new(
                "ro",
                None,
                None,
                vec!["https://www.googleapis.com/auth/calendar.readonly".to_string()],
            ),
        );

        let calendar = GoogleCalendar::new(config).unwrap();
        assert!(calendar.needs_reauth());
        assert!(calendar.list_events("primary", &window()).await.is_err());
    }
}
