//! Google Calendar service.
//!
//! # Authorization
//!
//! The user supplies their own OAuth client (Google requires a registered
//! application). On first use:
//!
//! 1. A listener is bound on a free `127.0.0.1` port
//! 2. The browser opens Google's consent page with a PKCE challenge
//! 3. Google redirects back with an authorization code
//! 4. The code is exchanged for access and refresh tokens, which are
//!    persisted with owner-only permissions
//!
//! Later runs reuse the stored tokens and refresh the access token when it
//! expires.
//!
//! ```ignore
//! use contestcal_providers::google::{GoogleCalendar, GoogleConfig, OAuthCredentials};
//!
//! let credentials = OAuthCredentials::from_file("client_secret.json")?;
//! let calendar = GoogleCalendar::new(GoogleConfig::new(credentials))?;
//! let events = calendar.list_events("primary", &window).await?;
//! ```

mod calendar;
mod client;
mod config;
mod oauth;
mod tokens;

pub use calendar::GoogleCalendar;
pub use client::GoogleCalendarClient;
pub use config::{GoogleConfig, OAuthCredentials};
pub use oauth::{OAuthClient, PkceFlow};
pub use tokens::{TokenInfo, TokenStorage};
