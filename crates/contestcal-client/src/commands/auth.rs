//! Authentication commands.

use contestcal_providers::google::GoogleCalendar;
use tracing::info;

use crate::config::ClientConfig;
use crate::error::ClientResult;

/// Runs the Google consent flow.
///
/// Without `force`, a stored token is reused and only refreshed if expired.
pub async fn google(config: &ClientConfig, force: bool) -> ClientResult<()> {
    let calendar = GoogleCalendar::new(config.google_config()?)?;

    if !force && !calendar.needs_reauth() {
        calendar.ensure_authenticated().await?;
        println!("Already authenticated with Google Calendar.");
        println!("Use --force to re-authenticate.");
        return Ok(());
    }

    println!("Starting Google Calendar authentication...");
    println!();
    println!("A browser window will open for you to authorize access.");
    println!("If the browser doesn't open, copy the URL printed below.");
    println!();

    calendar.authenticate().await?;

    info!("Google authentication successful");
    println!();
    println!("Authentication successful!");
    println!("Tokens saved to {}", calendar.token_path().display());
    Ok(())
}
