//! Configuration commands.

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Prints the effective configuration with plain-text secrets masked.
pub fn dump(config: &ClientConfig) -> ClientResult<()> {
    let toml_str = toml::to_string_pretty(&config.redacted())
        .map_err(|e| ClientError::Config(format!("failed to serialize config: {}", e)))?;
    println!("# config.toml ({})", ClientConfig::default_path().display());
    println!("{}", toml_str);
    Ok(())
}

/// Checks that the configuration yields usable settings and credentials.
pub fn validate(config: &ClientConfig) -> ClientResult<()> {
    config.sync_settings(false)?;

    if !config.sources.atcoder.enabled && !config.sources.codeforces.enabled {
        println!("warning: no contest source is enabled");
    }

    config.google_config()?;
    println!("Google credentials are present.");
    println!("Configuration is valid.");
    Ok(())
}

pub fn path() -> ClientResult<()> {
    println!("config: {}", ClientConfig::default_path().display());
    Ok(())
}
