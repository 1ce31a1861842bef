//! The `contestcal` command-line interface.
//!
//! Loads `config.toml`, builds the configured contest sources and the Google
//! calendar, and runs a sync.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod secret;

pub use cli::Cli;
pub use error::{ClientError, ClientResult};
