//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// contestcal - AtCoder and Codeforces contests on your Google Calendar
#[derive(Debug, Parser)]
#[command(name = "contestcal")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "CONTESTCAL_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v', global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands. Without one, `sync` runs.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch upcoming contests and add the missing ones to the calendar
    Sync {
        /// Report what would be created without writing to the calendar
        #[arg(long, short = 'n')]
        dry_run: bool,
    },

    /// Authentication commands
    Auth {
        #[command(subcommand)]
        provider: AuthProvider,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Authentication providers.
#[derive(Debug, Subcommand)]
pub enum AuthProvider {
    /// Authenticate with Google Calendar
    Google {
        /// Force re-authentication even if a valid token is stored
        #[arg(long, short)]
        force: bool,
    },
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump the effective configuration
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration file path
    Path,
}
