//! contestcal CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use contestcal_core::{TracingConfig, init_tracing};

use contestcal_client::cli::{AuthProvider, Cli, Command, ConfigAction};
use contestcal_client::commands;
use contestcal_client::config::ClientConfig;
use contestcal_client::error::ClientResult;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let tracing_config = if cli.debug {
        TracingConfig::cli_debug()
    } else {
        TracingConfig::cli()
    };
    if let Err(e) = init_tracing(tracing_config) {
        eprintln!("warning: {}", e);
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            if e.is_auth() {
                eprintln!("hint: run 'contestcal auth google' to authorize calendar access");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ClientResult<()> {
    let config = match cli.config {
        Some(ref path) => ClientConfig::load_from(path)?,
        None => ClientConfig::load()?,
    };

    match cli.command {
        None => commands::sync::run(&config, false).await,
        Some(Command::Sync { dry_run }) => commands::sync::run(&config, dry_run).await,
        Some(Command::Auth { provider }) => match provider {
            AuthProvider::Google { force } => commands::auth::google(&config, force).await,
        },
        Some(Command::Config { action }) => match action {
            ConfigAction::Dump => commands::config::dump(&config),
            ConfigAction::Validate => commands::config::validate(&config),
            ConfigAction::Path => commands::config::path(),
        },
    }
}
