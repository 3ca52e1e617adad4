mod cli;
mod commands;
mod config;
mod error;
mod output;
mod store;

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use netbind_core::{Collaborators, LoggingNotifier, Orchestrator, SessionProvider};

use crate::cli::{Cli, Command};
use crate::error::CliError;
use crate::store::FileInstanceStore;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "netbind", &mut std::io::stdout());
            Ok(())
        }

        cmd => {
            let orchestrator = build_orchestrator(&cli.global)?;
            tracing::debug!(command = ?cmd, "dispatching command");
            commands::dispatch(cmd, &orchestrator, &cli.global).await
        }
    }
}

/// Wire the orchestrator from config, profile, and CLI overrides.
fn build_orchestrator(global: &cli::GlobalOpts) -> Result<Orchestrator, CliError> {
    let cfg = config::load_config_or_default();
    let resolved = config::resolve(global, &cfg)?;

    let cache_dir = global.cache_dir.clone().unwrap_or_else(config::cache_dir);
    let collaborators = Collaborators {
        clients: Arc::new(SessionProvider::new(resolved.service)?),
        store: Arc::new(FileInstanceStore::new(cache_dir)),
        notifier: Arc::new(LoggingNotifier),
    };
    Ok(Orchestrator::new(resolved.orchestrator, collaborators))
}
