//! printdesk CLI: the `printdesk` command.

mod cli;
mod commands;
mod config;
mod support;

use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use std::path::Path;
use support::Context;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    let cli = Cli::parse();
    let config = Config::load(Path::new(&cli.global.config))
        .unwrap_or_else(|e| support::fail(e, false));
    init_logging(&config);

    let ctx = Context::resolve_or_exit(&cli.global, &config);
    tracing::debug!(
        ledger = %ctx.ledger.display(),
        user = %ctx.principal.name,
        "printdesk invocation"
    );

    match cli.command {
        Commands::Docket { command } => commands::docket::run(&ctx, command),
        Commands::Job { command } => commands::job::run(&ctx, command),
        Commands::Catalog { command } => commands::catalog::run(&ctx, command),
    }
}

/// `PRINTDESK_LOG` wins over `log.filter`; logs go to stderr.
fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_env("PRINTDESK_LOG")
        .or_else(|_| EnvFilter::try_new(&config.log.filter))
        .unwrap_or_else(|_| EnvFilter::new(config::DEFAULT_LOG_FILTER));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
