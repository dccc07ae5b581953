//! Graft CLI - Import another repository's history into a subdirectory.

use clap::Parser;
use tracing::Level;

mod commands;
mod output;
mod services;

use commands::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    output::set_quiet(cli.quiet);
    init_tracing(cli.verbose);

    let result = match &cli.command {
        Commands::Import(args) => commands::import::run(args, cli.project.as_deref()),
        Commands::Completions { shell } => commands::completions::run(*shell),
    };

    if let Err(e) = result {
        output::error(&error_message(&e));
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Prefix errors the user can act on with their short code.
fn error_message(err: &anyhow::Error) -> String {
    let kind = err
        .downcast_ref::<graft_core::Error>()
        .and_then(graft_core::Error::kind);

    match kind {
        Some(kind) => format!("{kind} {err:#}"),
        None => format!("{err:#}"),
    }
}
