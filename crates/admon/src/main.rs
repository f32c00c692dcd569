mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // A broken config is reported by the command itself; here it only
    // loses its say over verbosity.
    let config_level = config::load(&cli.global).ok().map(|c| c.log_level);
    init_tracing(cli.global.verbose, cli.global.quiet, config_level);

    // Dispatch and handle errors with proper exit codes
    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

/// Filter directive for `-v` counts and configured console levels.
/// `RUST_LOG` overrides both.
fn filter_directive(verbosity: u8, quiet: bool, config_level: Option<u8>) -> &'static str {
    if quiet {
        return "error";
    }
    match (verbosity, config_level) {
        (0, Some(0 | 1)) => "error",
        (0, Some(3)) => "info",
        (0, Some(4)) => "debug",
        (0, Some(5..)) => "trace",
        (0, _) => "warn",
        (1, _) => "info",
        (2, _) => "debug",
        _ => "trace",
    }
}

fn init_tracing(verbosity: u8, quiet: bool, config_level: Option<u8>) {
    let filter = filter_directive(verbosity, quiet, config_level);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Offline commands never touch the daemon
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),
        Command::Convert(args) => commands::convert::handle(args, &cli.global),

        // Shell completions generation
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "admon", &mut std::io::stdout());
            Ok(())
        }

        // All other commands talk to the admon daemon
        cmd => {
            let admon_config = config::resolve(&cli.global)?;
            tracing::debug!(command = ?cmd, "dispatching command");
            commands::dispatch(cmd, &admon_config, &cli.global).await
        }
    }
}
