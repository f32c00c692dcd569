//! Command dispatch: bridges CLI args -> core registry/poller -> output formatting.

pub mod config_cmd;
pub mod convert;
pub mod groups;
pub mod log;
pub mod nodes;
pub mod util;
pub mod watch;

use admon_core::AdmonConfig;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a daemon-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    config: &AdmonConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Nodes(args) => nodes::handle(config, args, global).await,
        Command::Groups(args) => groups::handle(config, args, global).await,
        Command::Watch(args) => watch::handle(config, args, global).await,
        Command::Log(args) => log::handle(config, args, global).await,
        // Offline commands are handled before dispatch
        Command::Config(_) | Command::Convert(_) | Command::Completions(_) => {
            Err(CliError::Internal("offline command reached daemon dispatch".into()))
        }
    }
}
