//! Clap derive structures for the `admon` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

use admon_api::LogService;
use admon_core::NodeType;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// admon -- inspect a parallel file system cluster through its admon daemon
#[derive(Debug, Parser)]
#[command(
    name = "admon",
    version,
    about = "Inspect cluster nodes, groups and logs through the admon daemon",
    long_about = "Queries the HTTP interface of an admon daemon for the metadata and\n\
        storage servers of a cluster, their failover groups and their log files.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "ADMON_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Admon daemon host (overrides config)
    #[arg(long, short = 'H', global = true)]
    pub host: Option<String>,

    /// Admon daemon HTTP port (overrides config)
    #[arg(long, short = 'P', global = true)]
    pub port: Option<u16>,

    /// Request timeout in seconds (overrides config)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "ADMON_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Shared value enums ───────────────────────────────────────────────

/// Server role of a node.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum NodeTypeArg {
    /// Metadata server
    #[value(alias = "metadata")]
    Meta,
    /// Storage server
    Storage,
}

impl From<NodeTypeArg> for NodeType {
    fn from(arg: NodeTypeArg) -> Self {
        match arg {
            NodeTypeArg::Meta => NodeType::Metadata,
            NodeTypeArg::Storage => NodeType::Storage,
        }
    }
}

/// Daemon whose log file to fetch.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ServiceArg {
    Mgmtd,
    Meta,
    Storage,
    Admon,
    Client,
}

impl From<ServiceArg> for LogService {
    fn from(arg: ServiceArg) -> Self {
        match arg {
            ServiceArg::Mgmtd => LogService::Mgmtd,
            ServiceArg::Meta => LogService::Meta,
            ServiceArg::Storage => LogService::Storage,
            ServiceArg::Admon => LogService::Admon,
            ServiceArg::Client => LogService::Client,
        }
    }
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List and inspect metadata and storage nodes
    #[command(alias = "n")]
    Nodes(NodesArgs),

    /// List failover groups and their members
    #[command(alias = "g")]
    Groups(GroupsArgs),

    /// Poll the daemon continuously and print node changes
    #[command(alias = "w")]
    Watch(WatchArgs),

    /// Fetch the tail of a daemon's log file
    Log(LogArgs),

    /// Size and time unit conversions (offline)
    #[command(alias = "conv")]
    Convert(ConvertArgs),

    /// Manage the CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Nodes ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct NodesArgs {
    #[command(subcommand)]
    pub command: NodesCommand,
}

#[derive(Debug, Subcommand)]
pub enum NodesCommand {
    /// List nodes
    #[command(alias = "ls")]
    List {
        /// Only nodes of this role
        #[arg(long = "type", short = 't')]
        node_type: Option<NodeTypeArg>,

        /// Only nodes in this group
        #[arg(long, short = 'g')]
        group: Option<String>,
    },

    /// Show one node
    Get {
        /// Numeric ID, string ID, or "<id> [ID: <num>]"
        id: String,

        /// Role of the node
        #[arg(long = "type", short = 't')]
        node_type: NodeTypeArg,
    },
}

// ── Groups ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GroupsArgs {
    #[command(subcommand)]
    pub command: GroupsCommand,
}

#[derive(Debug, Subcommand)]
pub enum GroupsCommand {
    /// List groups with member counts
    #[command(alias = "ls")]
    List,

    /// Show the members of one group
    Show {
        /// Group name
        name: String,
    },
}

// ── Watch ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Poll interval, e.g. "4s" or "500ms" (overrides config)
    #[arg(long, short = 'i', value_parser = humantime::parse_duration)]
    pub interval: Option<Duration>,

    /// Exit after this many poll cycles
    #[arg(long, short = 'n')]
    pub cycles: Option<u64>,
}

// ── Log ──────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct LogArgs {
    /// Node as "<id> [ID: <num>]", or a string ID together with --num-id.
    /// May be omitted for the admon daemon's own log.
    pub node: Option<String>,

    /// Daemon whose log to fetch
    #[arg(long, short = 's')]
    pub service: ServiceArg,

    /// Numeric node ID when NODE is a plain string ID
    #[arg(long)]
    pub num_id: Option<u16>,

    /// Number of lines from the end of the log
    #[arg(long, short = 'l', default_value = "100")]
    pub lines: u32,
}

// ── Convert ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConvertArgs {
    #[command(subcommand)]
    pub command: ConvertCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConvertCommand {
    /// Express a byte count in the largest fitting size unit
    Bytes {
        /// Number of bytes
        #[arg(allow_hyphen_values = true)]
        bytes: i64,

        /// Force a unit instead (symbol or name, e.g. "MB" or "megabyte")
        #[arg(long, short = 'u')]
        unit: Option<String>,
    },

    /// Convert a size such as "500 MB" to bytes
    Size {
        /// "<value> <unit>"
        value: String,
    },

    /// Convert a time span such as "2 h" to whole minutes
    Minutes {
        /// "<value> <unit>"
        value: String,
    },

    /// Express a millisecond count in the largest fitting time unit
    Millis {
        #[arg(allow_hyphen_values = true)]
        millis: i64,
    },

    /// Subtract two sizes after aligning their units
    Subtract {
        /// Minuend, e.g. "2 GB"
        a: String,
        /// Subtrahend, e.g. "512 MB"
        b: String,
    },
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display the resolved configuration
    Show,

    /// Print the config file path
    Path,

    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long, short = 'f')]
        force: bool,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
