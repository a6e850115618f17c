pub mod config;
pub mod nodes;
pub mod prompt;
pub mod user;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use wio_domain::types::Board;

use crate::store::{FileConfigStore, CONFIG_PATH_ENV};

/// wio — a CLI for the Wio Link IoT platform.
#[derive(Debug, Parser)]
#[command(name = "wio", version, about)]
pub struct Cli {
    /// Config file (default is $HOME/.wio/config.json).
    #[arg(long, global = true, env = CONFIG_PATH_ENV)]
    pub config: Option<PathBuf>,

    /// Log level; `RUST_LOG` takes precedence when set.
    #[arg(short = 'l', long, global = true, value_enum, default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// `EnvFilter` directive for this level.
    pub fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Board type as typed on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BoardArg {
    /// Wio Node v1.0
    Node,
    /// Wio Link v1.0
    Link,
}

impl From<BoardArg> for Board {
    fn from(arg: BoardArg) -> Self {
        match arg {
            BoardArg::Node => Board::Node,
            BoardArg::Link => Board::Link,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage your wio user.
    #[command(subcommand)]
    User(UserCommand),
    /// Manage your wio nodes.
    #[command(subcommand)]
    Nodes(NodesCommand),
    /// Inspect the resolved configuration.
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// Create a new user.
    Create {
        /// Email address.
        #[arg(short, long)]
        email: Option<String>,
    },
    /// Login to the Wio server and store the returned token.
    #[command(visible_aliases = ["auth", "authenticate"])]
    Login {
        /// Email address.
        #[arg(short, long)]
        email: Option<String>,
    },
    /// Prompt for email, server address and server IP, then login.
    Configure,
}

#[derive(Debug, Subcommand)]
pub enum NodesCommand {
    /// Create a new node.
    Create {
        /// Name of the node.
        #[arg(short, long)]
        name: String,
        /// Board type.
        #[arg(long, value_enum)]
        board: BoardArg,
    },
    /// List all of your nodes.
    List,
    /// Delete a node.
    Delete {
        /// Serial number of the node.
        #[arg(short = 's', long = "sn")]
        serial: String,
    },
    /// Send WiFi and server settings to a node in AP mode.
    Register(RegisterArgs),
}

#[derive(Debug, Clone, Default, Args)]
pub struct RegisterArgs {
    /// Create a new node before registering it.
    #[arg(short, long)]
    pub create: bool,
    /// Serial number of the node (defaults to the last created node).
    #[arg(short = 's', long = "sn")]
    pub serial: Option<String>,
    /// Key of the node (defaults to the last created node).
    #[arg(short, long)]
    pub key: Option<String>,
    /// Name of the node, used with --create.
    #[arg(short, long)]
    pub name: Option<String>,
    /// Board type, used with --create.
    #[arg(long, value_enum)]
    pub board: Option<BoardArg>,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the resolved configuration with the token masked.
    Show,
    /// Check the configuration and report any problems.
    Validate,
}

// ── Config loading helper ─────────────────────────────────────────────

/// Open the config store named by `--config` / `WIO_CONFIG`, or the
/// default `~/.wio/config.json`, with environment overrides applied.
pub fn load_store(path: Option<PathBuf>) -> anyhow::Result<FileConfigStore> {
    let path = match path {
        Some(p) => p,
        None => FileConfigStore::default_path()?,
    };
    let store = FileConfigStore::load(&path)
        .map_err(|e| anyhow::anyhow!("loading {}: {e}", path.display()))?;
    Ok(store.with_env_overrides())
}
