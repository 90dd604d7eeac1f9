//! Clap derive structures for the `ivtpump` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// ivtpump -- read and control an IVT / Bosch K30 heat pump
#[derive(Debug, Parser)]
#[command(
    name = "ivtpump",
    version,
    about = "Read and control IVT / Bosch heat pumps through the K30 cloud gateway",
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
    /// Device profile to use
    #[arg(long, short = 'p', env = "IVTPUMP_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "IVTPUMP_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'o', default_value = "table", global = true)]
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

impl GlobalOpts {
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(ivtpump_config::config_path)
    }
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StorageArg {
    /// Plaintext in the config file
    File,
    /// System keyring
    Keyring,
}

impl From<StorageArg> for ivtpump_config::TokenStorage {
    fn from(arg: StorageArg) -> Self {
        match arg {
            StorageArg::File => Self::File,
            StorageArg::Keyring => Self::Keyring,
        }
    }
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in with a SingleKey ID account
    Auth(AuthArgs),

    /// Check that the configured credential can reach the device
    Probe,

    /// Read one or more resource paths
    Get(GetArgs),

    /// Write a value to a resource path
    Set(SetArgs),

    /// Poll the device and print every reading
    Poll(PollArgs),

    /// Show device identity (model, firmware, serial)
    Info,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Auth ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub command: AuthCommand,
}

#[derive(Debug, Subcommand)]
pub enum AuthCommand {
    /// Print the browser login URL
    Url,

    /// Exchange the redirect URL from the browser for tokens and save them
    Exchange {
        /// The `com.bosch.tt.dashtt.pointt://app/login?code=...` URL
        callback_url: String,

        /// Gateway device id (printed on the K30 label)
        #[arg(long, short = 'd')]
        device: String,

        /// Where to keep the tokens
        #[arg(long, default_value = "file")]
        storage: StorageArg,
    },
}

// ── Values ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GetArgs {
    /// Resource paths, e.g. /heatingCircuits/hc1/roomtemperature
    #[arg(required = true)]
    pub paths: Vec<String>,
}

#[derive(Debug, Args)]
pub struct SetArgs {
    /// Resource path, e.g. /dhwCircuits/dhw1/operationMode
    pub path: String,

    /// Value; numbers and booleans are sent as JSON, anything else as a string
    pub value: String,
}

#[derive(Debug, Args)]
pub struct PollArgs {
    /// Run a single cycle and exit
    #[arg(long)]
    pub once: bool,

    /// Only print Fast-tier paths
    #[arg(long)]
    pub fast_only: bool,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
