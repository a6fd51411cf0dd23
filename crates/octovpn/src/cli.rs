//! Clap derive structures for the `octovpn` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use strum::IntoEnumIterator;

use octovpn_core::Protocol;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// octovpn -- headless client for the OctoVPN control plane
#[derive(Debug, Parser)]
#[command(
    name = "octovpn",
    version,
    about = "OctoVPN client: log in, browse locations and fetch tunnel profiles",
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
    /// Settings file (defaults to the platform config dir)
    #[arg(long, env = "OCTOVPN_SETTINGS", global = true)]
    pub settings: Option<PathBuf>,

    /// Data directory holding config.json, profiles and logs
    #[arg(long, env = "OCTOVPN_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Control-plane base URL (overrides settings)
    #[arg(long, env = "OCTOVPN_API_URL", global = true)]
    pub api_url: Option<String>,

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

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept invalid TLS certificates
    #[arg(long, short = 'k', global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides settings)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,
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

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in and optionally remember the credentials
    Login(LoginArgs),

    /// Invalidate the session token on the server
    Logout,

    /// Show the logged-in account
    Account,

    /// List VPN locations
    #[command(alias = "loc", alias = "ls")]
    Locations(LocationsArgs),

    /// Fetch the tunnel profile for a location
    TunnelConfig(TunnelConfigArgs),

    /// Inspect and edit the saved user config
    Config(ConfigArgs),

    /// Run a headless session until Ctrl-C, logging every state change
    Run,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Account username (prompted when omitted)
    #[arg(long, short = 'u', env = "OCTOVPN_USERNAME")]
    pub username: Option<String>,

    /// Read the password from stdin instead of prompting
    #[arg(long)]
    pub password_stdin: bool,

    /// Do not save the credentials for automatic login
    #[arg(long)]
    pub no_remember: bool,
}

#[derive(Debug, Args)]
pub struct LocationsArgs {
    /// Only locations in this ISO country code
    #[arg(long, short = 'c')]
    pub country: Option<String>,

    /// Case-insensitive text search over name, city and country
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Only WireGuard-capable locations
    #[arg(long)]
    pub wireguard: bool,

    /// Only online locations
    #[arg(long)]
    pub online: bool,

    /// Group the table by country
    #[arg(long)]
    pub group: bool,
}

#[derive(Debug, Args)]
pub struct TunnelConfigArgs {
    /// Location id, name or country code
    pub location: String,

    /// Write the profile to this file instead of stdout
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the saved config (password redacted)
    Show,

    /// Print the config.json and settings paths
    Path,

    /// Choose the tunnel protocol
    SetProtocol {
        #[arg(value_parser = parse_protocol)]
        protocol: Protocol,
    },

    /// Set the UI theme name
    SetTheme { theme: String },

    /// Remove the saved credentials
    Forget,
}

fn parse_protocol(raw: &str) -> Result<Protocol, String> {
    raw.parse::<Protocol>().map_err(|_| {
        let known: Vec<&str> = Protocol::iter().map(Protocol::dir_name).collect();
        format!("expected one of: {}", known.join(", "))
    })
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell
    pub shell: Shell,
}
