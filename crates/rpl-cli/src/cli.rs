use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "ridepool",
    about = "RidePool Ledger: carpool rides, seats, and applications on a transactional ledger",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Node configuration file (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Journal file for the ledger; omit for an in-memory ledger
    #[arg(short, long, global = true)]
    pub ledger: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Invoke a ledger operation
    Invoke(InvokeArgs),
    /// Read a record, or list keys with --list
    Query(QueryArgs),
    /// List the available operations
    Ops,
    /// Start the HTTP server
    Serve(ServeArgs),
    /// Print the effective configuration
    Config,
}

#[derive(Args)]
pub struct InvokeArgs {
    pub function: String,
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

#[derive(Args)]
pub struct QueryArgs {
    /// Record key, or key prefix with --list
    pub key: Option<String>,
    #[arg(long)]
    pub list: bool,
}

#[derive(Args)]
pub struct ServeArgs {
    /// Override the configured bind address
    #[arg(long)]
    pub bind: Option<SocketAddr>,
}
