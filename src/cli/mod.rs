//! CLI argument parsing
//!
//! Defines command-line interface using clap.

use clap::{Parser, Subcommand};

/// Inspect test run property contexts
#[derive(Parser, Debug)]
#[command(name = "testrun-ctx")]
#[command(version)]
#[command(about = "Load, resolve and query test run property snapshots")]
#[command(long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (defaults to the standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print one property by name or dotted path
    Lookup(LookupArgs),

    /// Print every property of a snapshot
    Show(ShowArgs),

    /// Resolve references and write the result
    Resolve(ResolveArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

/// Arguments for lookup command
#[derive(Parser, Debug)]
pub struct LookupArgs {
    /// Snapshot file (YAML or JSON)
    #[arg(short, long)]
    pub file: String,

    /// Property name or dotted path, e.g. server.port
    #[arg(short, long)]
    pub path: String,

    /// Resolve references in all property lists first
    #[arg(short, long)]
    pub resolve: bool,

    /// Output format (table, json, json-pretty); falls back to TESTRUN_CTX_FORMAT
    #[arg(long)]
    pub format: Option<String>,
}

/// Arguments for show command
#[derive(Parser, Debug)]
pub struct ShowArgs {
    /// Snapshot file (YAML or JSON)
    #[arg(short, long)]
    pub file: String,

    /// Include the configured global properties
    #[arg(short, long)]
    pub globals: bool,

    /// Output format (table, json, json-pretty); falls back to TESTRUN_CTX_FORMAT
    #[arg(long)]
    pub format: Option<String>,
}

/// Arguments for resolve command
#[derive(Parser, Debug)]
pub struct ResolveArgs {
    /// Snapshot file (YAML or JSON)
    #[arg(short, long)]
    pub file: String,

    /// Write the resolved snapshot here instead of printing it
    #[arg(short, long)]
    pub output: Option<String>,
}

/// Arguments for config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show {
        /// Show environment variable values instead
        #[arg(short, long)]
        env: bool,

        /// Output format (yaml, json)
        #[arg(short, long, default_value = "yaml")]
        format: String,
    },

    /// Write a configuration file with default values
    Init {
        /// Output file path
        #[arg(short, long, default_value = "./testrun-ctx.yaml")]
        output: String,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },

    /// List supported environment variables
    Env,
}
