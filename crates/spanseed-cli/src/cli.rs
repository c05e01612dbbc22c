//! CLI argument definitions using clap derive API

use clap::{ArgGroup, Args, Parser, Subcommand};

/// Spanseed - schema-aware seed injection for Spanner E2E-test databases
#[derive(Parser, Debug)]
#[command(name = "spanseed")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Google Cloud project id
    #[arg(long, global = true, env = "SPANNER_PROJECT_ID")]
    pub project: Option<String>,

    /// Spanner instance id
    #[arg(long, global = true, env = "SPANNER_INSTANCE_ID")]
    pub instance: Option<String>,

    /// Emulator host:port; unset targets the public endpoint
    #[arg(long, global = true, env = "SPANNER_EMULATOR_HOST")]
    pub emulator_host: Option<String>,

    /// Path to a spanseed.yml config file
    #[arg(short, long, global = true)]
    pub config: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Inject seed data into a database
    Seed(SeedArgs),

    /// Check per-table row counts against expectations
    Validate(ValidateArgs),
}

/// Arguments for the seed command
#[derive(Args, Debug)]
#[command(group = ArgGroup::new("seed_source").required(true).args(["file", "fixtures"]))]
pub struct SeedArgs {
    /// Target database id
    #[arg(short, long)]
    pub database: String,

    /// Structured seed file (YAML or JSON, table -> row or list of rows)
    #[arg(short, long)]
    pub file: Option<String>,

    /// Fixture directory with one file per table
    #[arg(long)]
    pub fixtures: Option<String>,

    /// Read the schema from this migration directory instead of the live
    /// database DDL
    #[arg(long)]
    pub schema_dir: Option<String>,
}

/// Arguments for the validate command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Target database id
    #[arg(short, long)]
    pub database: String,

    /// Expected-state config file (per-table min_rows)
    #[arg(short, long)]
    pub expected: Option<String>,
}
