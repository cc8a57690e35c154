//! # pvc-schemas CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use pvc_cli::dump::{run_dump, DumpArgs};
use pvc_cli::validate::{run_validate, ValidateArgs};

/// pve.cloud inventory schema tool.
///
/// Validates inventory files against the schema selected by their `plugin`
/// field, with playbook-specific schema extensions, and exports merged
/// schemas for editor tooling.
#[derive(Parser, Debug)]
#[command(name = "pvc-schemas", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Read schemas from a directory with `definitions/` and `extensions/`
    /// instead of the bundled ones.
    #[arg(long, global = true, value_name = "DIR")]
    schema_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate an inventory file against its effective schema.
    Validate(ValidateArgs),

    /// Export base schemas and merged schema extensions to a directory.
    Dump(DumpArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity level.
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("pvc-schemas v{} starting", env!("CARGO_PKG_VERSION"));

    let schema_dir = cli.schema_dir.as_deref();

    let result = match cli.command {
        Commands::Validate(args) => run_validate(&args, schema_dir),
        Commands::Dump(args) => run_dump(&args, schema_dir),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
