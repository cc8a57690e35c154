//! # Dump Subcommand
//!
//! Exports every base schema and every extension merged onto its base,
//! for editors that validate inventories with a single schema file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use pvc_schema::export_schemas;

/// Arguments for the `pvc-schemas dump` subcommand.
#[derive(Args, Debug)]
pub struct DumpArgs {
    /// Output directory. Created with parents if missing.
    #[arg(value_name = "OUT_DIR")]
    pub out_dir: PathBuf,
}

/// Execute the dump subcommand.
pub fn run_dump(args: &DumpArgs, schema_dir: Option<&Path>) -> Result<u8> {
    let store = crate::open_store(schema_dir);

    export_schemas(store.as_ref(), &args.out_dir)
        .with_context(|| format!("failed to export schemas to {}", args.out_dir.display()))?;

    println!("Schemas written to {}", args.out_dir.display());
    Ok(0)
}
