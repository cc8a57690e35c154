//! # Validate Subcommand
//!
//! Validates one inventory file against its effective schema.
//!
//! Playbook context is passed with `--context`; the first token in the
//! `pve.cloud.` namespace picks the schema extension. Wrappers that forward
//! their whole argument list can pass every argument as a context token.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use pvc_schema::{load_inventory, validate_inventory, ExtensionSelector, SchemaError};

/// Arguments for the `pvc-schemas validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Inventory file to validate.
    #[arg(value_name = "INVENTORY")]
    pub inventory: PathBuf,

    /// Invocation token, e.g. the playbook name `pve.cloud.sync_kubespray`.
    /// May be repeated; the first token in the pve.cloud namespace wins.
    #[arg(long = "context", value_name = "TOKEN")]
    pub context: Vec<String>,

    /// Validate against the base schema only, ignoring --context.
    #[arg(long)]
    pub no_extension: bool,

    /// Print violations as JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

/// Execute the validate subcommand.
///
/// Returns exit code: 0 on success, 1 on validation failure. Lookup and
/// load failures are returned as errors.
pub fn run_validate(args: &ValidateArgs, schema_dir: Option<&Path>) -> Result<u8> {
    let store = crate::open_store(schema_dir);

    let inventory = load_inventory(&args.inventory)
        .with_context(|| format!("failed to load inventory {}", args.inventory.display()))?;

    let selector = if args.no_extension {
        None
    } else {
        ExtensionSelector::from_invocation(&args.context)
    };

    if let Some(selector) = &selector {
        tracing::info!(extension_id = selector.extension_id(), "considering schema extension");
    }

    match validate_inventory(store.as_ref(), &inventory, selector.as_ref()) {
        Ok(effective) => {
            println!("OK: {} ({})", args.inventory.display(), effective.name());
            Ok(0)
        }
        Err(SchemaError::ValidationFailed {
            schema_name,
            violations,
        }) => {
            if args.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&violations)
                        .context("failed to serialize violations")?
                );
            } else {
                println!(
                    "{}",
                    failure_summary(&args.inventory, violations.len(), &schema_name)
                );
                println!("{violations}");
            }
            Ok(1)
        }
        Err(e) => Err(e).with_context(|| {
            format!("cannot resolve schema for {}", args.inventory.display())
        }),
    }
}

/// Header line printed above the violations of a failed inventory.
fn failure_summary(inventory: &Path, count: usize, schema_name: &str) -> String {
    format!(
        "FAIL: {}: {count} violation(s) against {schema_name}",
        inventory.display()
    )
}
