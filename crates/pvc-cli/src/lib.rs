//! # pvc-cli — pve.cloud Inventory Schema CLI
//!
//! Provides the `pvc-schemas` command-line interface:
//!
//! - `pvc-schemas validate` — validate an inventory file against the schema
//!   its `plugin` field selects, optionally extended for a playbook.
//! - `pvc-schemas dump` — export base schemas and merged extensions.
//!
//! ```bash
//! pvc-schemas validate inventory.yaml --context pve.cloud.sync_kubespray
//! pvc-schemas dump ~/.cache/pve-cloud/schemas
//! ```
//!
//! Handlers only parse arguments and format output; resolution, merging
//! and validation live in `pvc-schema`.

pub mod dump;
pub mod validate;

use std::path::Path;

use pvc_schema::{BundledStore, DirectoryStore, SchemaStore};

/// Select the schema store: a directory if one was given, the schemas
/// bundled into the binary otherwise.
pub fn open_store(schema_dir: Option<&Path>) -> Box<dyn SchemaStore> {
    match schema_dir {
        Some(dir) => {
            tracing::debug!(schema_dir = %dir.display(), "using schema directory");
            Box::new(DirectoryStore::new(dir))
        }
        None => Box::new(BundledStore::new()),
    }
}
