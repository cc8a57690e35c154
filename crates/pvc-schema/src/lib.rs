//! # pvc-schema — Inventory Schema Resolution & Validation
//!
//! Validates pve.cloud inventory files against the schema their `plugin`
//! field selects, optionally extended by the playbook that triggered
//! validation.
//!
//! ## Pipeline
//!
//! 1. [`resolve`] reads the inventory's plugin id (`pve.cloud.kubespray` →
//!    `kubespray`) and loads `kubespray_schema` from a [`SchemaStore`].
//! 2. If the caller passes an [`ExtensionSelector`] and the store has a
//!    matching `<id>_schema_ext`, it is deep-merged onto the base by
//!    [`merge::merge`].
//! 3. [`validate`] compiles the effective schema with `jsonschema` and
//!    reports every violation.
//!
//! [`export`] writes all base schemas plus merged extensions to a directory.
//!
//! ## Crate Policy
//!
//! - Assets are read on every call. Nothing is cached or mutated.
//! - Invocation context is always an explicit argument; this crate never
//!   reads process arguments itself.
//! - Validator output is passed through unmodified.

pub mod error;
pub mod export;
pub mod merge;
pub mod resolve;
pub mod store;
pub mod validate;

pub use error::SchemaError;
pub use export::export_schemas;
pub use merge::merge;
pub use resolve::{
    bare_plugin_id, resolve_effective_schema, EffectiveSchema, ExtensionSelector, PLUGIN_NAMESPACE,
};
pub use store::{BundledStore, DirectoryStore, SchemaAsset, SchemaStore};
pub use validate::{
    load_inventory, validate_instance, validate_inventory, ValidationViolations, Violation,
};
