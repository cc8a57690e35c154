//! # Schema Resolution
//!
//! Picks the effective schema for an inventory.
//!
//! The inventory's `plugin` field (e.g. `pve.cloud.kubespray`) selects the
//! base schema `kubespray_schema`. When the caller passes an
//! [`ExtensionSelector`] derived from the invoking playbook
//! (e.g. `pve.cloud.sync_kubespray`), the extension
//! `sync_kubespray_schema_ext` is merged on top if the store has one.
//! A missing extension is not an error.

use serde_yaml::Value;

use crate::error::SchemaError;
use crate::merge::merge;
use crate::store::{schema_asset_name, SchemaStore};

/// Namespace prefix of pve.cloud plugin ids and playbooks.
pub const PLUGIN_NAMESPACE: &str = "pve.cloud.";

/// Strip the namespace prefix from a plugin id, if present.
pub fn bare_plugin_id(plugin: &str) -> &str {
    plugin.strip_prefix(PLUGIN_NAMESPACE).unwrap_or(plugin)
}

/// Which schema extension a validation call should consider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionSelector {
    extension_id: String,
}

impl ExtensionSelector {
    /// Select an extension by its bare id, e.g. `sync_kubespray`.
    pub fn new(extension_id: impl Into<String>) -> Self {
        Self {
            extension_id: extension_id.into(),
        }
    }

    /// Derive a selector from invocation tokens such as process arguments.
    ///
    /// The first token starting with [`PLUGIN_NAMESPACE`] wins. Its last
    /// dot-separated segment is the extension id, so both
    /// `pve.cloud.sync_kubespray` and a fully qualified
    /// `pve.cloud.playbooks.sync_kubespray` select `sync_kubespray`.
    /// Returns `None` when no token matches.
    pub fn from_invocation<I, S>(tokens: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        tokens.into_iter().find_map(|token| {
            let token = token.as_ref();
            if !token.starts_with(PLUGIN_NAMESPACE) {
                return None;
            }
            let segment = token.rsplit('.').next().unwrap_or(token);
            Some(Self::new(bare_plugin_id(segment)))
        })
    }

    /// The bare extension id.
    pub fn extension_id(&self) -> &str {
        &self.extension_id
    }
}

/// The schema an inventory is validated against.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveSchema {
    /// Bare plugin id of the base schema.
    pub plugin_id: String,
    /// Extension merged onto the base, if any.
    pub extension_id: Option<String>,
    /// The base schema, or base merged with the extension.
    pub document: Value,
}

impl EffectiveSchema {
    /// Human-readable name used in error reports,
    /// e.g. `kubespray_schema+sync_kubespray`.
    pub fn name(&self) -> String {
        let base = schema_asset_name(&self.plugin_id);
        match &self.extension_id {
            Some(ext) => format!("{base}+{ext}"),
            None => base,
        }
    }
}

/// Read the bare plugin id an inventory selects.
///
/// # Errors
///
/// Returns [`SchemaError::InvalidInventory`] if `plugin` is missing or not
/// a string. A bare namespace yields an empty id, which no store resolves.
pub fn inventory_plugin_id(inventory: &Value) -> Result<&str, SchemaError> {
    let plugin = inventory
        .get("plugin")
        .ok_or_else(|| SchemaError::InvalidInventory {
            reason: "missing required field 'plugin'".to_string(),
        })?
        .as_str()
        .ok_or_else(|| SchemaError::InvalidInventory {
            reason: "field 'plugin' must be a string".to_string(),
        })?;

    Ok(bare_plugin_id(plugin))
}

/// Resolve the effective schema for an inventory.
///
/// Loads the base schema named by the inventory's plugin id and, when
/// `extension` is given and the store has a matching extension, merges the
/// extension onto it.
///
/// # Errors
///
/// - [`SchemaError::InvalidInventory`] if the inventory has no usable `plugin`.
/// - [`SchemaError::SchemaNotFound`] if the store has no base schema.
/// - [`SchemaError::MalformedSchema`] if the base or extension does not parse.
pub fn resolve_effective_schema(
    store: &dyn SchemaStore,
    inventory: &Value,
    extension: Option<&ExtensionSelector>,
) -> Result<EffectiveSchema, SchemaError> {
    let plugin_id = inventory_plugin_id(inventory)?;

    let base = store
        .get_schema(plugin_id)?
        .ok_or_else(|| SchemaError::SchemaNotFound {
            plugin_id: plugin_id.to_string(),
        })?;

    tracing::debug!(plugin_id, asset = %base.name, "loaded base schema");

    let mut effective = EffectiveSchema {
        plugin_id: plugin_id.to_string(),
        extension_id: None,
        document: base.document,
    };

    let Some(selector) = extension else {
        return Ok(effective);
    };

    let extension_id = selector.extension_id();
    if !store.has_extension(extension_id) {
        tracing::debug!(extension_id, "no schema extension for invocation");
        return Ok(effective);
    }

    // Removed between the check and the load: keep the base.
    if let Some(ext) = store.get_extension(extension_id)? {
        tracing::debug!(extension_id, asset = %ext.name, "merging schema extension");
        effective.document = merge(&effective.document, &ext.document);
        effective.extension_id = Some(extension_id.to_string());
    }

    Ok(effective)
}
