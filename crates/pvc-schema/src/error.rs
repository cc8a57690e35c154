//! # Error Types
//!
//! Failure taxonomy for schema resolution, export and inventory validation.
//! None of these are retried: every operation is a single deterministic pass
//! over static assets, so the caller gets the first failure as-is.

use thiserror::Error;

use crate::validate::ValidationViolations;

/// Error raised while resolving, exporting or validating against a schema.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// No base schema asset exists for the requested plugin id.
    #[error("no schema found for plugin '{plugin_id}'")]
    SchemaNotFound {
        /// Bare plugin id (namespace prefix already stripped).
        plugin_id: String,
    },

    /// A schema or extension asset is not a structured YAML mapping.
    #[error("malformed schema asset '{asset}': {reason}")]
    MalformedSchema {
        /// Asset name, e.g. `kubespray_schema`.
        asset: String,
        /// Parser or shape error.
        reason: String,
    },

    /// An extension declares a target plugin that has no base schema.
    #[error("extension '{extension}' targets plugin '{target}' which has no base schema")]
    MissingMergeTarget {
        /// Extension asset name.
        extension: String,
        /// Declared target plugin id.
        target: String,
    },

    /// The inventory did not conform to its effective schema.
    #[error("validation failed against schema '{schema_name}':\n{violations}")]
    ValidationFailed {
        /// Name of the effective schema, including the applied extension.
        schema_name: String,
        /// Every violation reported by the validator.
        violations: ValidationViolations,
    },

    /// The inventory has no usable `plugin` field.
    #[error("invalid inventory: {reason}")]
    InvalidInventory {
        /// What is wrong with the document.
        reason: String,
    },

    /// The inventory file could not be read or parsed.
    #[error("document load error for '{path}': {reason}")]
    DocumentLoad {
        /// Path to the document.
        path: String,
        /// Reason the document could not be loaded.
        reason: String,
    },

    /// The effective schema could not be compiled into a validator.
    #[error("validator build error for schema '{schema_name}': {reason}")]
    ValidatorBuild {
        /// Schema name.
        schema_name: String,
        /// Compiler error.
        reason: String,
    },

    /// IO error reading assets or writing exports.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl SchemaError {
    /// Shorthand for [`SchemaError::MalformedSchema`].
    pub(crate) fn malformed(asset: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedSchema {
            asset: asset.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = SchemaError::SchemaNotFound {
            plugin_id: "unknown".to_string(),
        };
        assert_eq!(err.to_string(), "no schema found for plugin 'unknown'");
    }

    #[test]
    fn test_missing_merge_target_display() {
        let err = SchemaError::MissingMergeTarget {
            extension: "sync_vms_schema_ext".to_string(),
            target: "pve.cloud.vms".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("sync_vms_schema_ext"));
        assert!(msg.contains("pve.cloud.vms"));
    }
}
