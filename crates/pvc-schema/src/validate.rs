//! # Inventory Validation
//!
//! Validates inventories against their effective schema with the
//! `jsonschema` crate.
//!
//! Schemas and inventories are YAML; both are converted to
//! `serde_json::Value` before compilation. Every violation the validator
//! reports is passed through unmodified, with its instance path and schema
//! path, so callers see exactly which field failed and why.

use std::fmt;
use std::path::Path;

use serde::Serialize;
use serde_json::Value as JsonValue;
use serde_yaml::Value;

use crate::error::SchemaError;
use crate::resolve::{resolve_effective_schema, EffectiveSchema, ExtensionSelector};
use crate::store::SchemaStore;

/// A single validation violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// JSON Pointer path to the violating field in the inventory.
    pub instance_path: String,
    /// JSON Pointer path within the schema that triggered the error.
    pub schema_path: String,
    /// Validator message.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "  (root): {}", self.message)
        } else {
            write!(f, "  {}: {}", self.instance_path, self.message)
        }
    }
}

/// Collection of validation violations.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct ValidationViolations {
    violations: Vec<Violation>,
}

impl ValidationViolations {
    /// Returns the number of violations.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Returns true if there are no violations.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Returns a slice of all violations.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }
}

impl fmt::Display for ValidationViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

/// Validate an instance against a schema, both given as YAML values.
///
/// # Errors
///
/// - [`SchemaError::MalformedSchema`] / [`SchemaError::InvalidInventory`] if
///   the schema or instance cannot be represented as JSON.
/// - [`SchemaError::ValidatorBuild`] if the schema does not compile.
/// - [`SchemaError::ValidationFailed`] with every violation otherwise.
pub fn validate_instance(
    instance: &Value,
    schema: &Value,
    schema_name: &str,
) -> Result<(), SchemaError> {
    let schema_json = yaml_to_json_value(schema)
        .map_err(|reason| SchemaError::malformed(schema_name, reason))?;
    let instance_json =
        yaml_to_json_value(instance).map_err(|reason| SchemaError::InvalidInventory { reason })?;

    let validator = jsonschema::options().build(&schema_json).map_err(|e| {
        SchemaError::ValidatorBuild {
            schema_name: schema_name.to_string(),
            reason: e.to_string(),
        }
    })?;

    let errors: Vec<Violation> = validator
        .iter_errors(&instance_json)
        .map(|e| Violation {
            instance_path: e.instance_path.to_string(),
            schema_path: e.schema_path.to_string(),
            message: e.to_string(),
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(SchemaError::ValidationFailed {
            schema_name: schema_name.to_string(),
            violations: ValidationViolations { violations: errors },
        })
    }
}

/// Resolve the effective schema for `inventory` and validate against it.
///
/// Returns the schema that was used so callers can report it. Resolution
/// failures are returned before any validator is built.
pub fn validate_inventory(
    store: &dyn SchemaStore,
    inventory: &Value,
    extension: Option<&ExtensionSelector>,
) -> Result<EffectiveSchema, SchemaError> {
    let effective = resolve_effective_schema(store, inventory, extension)?;
    let name = effective.name();

    tracing::info!(schema = %name, "validating inventory");
    validate_instance(inventory, &effective.document, &name)?;

    Ok(effective)
}

/// Load an inventory file as YAML.
///
/// # Errors
///
/// Returns [`SchemaError::DocumentLoad`] if the file cannot be read or is
/// not valid YAML.
pub fn load_inventory(path: &Path) -> Result<Value, SchemaError> {
    let content = std::fs::read_to_string(path).map_err(|e| SchemaError::DocumentLoad {
        path: path.display().to_string(),
        reason: format!("cannot read file: {e}"),
    })?;

    serde_yaml::from_str(&content).map_err(|e| SchemaError::DocumentLoad {
        path: path.display().to_string(),
        reason: format!("invalid YAML: {e}"),
    })
}

/// Convert a `serde_yaml::Value` to a `serde_json::Value`.
///
/// Tags are dropped, scalar mapping keys are stringified, and non-finite
/// floats are rejected since JSON cannot represent them.
pub fn yaml_to_json_value(yaml: &Value) -> Result<JsonValue, String> {
    match yaml {
        Value::Null => Ok(JsonValue::Null),
        Value::Bool(b) => Ok(JsonValue::Bool(*b)),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(JsonValue::Number(serde_json::Number::from(i)))
            } else if let Some(u) = n.as_u64() {
                Ok(JsonValue::Number(serde_json::Number::from(u)))
            } else if let Some(f) = n.as_f64() {
                serde_json::Number::from_f64(f)
                    .map(JsonValue::Number)
                    .ok_or_else(|| format!("cannot represent float {f} in JSON"))
            } else {
                Err(format!("unsupported YAML number: {n:?}"))
            }
        }
        Value::String(s) => Ok(JsonValue::String(s.clone())),
        Value::Sequence(seq) => {
            let items: Result<Vec<JsonValue>, String> = seq.iter().map(yaml_to_json_value).collect();
            Ok(JsonValue::Array(items?))
        }
        Value::Mapping(map) => {
            let mut json_map = serde_json::Map::new();
            for (k, v) in map {
                let key = match k {
                    Value::String(s) => s.clone(),
                    Value::Number(n) => n.to_string(),
                    Value::Bool(b) => b.to_string(),
                    other => return Err(format!("unsupported YAML map key type: {other:?}")),
                };
                json_map.insert(key, yaml_to_json_value(v)?);
            }
            Ok(JsonValue::Object(json_map))
        }
        Value::Tagged(tagged) => yaml_to_json_value(&tagged.value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::BundledStore;

    fn yaml(s: &str) -> Value {
        serde_yaml::from_str(s).unwrap()
    }

    const SCHEMA: &str = r#"
type: object
required: [plugin, name]
properties:
  plugin:
    type: string
  name:
    type: string
  count:
    type: integer
"#;

    #[test]
    fn test_validate_instance_ok() {
        validate_instance(&yaml("plugin: x\nname: a\ncount: 3"), &yaml(SCHEMA), "test").unwrap();
    }

    #[test]
    fn test_validate_instance_collects_all_violations() {
        let err = validate_instance(&yaml("plugin: x\ncount: nope"), &yaml(SCHEMA), "test").unwrap_err();
        match err {
            SchemaError::ValidationFailed {
                schema_name,
                violations,
            } => {
                assert_eq!(schema_name, "test");
                assert_eq!(violations.len(), 2, "got: {violations}");
                assert!(violations.violations().iter().any(|v| v.message.contains("name")));
                assert!(violations
                    .violations()
                    .iter()
                    .any(|v| v.instance_path == "/count"));
            }
            other => panic!("Expected ValidationFailed, got: {other}"),
        }
    }

    #[test]
    fn test_validate_instance_bad_schema() {
        let err = validate_instance(&yaml("a: 1"), &yaml("type: 12"), "broken").unwrap_err();
        assert!(matches!(err, SchemaError::ValidatorBuild { .. }), "got: {err}");
    }

    #[test]
    fn test_validate_inventory_bundled_kubespray() {
        let inv = yaml(
            r#"
plugin: pve.cloud.kubespray
target_pve: pve1.example.com
stack_name: k8s-main
static_includes:
  dhcp_stack: dhcp.pve1.example.com
qemus:
  - k8s_roles: [master]
    disk: {size: 40G}
    cores: 4
    memory: 8192
"#,
        );
        let effective = validate_inventory(&BundledStore::new(), &inv, None).unwrap();
        assert_eq!(effective.plugin_id, "kubespray");
    }

    #[test]
    fn test_validate_inventory_unknown_plugin_skips_validator() {
        let inv = yaml("plugin: pve.cloud.unknown\n");
        let err = validate_inventory(&BundledStore::new(), &inv, None).unwrap_err();
        assert!(matches!(err, SchemaError::SchemaNotFound { .. }), "got: {err}");
    }

    #[test]
    fn test_load_inventory_missing_file() {
        let err = load_inventory(Path::new("/nonexistent/inventory.yaml")).unwrap_err();
        assert!(matches!(err, SchemaError::DocumentLoad { .. }));
    }

    #[test]
    fn test_yaml_to_json_conversion() {
        let yaml_str = r#"
plugin: pve.cloud.lxc
count: 42
ratio: 0.5
enabled: true
1: numeric key
items:
  - one
  - !tagged two
"#;
        let json_value = yaml_to_json_value(&yaml(yaml_str)).unwrap();

        assert_eq!(json_value["plugin"], "pve.cloud.lxc");
        assert_eq!(json_value["count"], 42);
        assert_eq!(json_value["ratio"], 0.5);
        assert_eq!(json_value["enabled"], true);
        assert_eq!(json_value["1"], "numeric key");
        assert_eq!(json_value["items"][1], "two");
    }

    #[test]
    fn test_yaml_to_json_rejects_nan() {
        assert!(yaml_to_json_value(&yaml("a: .nan")).is_err());
    }

    #[test]
    fn test_violation_display_format() {
        let v = Violation {
            instance_path: "/qemus/0/cores".to_string(),
            schema_path: "/properties/qemus/items/properties/cores/minimum".to_string(),
            message: "0 is less than the minimum of 1".to_string(),
        };
        let display = v.to_string();
        assert!(display.contains("/qemus/0/cores"));
        assert!(display.contains("minimum"));
    }

    #[test]
    fn test_violation_display_root() {
        let v = Violation {
            instance_path: String::new(),
            schema_path: "/required".to_string(),
            message: r#""stack_name" is a required property"#.to_string(),
        };
        assert!(v.to_string().contains("(root)"));
    }

    #[test]
    fn test_violations_serialize_as_list() {
        let violations = ValidationViolations {
            violations: vec![Violation {
                instance_path: "/a".to_string(),
                schema_path: "/properties/a/type".to_string(),
                message: "bad".to_string(),
            }],
        };
        let json = serde_json::to_value(&violations).unwrap();
        assert_eq!(json[0]["instance_path"], "/a");
    }
}
