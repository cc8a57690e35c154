//! # Schema Export
//!
//! Writes a snapshot of every schema to a directory: base schemas are
//! copied verbatim, and each extension is written merged onto the base
//! schema it targets, under the extension's own file name. Editors and
//! language servers can then point at a single file per playbook.
//!
//! Extensions find their base through the plugin id declared inside both
//! documents, not through file names. A missing target fails the whole run.

use std::collections::HashMap;
use std::path::Path;

use crate::error::SchemaError;
use crate::merge::merge;
use crate::store::{SchemaAsset, SchemaStore};

/// Export all base schemas and merged extensions into `out_dir`.
///
/// `out_dir` is created with its parents if needed. Assets are processed in
/// name order and merged output keeps the key order of the source documents.
///
/// # Errors
///
/// - [`SchemaError::MalformedSchema`] if an asset does not parse or does not
///   declare a plugin id.
/// - [`SchemaError::MissingMergeTarget`] if an extension targets a plugin
///   with no base schema.
/// - [`SchemaError::Io`] on filesystem errors.
pub fn export_schemas(store: &dyn SchemaStore, out_dir: &Path) -> Result<(), SchemaError> {
    std::fs::create_dir_all(out_dir)?;

    let schemas = store.list_schemas()?;
    for schema in &schemas {
        let dest = out_dir.join(schema.file_name());
        std::fs::write(&dest, &schema.source)?;
        tracing::info!(path = %dest.display(), "exported base schema");
    }

    let mut by_plugin: HashMap<&str, &SchemaAsset> = HashMap::new();
    for schema in &schemas {
        let plugin_id = schema.require_plugin_id()?;
        if let Some(previous) = by_plugin.insert(plugin_id, schema) {
            tracing::warn!(
                plugin_id,
                previous = %previous.name,
                current = %schema.name,
                "plugin id declared by more than one schema; using the later one"
            );
        }
    }

    for ext in store.list_extensions()? {
        let target = ext.require_plugin_id()?;
        let base = by_plugin
            .get(target)
            .ok_or_else(|| SchemaError::MissingMergeTarget {
                extension: ext.name.clone(),
                target: target.to_string(),
            })?;

        let merged = merge(&base.document, &ext.document);
        let rendered = serde_yaml::to_string(&merged)
            .map_err(|e| SchemaError::malformed(&ext.name, format!("cannot serialize merged schema: {e}")))?;

        let dest = out_dir.join(ext.file_name());
        std::fs::write(&dest, rendered)?;
        tracing::info!(path = %dest.display(), base = %base.name, "exported merged extension");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{BundledStore, DirectoryStore};
    use serde_yaml::Value;
    use std::fs;

    const FOO: &str = "# foo inventory\ntype: object\nrequired: [plugin]\nproperties:\n  plugin:\n    enum: [pve.cloud.foo]\n";

    fn read_yaml(path: &Path) -> Value {
        serde_yaml::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn test_export_copies_bases_and_merges_extensions() {
        static DEFS: &[(&str, &str)] = &[("foo_schema", FOO)];
        static EXTS: &[(&str, &str)] = &[(
            "bar_schema_ext",
            "required: [extra]\nproperties:\n  plugin:\n    enum: [pve.cloud.foo]\n  extra:\n    type: string\n",
        )];
        let store = BundledStore::from_static(DEFS, EXTS);
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("nested/out");

        export_schemas(&store, &out).unwrap();

        assert_eq!(fs::read_to_string(out.join("foo_schema.yaml")).unwrap(), FOO);

        let merged = read_yaml(&out.join("bar_schema_ext.yaml"));
        let expected: Value = serde_yaml::from_str(
            "type: object\nrequired: [plugin, extra]\nproperties:\n  plugin:\n    enum: [pve.cloud.foo]\n  extra:\n    type: string\n",
        )
        .unwrap();
        assert_eq!(merged, expected);
    }

    #[test]
    fn test_export_preserves_key_order() {
        static DEFS: &[(&str, &str)] = &[(
            "foo_schema",
            "type: object\nproperties:\n  plugin:\n    enum: [pve.cloud.foo]\n  zeta: {}\n  alpha: {}\n",
        )];
        static EXTS: &[(&str, &str)] = &[(
            "bar_schema_ext",
            "properties:\n  plugin:\n    enum: [pve.cloud.foo]\n  middle: {}\n",
        )];
        let store = BundledStore::from_static(DEFS, EXTS);
        let tmp = tempfile::tempdir().unwrap();

        export_schemas(&store, tmp.path()).unwrap();

        let merged = read_yaml(&tmp.path().join("bar_schema_ext.yaml"));
        let keys: Vec<&str> = merged["properties"]
            .as_mapping()
            .unwrap()
            .keys()
            .filter_map(Value::as_str)
            .collect();
        assert_eq!(keys, vec!["plugin", "zeta", "alpha", "middle"]);
    }

    #[test]
    fn test_export_base_without_plugin_id_is_malformed() {
        static DEFS: &[(&str, &str)] = &[("anon_schema", "type: object\n")];
        static EXTS: &[(&str, &str)] = &[];
        let store = BundledStore::from_static(DEFS, EXTS);
        let tmp = tempfile::tempdir().unwrap();

        let err = export_schemas(&store, tmp.path()).unwrap_err();
        match err {
            SchemaError::MalformedSchema { asset, .. } => assert_eq!(asset, "anon_schema"),
            other => panic!("Expected MalformedSchema, got: {other}"),
        }
    }

    #[test]
    fn test_export_extension_without_plugin_id_is_malformed() {
        static DEFS: &[(&str, &str)] = &[("foo_schema", FOO)];
        static EXTS: &[(&str, &str)] = &[("x_schema_ext", "type: object\n")];
        let store = BundledStore::from_static(DEFS, EXTS);
        let tmp = tempfile::tempdir().unwrap();

        let err = export_schemas(&store, tmp.path()).unwrap_err();
        match err {
            SchemaError::MalformedSchema { asset, .. } => assert_eq!(asset, "x_schema_ext"),
            other => panic!("Expected MalformedSchema, got: {other}"),
        }
    }

    #[test]
    fn test_export_missing_merge_target_fails() {
        static DEFS: &[(&str, &str)] = &[("foo_schema", FOO)];
        static EXTS: &[(&str, &str)] = &[(
            "orphan_schema_ext",
            "properties:\n  plugin:\n    enum: [pve.cloud.nothing]\n",
        )];
        let store = BundledStore::from_static(DEFS, EXTS);
        let tmp = tempfile::tempdir().unwrap();

        let err = export_schemas(&store, tmp.path()).unwrap_err();
        match err {
            SchemaError::MissingMergeTarget { extension, target } => {
                assert_eq!(extension, "orphan_schema_ext");
                assert_eq!(target, "pve.cloud.nothing");
            }
            other => panic!("Expected MissingMergeTarget, got: {other}"),
        }
    }

    #[test]
    fn test_export_uses_declared_plugin_id_not_file_name() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("src");
        fs::create_dir_all(src.join("definitions")).unwrap();
        fs::create_dir_all(src.join("extensions")).unwrap();
        // File is named "legacy" but declares pve.cloud.foo.
        fs::write(src.join("definitions/legacy_schema.yaml"), FOO).unwrap();
        fs::write(
            src.join("extensions/sync_foo_schema_ext.yaml"),
            "properties:\n  plugin:\n    enum: [pve.cloud.foo]\n",
        )
        .unwrap();

        let out = tmp.path().join("out");
        export_schemas(&DirectoryStore::new(&src), &out).unwrap();
        assert!(out.join("legacy_schema.yaml").is_file());
        assert!(out.join("sync_foo_schema_ext.yaml").is_file());
    }

    #[test]
    fn test_export_bundled_schemas() {
        let tmp = tempfile::tempdir().unwrap();
        export_schemas(&BundledStore::new(), tmp.path()).unwrap();
        let mut names: Vec<String> = fs::read_dir(tmp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(
            names,
            vec![
                "kubespray_schema.yaml",
                "lxc_schema.yaml",
                "sync_kubespray_schema_ext.yaml",
                "sync_lxcs_schema_ext.yaml",
            ]
        );
    }
}
