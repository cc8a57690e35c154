//! # Schema Store
//!
//! Read-only registry of base schemas and schema extensions.
//!
//! Base schemas are keyed `<plugin_id>_schema`, extensions
//! `<extension_id>_schema_ext`. Each asset is a YAML mapping. Stores parse
//! assets on every call; nothing is cached.
//!
//! Two backends are provided:
//!
//! - [`BundledStore`] — the schemas shipped with this crate, compiled in
//!   with `include_str!`.
//! - [`DirectoryStore`] — a `definitions/` + `extensions/` directory pair
//!   on disk, for working on schemas without rebuilding.

use std::path::{Path, PathBuf};

use serde_yaml::Value;

use crate::error::SchemaError;

/// Suffix of base schema asset names.
pub const SCHEMA_SUFFIX: &str = "_schema";

/// Suffix of schema extension asset names.
pub const EXTENSION_SUFFIX: &str = "_schema_ext";

/// File extension of schema assets on disk and in exports.
pub const ASSET_FILE_EXTENSION: &str = "yaml";

/// A parsed schema or extension asset.
///
/// Carries both identifiers explicitly: `name` comes from the asset key
/// (the file name), `plugin_id` from the document's own
/// `properties.plugin.enum[0]`.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaAsset {
    /// Asset key, e.g. `kubespray_schema` or `sync_kubespray_schema_ext`.
    pub name: String,
    /// Plugin id declared inside the document, if any.
    pub plugin_id: Option<String>,
    /// Parsed document. Always a mapping.
    pub document: Value,
    /// Raw asset text, kept so exports can copy it byte for byte.
    pub source: String,
}

impl SchemaAsset {
    /// Parse an asset from its YAML source.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::MalformedSchema`] if the source is not valid
    /// YAML or its top level is not a mapping.
    pub fn parse(name: impl Into<String>, source: impl Into<String>) -> Result<Self, SchemaError> {
        let name = name.into();
        let source = source.into();

        let document: Value = serde_yaml::from_str(&source)
            .map_err(|e| SchemaError::malformed(&name, format!("invalid YAML: {e}")))?;

        if !document.is_mapping() {
            return Err(SchemaError::malformed(
                &name,
                "top level is not a mapping",
            ));
        }

        let plugin_id = declared_plugin_id(&document).map(str::to_string);

        Ok(Self {
            name,
            plugin_id,
            document,
            source,
        })
    }

    /// File name used for this asset on disk and in exports.
    pub fn file_name(&self) -> String {
        format!("{}.{ASSET_FILE_EXTENSION}", self.name)
    }

    /// The declared plugin id, or a malformed-asset error if absent.
    pub fn require_plugin_id(&self) -> Result<&str, SchemaError> {
        self.plugin_id.as_deref().ok_or_else(|| {
            SchemaError::malformed(&self.name, "missing properties.plugin.enum[0]")
        })
    }
}

/// Read the plugin id a schema declares for itself.
///
/// Schemas pin their inventory's `plugin` property with a single-value
/// enum; the first enum entry is the id.
pub fn declared_plugin_id(document: &Value) -> Option<&str> {
    document
        .get("properties")?
        .get("plugin")?
        .get("enum")?
        .as_sequence()?
        .first()?
        .as_str()
}

/// Asset name of the base schema for a bare plugin id.
pub fn schema_asset_name(plugin_id: &str) -> String {
    format!("{plugin_id}{SCHEMA_SUFFIX}")
}

/// Asset name of the schema extension for an extension id.
pub fn extension_asset_name(extension_id: &str) -> String {
    format!("{extension_id}{EXTENSION_SUFFIX}")
}

/// Ids are joined into asset names and file paths, so they must be a plain
/// non-empty name without path separators.
fn is_plain_id(id: &str) -> bool {
    !id.is_empty() && !id.contains(['/', '\\']) && id != "." && id != ".."
}

/// Key-value registry of schema assets.
///
/// Lookups return `Ok(None)` when an asset does not exist; errors are
/// reserved for assets that exist but cannot be read or parsed.
pub trait SchemaStore: Send + Sync {
    /// Load the base schema for a bare plugin id.
    fn get_schema(&self, plugin_id: &str) -> Result<Option<SchemaAsset>, SchemaError>;

    /// Whether an extension exists, without loading it.
    fn has_extension(&self, extension_id: &str) -> bool;

    /// Load the extension for an extension id.
    fn get_extension(&self, extension_id: &str) -> Result<Option<SchemaAsset>, SchemaError>;

    /// All base schemas, sorted by name.
    fn list_schemas(&self) -> Result<Vec<SchemaAsset>, SchemaError>;

    /// All extensions, sorted by name.
    fn list_extensions(&self) -> Result<Vec<SchemaAsset>, SchemaError>;
}

type StaticAssets = &'static [(&'static str, &'static str)];

const BUNDLED_DEFINITIONS: StaticAssets = &[
    (
        "kubespray_schema",
        include_str!("../schemas/definitions/kubespray_schema.yaml"),
    ),
    (
        "lxc_schema",
        include_str!("../schemas/definitions/lxc_schema.yaml"),
    ),
];

const BUNDLED_EXTENSIONS: StaticAssets = &[
    (
        "sync_kubespray_schema_ext",
        include_str!("../schemas/extensions/sync_kubespray_schema_ext.yaml"),
    ),
    (
        "sync_lxcs_schema_ext",
        include_str!("../schemas/extensions/sync_lxcs_schema_ext.yaml"),
    ),
];

/// Schemas compiled into the crate.
#[derive(Debug, Clone, Copy)]
pub struct BundledStore {
    definitions: StaticAssets,
    extensions: StaticAssets,
}

impl BundledStore {
    /// The schemas shipped with this crate.
    pub fn new() -> Self {
        Self::from_static(BUNDLED_DEFINITIONS, BUNDLED_EXTENSIONS)
    }

    /// A store over caller-provided `(name, source)` tables.
    pub fn from_static(definitions: StaticAssets, extensions: StaticAssets) -> Self {
        Self {
            definitions,
            extensions,
        }
    }

    fn find(assets: StaticAssets, name: &str) -> Option<&'static str> {
        assets
            .iter()
            .find(|(asset_name, _)| *asset_name == name)
            .map(|(_, source)| *source)
    }

    fn parse_all(assets: StaticAssets) -> Result<Vec<SchemaAsset>, SchemaError> {
        let mut parsed = assets
            .iter()
            .map(|(name, source)| SchemaAsset::parse(*name, *source))
            .collect::<Result<Vec<_>, _>>()?;
        parsed.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(parsed)
    }
}

impl Default for BundledStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaStore for BundledStore {
    fn get_schema(&self, plugin_id: &str) -> Result<Option<SchemaAsset>, SchemaError> {
        let name = schema_asset_name(plugin_id);
        Self::find(self.definitions, &name)
            .map(|source| SchemaAsset::parse(name, source))
            .transpose()
    }

    fn has_extension(&self, extension_id: &str) -> bool {
        Self::find(self.extensions, &extension_asset_name(extension_id)).is_some()
    }

    fn get_extension(&self, extension_id: &str) -> Result<Option<SchemaAsset>, SchemaError> {
        let name = extension_asset_name(extension_id);
        Self::find(self.extensions, &name)
            .map(|source| SchemaAsset::parse(name, source))
            .transpose()
    }

    fn list_schemas(&self) -> Result<Vec<SchemaAsset>, SchemaError> {
        Self::parse_all(self.definitions)
    }

    fn list_extensions(&self) -> Result<Vec<SchemaAsset>, SchemaError> {
        Self::parse_all(self.extensions)
    }
}

/// Schemas read from disk.
///
/// Expects `<root>/definitions/<plugin_id>_schema.yaml` and
/// `<root>/extensions/<extension_id>_schema_ext.yaml`. A missing directory
/// is treated as empty.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    definitions_dir: PathBuf,
    extensions_dir: PathBuf,
}

impl DirectoryStore {
    /// Store rooted at a directory containing `definitions/` and `extensions/`.
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self::with_dirs(root.join("definitions"), root.join("extensions"))
    }

    /// Store over explicit definition and extension directories.
    pub fn with_dirs(definitions_dir: impl Into<PathBuf>, extensions_dir: impl Into<PathBuf>) -> Self {
        Self {
            definitions_dir: definitions_dir.into(),
            extensions_dir: extensions_dir.into(),
        }
    }

    /// Directory holding base schemas.
    pub fn definitions_dir(&self) -> &Path {
        &self.definitions_dir
    }

    /// Directory holding schema extensions.
    pub fn extensions_dir(&self) -> &Path {
        &self.extensions_dir
    }

    fn asset_path(dir: &Path, name: &str) -> PathBuf {
        dir.join(format!("{name}.{ASSET_FILE_EXTENSION}"))
    }

    fn read_asset(dir: &Path, name: String) -> Result<Option<SchemaAsset>, SchemaError> {
        let path = Self::asset_path(dir, &name);
        if !path.is_file() {
            return Ok(None);
        }
        tracing::debug!(path = %path.display(), "loading schema asset");
        let source = std::fs::read_to_string(&path)?;
        SchemaAsset::parse(name, source).map(Some)
    }

    fn read_all(dir: &Path, suffix: &str) -> Result<Vec<SchemaAsset>, SchemaError> {
        if !dir.is_dir() {
            tracing::warn!(dir = %dir.display(), "schema directory not found; treating as empty");
            return Ok(Vec::new());
        }

        let mut assets = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(ASSET_FILE_EXTENSION) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if !stem.ends_with(suffix) {
                continue;
            }
            let source = std::fs::read_to_string(&path)?;
            assets.push(SchemaAsset::parse(stem, source)?);
        }

        assets.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(assets)
    }
}

impl SchemaStore for DirectoryStore {
    fn get_schema(&self, plugin_id: &str) -> Result<Option<SchemaAsset>, SchemaError> {
        if !is_plain_id(plugin_id) {
            return Ok(None);
        }
        Self::read_asset(&self.definitions_dir, schema_asset_name(plugin_id))
    }

    fn has_extension(&self, extension_id: &str) -> bool {
        is_plain_id(extension_id)
            && Self::asset_path(&self.extensions_dir, &extension_asset_name(extension_id)).is_file()
    }

    fn get_extension(&self, extension_id: &str) -> Result<Option<SchemaAsset>, SchemaError> {
        if !is_plain_id(extension_id) {
            return Ok(None);
        }
        Self::read_asset(&self.extensions_dir, extension_asset_name(extension_id))
    }

    fn list_schemas(&self) -> Result<Vec<SchemaAsset>, SchemaError> {
        Self::read_all(&self.definitions_dir, SCHEMA_SUFFIX)
    }

    fn list_extensions(&self) -> Result<Vec<SchemaAsset>, SchemaError> {
        Self::read_all(&self.extensions_dir, EXTENSION_SUFFIX)
    }
}
