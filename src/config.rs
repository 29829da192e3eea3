//! Generation configuration.
//!
//! Every entry point receives one explicit [`GenConfig`]. The CLI builds it from
//! defaults, an optional `sqlts.toml`, and its own flags.
//!
//! ```toml
//! to_camel_case = true
//! use_quotes = true
//! nullable_json = true
//! ignore_tables = ["schema_migrations"]
//! ignore_columns = ["users.password_hash"]
//! primary_key = "id"
//!
//! [types]
//! geometry = "string"
//! ```

use serde::{Deserialize, Deserializer};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use crate::error::{GenError, GenResult};
use crate::types::BaseType;

/// File name looked up in the working directory.
pub const CONFIG_FILE: &str = "sqlts.toml";

/// Options for a generation run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenConfig {
    /// camelCase record keys instead of using raw column names.
    pub to_camel_case: bool,
    /// Render column name constants as `` `"name"` ``.
    pub use_quotes: bool,
    /// Include `null` in the `JSONPrimitive` alias.
    pub nullable_json: bool,
    /// Tables excluded from schema generation.
    pub ignore_tables: BTreeSet<String>,
    /// `table.column` pairs for type generation, bare column names for data export.
    pub ignore_columns: BTreeSet<String>,
    /// Column whose value keys exported rows.
    pub primary_key: String,
    /// Extra native type mappings, checked before the built-in table.
    /// Keys are lower-cased.
    #[serde(deserialize_with = "lowercase_keys")]
    pub types: BTreeMap<String, BaseType>,
    /// Seconds to wait for a database connection.
    pub connect_timeout: Option<u64>,
}

impl Default for GenConfig {
    fn default() -> Self {
        Self {
            to_camel_case: false,
            use_quotes: false,
            nullable_json: true,
            ignore_tables: BTreeSet::new(),
            ignore_columns: BTreeSet::new(),
            primary_key: "id".to_string(),
            types: BTreeMap::new(),
            connect_timeout: None,
        }
    }
}

impl GenConfig {
    /// Create a new configuration builder
    pub fn builder() -> GenConfigBuilder {
        GenConfigBuilder::default()
    }

    /// Parse a TOML document.
    pub fn from_toml(content: &str) -> GenResult<Self> {
        toml::from_str(content).map_err(|e| GenError::Config(e.to_string()))
    }

    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> GenResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            GenError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    /// Load the first configuration file found, or defaults.
    ///
    /// Looks at `./sqlts.toml`, then `<config dir>/sqlts/config.toml`.
    pub fn discover() -> GenResult<Self> {
        match default_paths().into_iter().find(|p| p.is_file()) {
            Some(path) => {
                tracing::debug!("Loading configuration from {}", path.display());
                Self::load(&path)
            }
            None => Ok(Self::default()),
        }
    }
}

fn lowercase_keys<'de, D>(deserializer: D) -> Result<BTreeMap<String, BaseType>, D::Error>
where
    D: Deserializer<'de>,
{
    let types = BTreeMap::<String, BaseType>::deserialize(deserializer)?;
    Ok(types
        .into_iter()
        .map(|(native, base)| (native.to_lowercase(), base))
        .collect())
}

fn default_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(CONFIG_FILE)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("sqlts").join("config.toml"));
    }
    paths
}

/// Builder for GenConfig
#[derive(Debug, Default)]
pub struct GenConfigBuilder {
    config: GenConfig,
}

impl GenConfigBuilder {
    /// Start from an existing configuration.
    pub fn from_config(config: GenConfig) -> Self {
        Self { config }
    }

    pub fn camel_case(mut self, on: bool) -> Self {
        self.config.to_camel_case = on;
        self
    }

    pub fn quotes(mut self, on: bool) -> Self {
        self.config.use_quotes = on;
        self
    }

    pub fn nullable_json(mut self, on: bool) -> Self {
        self.config.nullable_json = on;
        self
    }

    /// Exclude a table from schema generation.
    pub fn ignore_table(mut self, table: impl Into<String>) -> Self {
        self.config.ignore_tables.insert(table.into());
        self
    }

    /// Exclude a column (`table.column`, or a bare name for data export).
    pub fn ignore_column(mut self, column: impl Into<String>) -> Self {
        self.config.ignore_columns.insert(column.into());
        self
    }

    pub fn primary_key(mut self, column: impl Into<String>) -> Self {
        self.config.primary_key = column.into();
        self
    }

    /// Map a native type to a base type.
    pub fn map_type(mut self, native: impl Into<String>, base: BaseType) -> Self {
        self.config.types.insert(native.into().to_lowercase(), base);
        self
    }

    pub fn connect_timeout(mut self, secs: u64) -> Self {
        self.config.connect_timeout = Some(secs);
        self
    }

    /// Build the configuration
    pub fn build(self) -> GenConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GenConfig::default();
        assert!(!config.to_camel_case);
        assert!(!config.use_quotes);
        assert!(config.nullable_json);
        assert_eq!(config.primary_key, "id");
    }

    #[test]
    fn test_from_toml() {
        let config = GenConfig::from_toml(
            r#"
to_camel_case = true
ignore_tables = ["account"]
ignore_columns = ["complex.name"]

[types]
geometry = "string"
"#,
        )
        .unwrap();

        assert!(config.to_camel_case);
        assert!(config.nullable_json);
        assert!(config.ignore_tables.contains("account"));
        assert!(config.ignore_columns.contains("complex.name"));
        assert_eq!(config.types.get("geometry"), Some(&BaseType::String));
    }

    #[test]
    fn test_type_keys_lowercased() {
        let config = GenConfig::from_toml("[types]\nGEOMETRY = \"string\"\n").unwrap();
        assert_eq!(config.types.get("geometry"), Some(&BaseType::String));
        assert!(!config.types.contains_key("GEOMETRY"));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = GenConfig::from_toml("camel = true").unwrap_err();
        assert!(matches!(err, GenError::Config(_)));
    }

    #[test]
    fn test_builder() {
        let config = GenConfig::builder()
            .camel_case(true)
            .quotes(true)
            .ignore_table("account")
            .ignore_column("complex.name")
            .primary_key("name")
            .map_type("GEOMETRY", BaseType::String)
            .build();

        assert!(config.use_quotes);
        assert_eq!(config.primary_key, "name");
        assert!(config.types.contains_key("geometry"));
    }
}
