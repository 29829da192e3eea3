//! Schema descriptors.
//!
//! Passive, read-only descriptions of a schema as returned by a
//! [`SchemaProvider`](crate::provider::SchemaProvider). They can also be loaded
//! from a JSON or TOML file for offline generation.
//!
//! # Example
//! ```
//! use sqlts::schema::SchemaDescriptor;
//!
//! let json = r#"{
//!     "name": "public",
//!     "tables": [{
//!         "name": "users",
//!         "columns": [
//!             { "name": "id", "type": "int4", "nullable": false },
//!             { "name": "email", "type": "varchar", "nullable": true }
//!         ]
//!     }]
//! }"#;
//!
//! let schema = SchemaDescriptor::from_json(json).unwrap();
//! assert_eq!(schema.tables[0].columns[1].name, "email");
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{GenError, GenResult};

/// A schema: its name and tables in provider order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDescriptor {
    pub name: String,
    #[serde(default)]
    pub tables: Vec<TableDescriptor>,
}

/// A table and its columns in ordinal order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDescriptor {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<ColumnDescriptor>,
}

/// A single column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,
    /// Type token as reported by the database (e.g. `int4`, `varchar(255)`).
    #[serde(rename = "type", alias = "native_type")]
    pub native_type: String,
    #[serde(default)]
    pub nullable: bool,
    /// Members of the column's enum type, in declaration order.
    #[serde(default, rename = "enum", alias = "enum_members", skip_serializing_if = "Option::is_none")]
    pub enum_members: Option<Vec<String>>,
}

impl SchemaDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tables: Vec::new(),
        }
    }

    /// Builder: append a table.
    pub fn table(mut self, table: TableDescriptor) -> Self {
        self.tables.push(table);
        self
    }

    /// Look up a table by exact name.
    pub fn get(&self, name: &str) -> Option<&TableDescriptor> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Load schema from JSON string.
    pub fn from_json(json: &str) -> GenResult<Self> {
        serde_json::from_str(json).map_err(|e| GenError::Schema(e.to_string()))
    }

    /// Load schema from TOML string.
    pub fn from_toml(input: &str) -> GenResult<Self> {
        toml::from_str(input).map_err(|e| GenError::Schema(e.to_string()))
    }

    /// Load schema from file path (`.toml` is TOML, everything else JSON).
    pub fn from_file(path: &Path) -> GenResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            GenError::Schema(format!("Failed to read {}: {}", path.display(), e))
        })?;

        if path.extension().is_some_and(|e| e == "toml") {
            Self::from_toml(&content)
        } else {
            Self::from_json(&content)
        }
    }
}

impl TableDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    /// Builder: add a NOT NULL column.
    pub fn column(mut self, name: &str, native_type: &str) -> Self {
        self.columns.push(ColumnDescriptor::new(name, native_type, false));
        self
    }

    /// Builder: add a nullable column.
    pub fn nullable(mut self, name: &str, native_type: &str) -> Self {
        self.columns.push(ColumnDescriptor::new(name, native_type, true));
        self
    }

    /// Builder: add a NOT NULL enum column.
    pub fn enumeration(mut self, name: &str, native_type: &str, members: &[&str]) -> Self {
        let mut col = ColumnDescriptor::new(name, native_type, false);
        col.enum_members = Some(members.iter().map(|m| m.to_string()).collect());
        self.columns.push(col);
        self
    }
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, native_type: impl Into<String>, nullable: bool) -> Self {
        Self {
            name: name.into(),
            native_type: native_type.into(),
            nullable,
            enum_members: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_from_json_keeps_order() {
        let json = r#"{
            "name": "public",
            "tables": [{
                "name": "requests",
                "columns": [
                    { "name": "name", "type": "varchar" },
                    { "name": "integration_type", "type": "integration_type_enum",
                      "enum": ["source", "destination"] },
                    { "name": "some_int", "type": "int4", "nullable": true }
                ]
            }]
        }"#;

        let schema = SchemaDescriptor::from_json(json).unwrap();
        let table = schema.get("requests").unwrap();
        let names: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["name", "integration_type", "some_int"]);
        assert_eq!(
            table.columns[1].enum_members.as_deref(),
            Some(&["source".to_string(), "destination".to_string()][..])
        );
        assert!(table.columns[2].nullable);
        assert!(!table.columns[0].nullable);
    }

    #[test]
    fn test_schema_from_toml() {
        let input = r#"
name = "public"

[[tables]]
name = "account"
columns = [
    { name = "2a", type = "integer" },
    { name = "last_login", type = "timestamp", nullable = true },
]
"#;
        let schema = SchemaDescriptor::from_toml(input).unwrap();
        assert_eq!(schema.name, "public");
        assert_eq!(schema.tables[0].columns[0].name, "2a");
        assert!(schema.tables[0].columns[1].nullable);
    }

    #[test]
    fn test_invalid_json_is_schema_error() {
        let err = SchemaDescriptor::from_json("{ not json").unwrap_err();
        assert!(matches!(err, GenError::Schema(_)));
    }

    #[test]
    fn test_table_builder() {
        let table = TableDescriptor::new("requests")
            .column("name", "varchar")
            .enumeration("integration_type", "integration_type_enum", &["source", "destination"])
            .nullable("some_int", "int4");

        assert_eq!(table.columns.len(), 3);
        assert!(table.columns[2].nullable);
        assert!(table.columns[1].enum_members.is_some());
    }
}
