//! In-memory provider backed by a schema file.

use std::collections::HashMap;
use std::path::Path;

use super::SchemaProvider;
use crate::data::Row;
use crate::error::{GenError, GenResult};
use crate::schema::{SchemaDescriptor, TableDescriptor};

/// Serves a fixed [`SchemaDescriptor`] and optional row sets.
#[derive(Debug, Clone)]
pub struct MemoryProvider {
    schema: SchemaDescriptor,
    rows: HashMap<String, Vec<Row>>,
}

impl MemoryProvider {
    pub fn new(schema: SchemaDescriptor) -> Self {
        Self {
            schema,
            rows: HashMap::new(),
        }
    }

    /// Load the schema from a JSON or TOML file.
    pub fn from_file(path: &Path) -> GenResult<Self> {
        Ok(Self::new(SchemaDescriptor::from_file(path)?))
    }

    /// Builder: register the rows of a table.
    pub fn with_rows(mut self, table: impl Into<String>, rows: Vec<Row>) -> Self {
        self.rows.insert(table.into(), rows);
        self
    }

    /// Load rows of `table` from a JSON array of objects.
    pub fn load_rows(self, table: impl Into<String>, path: &Path) -> GenResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            GenError::Schema(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let rows: Vec<Row> =
            serde_json::from_str(&content).map_err(|e| GenError::Schema(e.to_string()))?;
        Ok(self.with_rows(table, rows))
    }
}

impl SchemaProvider for MemoryProvider {
    fn schema_name(&self) -> &str {
        &self.schema.name
    }

    async fn get_table(&self, name: &str) -> GenResult<TableDescriptor> {
        self.schema
            .get(name)
            .cloned()
            .ok_or_else(|| GenError::TableNotFound(name.to_string()))
    }

    async fn list_tables(&self) -> GenResult<Vec<TableDescriptor>> {
        Ok(self.schema.tables.clone())
    }

    async fn fetch_rows(&self, table: &str) -> GenResult<Vec<Row>> {
        if self.schema.get(table).is_none() && !self.rows.contains_key(table) {
            return Err(GenError::TableNotFound(table.to_string()));
        }
        Ok(self.rows.get(table).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> MemoryProvider {
        MemoryProvider::new(
            SchemaDescriptor::new("public")
                .table(TableDescriptor::new("requests").column("name", "varchar")),
        )
    }

    #[tokio::test]
    async fn test_get_table() {
        let table = provider().get_table("requests").await.unwrap();
        assert_eq!(table.columns.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_table() {
        let err = provider().get_table("nope").await.unwrap_err();
        assert!(matches!(err, GenError::TableNotFound(ref t) if t == "nope"));
        assert!(provider().fetch_rows("nope").await.is_err());
    }

    #[tokio::test]
    async fn test_rows_default_empty() {
        assert!(provider().fetch_rows("requests").await.unwrap().is_empty());
    }
}
