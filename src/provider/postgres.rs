//! PostgreSQL introspection using sqlx.
//!
//! Columns come from `information_schema.columns` in ordinal order, enum
//! members from `pg_enum` in declaration order.

use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Row as _;
use std::collections::HashMap;
use std::time::Duration;

use super::SchemaProvider;
use crate::config::GenConfig;
use crate::data::Row;
use crate::error::{GenError, GenResult};
use crate::schema::{ColumnDescriptor, TableDescriptor};

const DEFAULT_SCHEMA: &str = "public";

const COLUMNS_SQL: &str = "\
SELECT c.table_name::text AS table_name,
       c.column_name::text AS column_name,
       c.udt_schema::text AS udt_schema,
       c.udt_name::text AS udt_name,
       c.is_nullable::text AS is_nullable
FROM information_schema.columns c
WHERE c.table_schema = $1
ORDER BY c.table_name, c.ordinal_position";

const TABLE_COLUMNS_SQL: &str = "\
SELECT c.table_name::text AS table_name,
       c.column_name::text AS column_name,
       c.udt_schema::text AS udt_schema,
       c.udt_name::text AS udt_name,
       c.is_nullable::text AS is_nullable
FROM information_schema.columns c
WHERE c.table_schema = $1 AND c.table_name = $2
ORDER BY c.ordinal_position";

const ENUMS_SQL: &str = "\
SELECT n.nspname::text AS schema, t.typname::text AS name, e.enumlabel::text AS label
FROM pg_type t
JOIN pg_enum e ON e.enumtypid = t.oid
JOIN pg_namespace n ON n.oid = t.typnamespace
ORDER BY n.nspname, t.typname, e.enumsortorder";

/// Enum members keyed by (schema, type name).
type EnumMap = HashMap<(String, String), Vec<String>>;

/// A live PostgreSQL schema.
#[derive(Clone)]
pub struct PgProvider {
    pool: PgPool,
    schema: String,
}

/// Split the `currentSchema` parameter off a connection URL.
///
/// `postgres://h/db?currentSchema=app&sslmode=disable` →
/// (`postgres://h/db?sslmode=disable`, `Some("app")`).
pub fn split_schema_param(url: &str) -> (String, Option<String>) {
    let Some((base, query)) = url.split_once('?') else {
        return (url.to_string(), None);
    };

    let mut schema = None;
    let rest: Vec<&str> = query
        .split('&')
        .filter(|pair| match pair.split_once('=') {
            Some(("currentSchema", value)) => {
                schema = Some(value.to_string());
                false
            }
            _ => true,
        })
        .collect();

    if rest.is_empty() {
        (base.to_string(), schema)
    } else {
        (format!("{}?{}", base, rest.join("&")), schema)
    }
}

/// Quote an identifier for interpolation into SQL.
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

impl PgProvider {
    /// Connect using a connection URL.
    ///
    /// The schema defaults to `public`; `?currentSchema=<name>` selects another.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let db = PgProvider::connect("postgres://localhost/db", &GenConfig::default()).await?;
    /// ```
    pub async fn connect(url: &str, config: &GenConfig) -> GenResult<Self> {
        let (url, schema) = split_schema_param(url);
        let schema = schema.unwrap_or_else(|| DEFAULT_SCHEMA.to_string());

        let mut options = PgPoolOptions::new().max_connections(5);
        if let Some(secs) = config.connect_timeout {
            options = options.acquire_timeout(Duration::from_secs(secs));
        }

        let pool = options
            .connect(&url)
            .await
            .map_err(|e| GenError::Connection(e.to_string()))?;

        tracing::info!("Connected to PostgreSQL, schema '{}'", schema);
        Ok(Self { pool, schema })
    }

    async fn enums(&self) -> GenResult<EnumMap> {
        let rows = sqlx::query(ENUMS_SQL)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| GenError::Database(e.to_string()))?;

        let mut enums = EnumMap::new();
        for row in rows {
            let schema: String = row.try_get("schema").map_err(db_err)?;
            let name: String = row.try_get("name").map_err(db_err)?;
            let label: String = row.try_get("label").map_err(db_err)?;
            enums.entry((schema, name)).or_default().push(label);
        }
        Ok(enums)
    }

    /// Group column rows into tables, keeping first-seen table order.
    fn build_tables(
        rows: Vec<sqlx::postgres::PgRow>,
        enums: &EnumMap,
    ) -> GenResult<Vec<TableDescriptor>> {
        let mut tables: Vec<TableDescriptor> = Vec::new();

        for row in rows {
            let table: String = row.try_get("table_name").map_err(db_err)?;
            let name: String = row.try_get("column_name").map_err(db_err)?;
            let udt_schema: String = row.try_get("udt_schema").map_err(db_err)?;
            let udt_name: String = row.try_get("udt_name").map_err(db_err)?;
            let is_nullable: String = row.try_get("is_nullable").map_err(db_err)?;

            let mut column = ColumnDescriptor::new(name, udt_name.as_str(), is_nullable == "YES");
            column.enum_members = enums.get(&(udt_schema, udt_name)).cloned();

            match tables.last_mut() {
                Some(t) if t.name == table => t.columns.push(column),
                _ => {
                    let mut t = TableDescriptor::new(table);
                    t.columns.push(column);
                    tables.push(t);
                }
            }
        }

        Ok(tables)
    }
}

fn db_err(e: sqlx::Error) -> GenError {
    GenError::Database(e.to_string())
}

impl SchemaProvider for PgProvider {
    fn schema_name(&self) -> &str {
        &self.schema
    }

    async fn get_table(&self, name: &str) -> GenResult<TableDescriptor> {
        let enums = self.enums().await?;
        let rows = sqlx::query(TABLE_COLUMNS_SQL)
            .bind(&self.schema)
            .bind(name)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        Self::build_tables(rows, &enums)?
            .into_iter()
            .next()
            .ok_or_else(|| GenError::TableNotFound(name.to_string()))
    }

    async fn list_tables(&self) -> GenResult<Vec<TableDescriptor>> {
        let enums = self.enums().await?;
        let rows = sqlx::query(COLUMNS_SQL)
            .bind(&self.schema)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        let tables = Self::build_tables(rows, &enums)?;
        tracing::debug!("Introspected {} tables in '{}'", tables.len(), self.schema);
        Ok(tables)
    }

    async fn fetch_rows(&self, table: &str) -> GenResult<Vec<Row>> {
        let sql = format!(
            "SELECT row_to_json(t)::text AS row FROM {}.{} t",
            quote_ident(&self.schema),
            quote_ident(table)
        );
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        rows.iter()
            .map(|row| {
                let text: String = row.try_get("row").map_err(db_err)?;
                serde_json::from_str(&text).map_err(|e| GenError::Database(e.to_string()))
            })
            .collect()
    }
}
