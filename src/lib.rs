//! # sqlts
//!
//! > **Your schema, as TypeScript.**
//!
//! sqlts reads a relational schema and emits TypeScript declarations for every
//! table: one alias per column, a record type, and name constants. Small
//! reference tables can also be exported as literal data.
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use sqlts::prelude::*;
//!
//! let db = PgProvider::connect("postgres://localhost/db", &GenConfig::default()).await?;
//! let code = generate_schema(&db, &GenConfig::default(), &CanonicalFormatter).await?;
//! ```
//!
//! ## Output
//!
//! | Declaration                         | Example                                   |
//! |-------------------------------------|-------------------------------------------|
//! | Column alias                        | `export type AccountTableEmailColumn = string;` |
//! | Record type                         | `export type AccountTable = { ... };`     |
//! | Table name                          | `export const AccountTableName = "account" as const;` |
//! | Column name                         | `export const AccountTableEmailColumnName = "email" as const;` |
//! | Column name map                     | `export const AccountTableColumnNames = { ... } as const;` |

pub mod config;
pub mod data;
pub mod decl;
pub mod emit;
pub mod error;
pub mod format;
pub mod generate;
pub mod ident;
pub mod provider;
pub mod schema;
pub mod types;

pub mod prelude {
    pub use crate::config::GenConfig;
    pub use crate::data::{emit_table_data, Row};
    pub use crate::decl::{render, Declaration, Literal};
    pub use crate::emit::{emit_schema, emit_single_table, emit_table};
    pub use crate::error::*;
    pub use crate::format::{CanonicalFormatter, Formatter, PrettierFormatter};
    pub use crate::generate::{generate_schema, generate_table, generate_table_data};
    pub use crate::provider::{MemoryProvider, PgProvider, SchemaProvider};
    pub use crate::schema::{ColumnDescriptor, SchemaDescriptor, TableDescriptor};
    pub use crate::types::{BaseType, TypeMapper};
}

/// Render a schema descriptor to TypeScript without touching a database.
///
/// # Example
///
/// ```
/// use sqlts::prelude::*;
///
/// let schema = SchemaDescriptor::new("public")
///     .table(TableDescriptor::new("account").column("email", "varchar"));
/// let code = sqlts::infer(&schema, &GenConfig::default()).unwrap();
/// assert!(code.contains("export type AccountTableEmailColumn = string;"));
/// ```
pub fn infer(schema: &schema::SchemaDescriptor, config: &config::GenConfig) -> error::GenResult<String> {
    let decls = emit::emit_schema(schema, &config.ignore_tables, &config.ignore_columns, config)?;
    format::Formatter::format(&format::CanonicalFormatter, &decl::render(&decls))
}
