//! Schema providers.
//!
//! A provider turns a data source into [`SchemaDescriptor`]s. All I/O happens
//! here and is awaited before any emitter runs.

pub mod memory;
pub mod postgres;

use std::future::Future;

use crate::data::Row;
use crate::error::GenResult;
use crate::schema::TableDescriptor;

pub use memory::MemoryProvider;
pub use postgres::PgProvider;

#[cfg(doc)]
use crate::schema::SchemaDescriptor;

/// Source of table descriptors and rows.
///
/// Enum columns must come back with their members resolved.
pub trait SchemaProvider {
    /// Name of the schema being described.
    fn schema_name(&self) -> &str;

    /// One table, or [`GenError::TableNotFound`](crate::error::GenError::TableNotFound).
    fn get_table(&self, name: &str) -> impl Future<Output = GenResult<TableDescriptor>> + Send;

    /// All tables, in the provider's own order.
    fn list_tables(&self) -> impl Future<Output = GenResult<Vec<TableDescriptor>>> + Send;

    /// Every row of a table, in query order.
    fn fetch_rows(&self, table: &str) -> impl Future<Output = GenResult<Vec<Row>>> + Send;
}
