//! Generation entry points.
//!
//! Each entry point fetches what it needs from a provider, runs the emitters,
//! renders and formats. Either the whole artifact is returned or an error is.

use crate::config::GenConfig;
use crate::data::emit_table_data;
use crate::decl::{render, Declaration};
use crate::emit::{emit_schema, emit_single_table};
use crate::error::GenResult;
use crate::format::Formatter;
use crate::provider::SchemaProvider;
use crate::schema::SchemaDescriptor;

fn finish(decls: &[Declaration], formatter: &dyn Formatter) -> GenResult<String> {
    let source = render(decls);
    let formatted = formatter.format(&source)?;
    tracing::info!(
        "Generated {} declarations ({} bytes)",
        decls.len(),
        formatted.len()
    );
    Ok(formatted)
}

/// Type definitions for a single table.
pub async fn generate_table<P: SchemaProvider>(
    provider: &P,
    table: &str,
    config: &GenConfig,
    formatter: &dyn Formatter,
) -> GenResult<String> {
    let descriptor = provider.get_table(table).await?;
    let decls = emit_single_table(
        provider.schema_name(),
        &descriptor,
        &config.ignore_columns,
        config,
    )?;
    finish(&decls, formatter)
}

/// Type definitions for every table of the schema.
pub async fn generate_schema<P: SchemaProvider>(
    provider: &P,
    config: &GenConfig,
    formatter: &dyn Formatter,
) -> GenResult<String> {
    let schema = SchemaDescriptor {
        name: provider.schema_name().to_string(),
        tables: provider.list_tables().await?,
    };
    let decls = emit_schema(&schema, &config.ignore_tables, &config.ignore_columns, config)?;
    finish(&decls, formatter)
}

/// Literal export of a table's rows, keyed by `config.primary_key`.
///
/// `config.ignore_columns` is matched against bare column names here.
pub async fn generate_table_data<P: SchemaProvider>(
    provider: &P,
    table: &str,
    config: &GenConfig,
    formatter: &dyn Formatter,
) -> GenResult<String> {
    let rows = provider.fetch_rows(table).await?;
    tracing::debug!("Fetched {} rows from {}", rows.len(), table);

    let mut decls = vec![Declaration::Banner];
    decls.extend(emit_table_data(
        table,
        &rows,
        &config.ignore_columns,
        &config.primary_key,
    )?);
    finish(&decls, formatter)
}
