//! Literal data export.
//!
//! Turns the rows of a small reference table into a constant map keyed by
//! primary key, plus a tuple of the keys for exhaustive iteration.

use std::collections::{BTreeSet, HashSet};

use crate::decl::{Declaration, Literal};
use crate::error::{GenError, GenResult};
use crate::ident::{camel_case, pascal_case};

/// One row as returned by a query, columns in select order.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Key text used when a row has no primary key value.
pub const MISSING_KEY: &str = "undefined";

/// Text form of a primary key value.
fn stringify_key(value: Option<&serde_json::Value>) -> String {
    use serde_json::Value;

    match value {
        None => MISSING_KEY.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Emit the data map and key tuple for `rows`, in row order.
///
/// `ignore_columns` holds bare column names. Member keys are always camelCased;
/// two columns of a row camelCasing to the same key is a
/// [`GenError::NameCollision`].
pub fn emit_table_data(
    table_name: &str,
    rows: &[Row],
    ignore_columns: &BTreeSet<String>,
    primary_key: &str,
) -> GenResult<Vec<Declaration>> {
    let name = format!("{}Table", pascal_case(table_name));
    let mut entries = Vec::with_capacity(rows.len());
    let mut keys = Vec::with_capacity(rows.len());
    let mut seen = HashSet::new();

    for (i, row) in rows.iter().enumerate() {
        let key = stringify_key(row.get(primary_key));
        if !row.contains_key(primary_key) {
            tracing::warn!(
                "Row {} of {} has no '{}' column, keyed as \"{}\"",
                i,
                table_name,
                primary_key,
                MISSING_KEY
            );
        } else if !seen.insert(key.clone()) {
            tracing::warn!("Duplicate primary key \"{}\" in {}", key, table_name);
        }

        let mut members = Vec::with_capacity(row.len());
        let mut member_keys = HashSet::new();
        for (column, value) in row.iter().filter(|(c, _)| !ignore_columns.contains(*c)) {
            let member = camel_case(column);
            if !member_keys.insert(member.clone()) {
                return Err(GenError::collision(table_name, member));
            }
            members.push((member, Literal::from_json(value)));
        }

        entries.push((key.clone(), Literal::Object(members)));
        keys.push(Literal::Str(key));
    }

    Ok(vec![
        Declaration::DataMap {
            name: name.clone(),
            entries,
        },
        Declaration::KeyTuple { name, keys },
    ])
}
