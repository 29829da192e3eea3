//! Table and schema emitters.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::config::GenConfig;
use crate::decl::Declaration;
use crate::error::{GenError, GenResult};
use crate::ident::Identifiers;
use crate::schema::{SchemaDescriptor, TableDescriptor};
use crate::types::TypeMapper;

/// True if any column type in `decls` resolved to `JSONValue`.
pub fn uses_json(decls: &[Declaration]) -> bool {
    decls
        .iter()
        .any(|d| matches!(d, Declaration::ColumnType { ty, .. } if ty.uses_json()))
}

/// Emit the declaration block of one table.
///
/// Columns listed as `table.column` in `ignore_columns` are skipped; the rest
/// keep their ordinal order in every block.
pub fn emit_table(
    table: &TableDescriptor,
    ignore_columns: &BTreeSet<String>,
    config: &GenConfig,
) -> GenResult<Vec<Declaration>> {
    let ids = Identifiers::from_config(config);
    let mapper = TypeMapper::from_config(config);
    let table_alias = ids.table_alias(&table.name);

    let columns: Vec<_> = table
        .columns
        .iter()
        .filter(|c| !ignore_columns.contains(&format!("{}.{}", table.name, c.name)))
        .collect();

    let mut aliases = HashSet::new();
    let mut keys = HashSet::new();
    // (alias, record key, column)
    let mut named = Vec::with_capacity(columns.len());

    for column in columns {
        let alias = ids.type_alias(&table.name, &column.name);
        let key = ids.record_key(&column.name);
        if !aliases.insert(alias.clone()) {
            return Err(GenError::collision(&table.name, alias));
        }
        if !keys.insert(key.clone()) {
            return Err(GenError::collision(&table.name, key));
        }
        named.push((alias, key, column));
    }

    let mut decls = Vec::with_capacity(named.len() * 2 + 3);

    for (alias, _, column) in &named {
        decls.push(Declaration::ColumnType {
            name: alias.clone(),
            ty: mapper.map_column(&table.name, column)?,
        });
    }

    decls.push(Declaration::Record {
        name: table_alias.clone(),
        fields: named
            .iter()
            .map(|(alias, key, _)| (key.clone(), alias.clone()))
            .collect(),
    });

    decls.push(Declaration::TableName {
        name: table_alias.clone(),
        table: table.name.clone(),
    });

    for (alias, _, column) in &named {
        decls.push(Declaration::ColumnName {
            name: alias.clone(),
            literal: ids.quoted_literal(&column.name),
        });
    }

    decls.push(Declaration::NameMap {
        name: table_alias,
        entries: named
            .iter()
            .map(|(alias, key, _)| (key.clone(), alias.clone()))
            .collect(),
    });

    Ok(decls)
}

fn with_header(
    schema_name: &str,
    blocks: Vec<Declaration>,
    config: &GenConfig,
) -> Vec<Declaration> {
    let mut decls = Vec::with_capacity(blocks.len() + 3);
    decls.push(Declaration::Banner);
    decls.push(Declaration::SchemaName(schema_name.to_string()));
    if uses_json(&blocks) {
        decls.push(Declaration::JsonPreamble {
            nullable: config.nullable_json,
        });
    }
    decls.extend(blocks);
    decls
}

/// Emit a whole schema.
///
/// Ignored tables are dropped (unknown names are a no-op), the rest are sorted
/// by name. The JSON preamble is emitted once, ahead of all tables, when any
/// surviving column needs it. Two tables declaring the same identifier is a
/// [`GenError::NameCollision`].
pub fn emit_schema(
    schema: &SchemaDescriptor,
    ignore_tables: &BTreeSet<String>,
    ignore_columns: &BTreeSet<String>,
    config: &GenConfig,
) -> GenResult<Vec<Declaration>> {
    let mut tables: Vec<&TableDescriptor> = schema
        .tables
        .iter()
        .filter(|t| !ignore_tables.contains(&t.name))
        .collect();
    tables.sort_by(|a, b| a.name.cmp(&b.name));

    // Every top-level identifier, with the table that declared it
    let mut declared: HashMap<String, &str> = HashMap::new();
    let mut blocks = Vec::new();

    for table in tables {
        tracing::debug!("Emitting table {} ({} columns)", table.name, table.columns.len());
        let block = emit_table(table, ignore_columns, config)?;

        for name in block.iter().filter_map(Declaration::declared_name) {
            if let Some(other) = declared.insert(name.clone(), &table.name) {
                let scope = if other == table.name {
                    table.name.clone()
                } else {
                    format!("{} and {}", other, table.name)
                };
                return Err(GenError::collision(scope, name));
            }
        }
        blocks.extend(block);
    }

    Ok(with_header(&schema.name, blocks, config))
}

/// Emit one table with the schema header, as a standalone artifact.
pub fn emit_single_table(
    schema_name: &str,
    table: &TableDescriptor,
    ignore_columns: &BTreeSet<String>,
    config: &GenConfig,
) -> GenResult<Vec<Declaration>> {
    let blocks = emit_table(table, ignore_columns, config)?;
    Ok(with_header(schema_name, blocks, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decl::render;
    use pretty_assertions::assert_eq;

    fn account() -> TableDescriptor {
        TableDescriptor::new("account")
            .column("username", "varchar(50)")
            .column("2a", "integer")
            .nullable("last_login", "timestamp")
    }

    fn names(decls: &[Declaration]) -> Vec<String> {
        decls
            .iter()
            .filter_map(|d| match d {
                Declaration::ColumnType { name, .. } => Some(name.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_block_order() {
        let decls = emit_table(&account(), &BTreeSet::new(), &GenConfig::default()).unwrap();
        let kinds: Vec<&str> = decls
            .iter()
            .map(|d| match d {
                Declaration::ColumnType { .. } => "type",
                Declaration::Record { .. } => "record",
                Declaration::TableName { .. } => "table",
                Declaration::ColumnName { .. } => "name",
                Declaration::NameMap { .. } => "map",
                _ => "other",
            })
            .collect();
        assert_eq!(
            kinds,
            ["type", "type", "type", "record", "table", "name", "name", "name", "map"]
        );
    }

    #[test]
    fn test_column_order_is_ordinal() {
        let decls = emit_table(&account(), &BTreeSet::new(), &GenConfig::default()).unwrap();
        assert_eq!(
            names(&decls),
            [
                "AccountTableUsernameColumn",
                "AccountTable2aColumn",
                "AccountTableLastLoginColumn"
            ]
        );
    }

    #[test]
    fn test_quoted_digit_column() {
        let table = TableDescriptor::new("account").column("2a", "integer");
        let config = GenConfig::builder().camel_case(true).quotes(true).build();
        let out = render(&emit_table(&table, &BTreeSet::new(), &config).unwrap());

        assert!(out.contains("export type AccountTable2aColumn = number;\n"));
        assert!(out.contains("export const AccountTable2aColumnName = `\"2a\"` as const;\n"));
        assert!(out.contains("  \"2a\": AccountTable2aColumn;\n"));
    }

    #[test]
    fn test_ignore_columns_only_hit_their_table() {
        let ignore: BTreeSet<String> = ["account.2a".to_string(), "other.username".to_string()]
            .into_iter()
            .collect();
        let decls = emit_table(&account(), &ignore, &GenConfig::default()).unwrap();
        let out = render(&decls);

        assert_eq!(
            names(&decls),
            ["AccountTableUsernameColumn", "AccountTableLastLoginColumn"]
        );
        assert!(!out.contains("2a"));
    }

    #[test]
    fn test_all_columns_ignored() {
        let table = TableDescriptor::new("solo").column("id", "int4");
        let ignore: BTreeSet<String> = ["solo.id".to_string()].into_iter().collect();
        let out = render(&emit_table(&table, &ignore, &GenConfig::default()).unwrap());
        assert!(out.contains("export type SoloTable = {};"));
        assert!(out.contains("export const SoloTableColumnNames = {} as const;"));
    }

    #[test]
    fn test_unsupported_type_fails_whole_table() {
        let table = TableDescriptor::new("places")
            .column("id", "int4")
            .column("shape", "geometry");
        let err = emit_table(&table, &BTreeSet::new(), &GenConfig::default()).unwrap_err();
        assert!(matches!(err, GenError::UnsupportedType { ref column, .. } if column == "shape"));
    }

    #[test]
    fn test_alias_collision() {
        let table = TableDescriptor::new("users")
            .column("user_id", "int4")
            .column("userId", "int4");
        let err = emit_table(&table, &BTreeSet::new(), &GenConfig::default()).unwrap_err();
        assert!(matches!(err, GenError::NameCollision { .. }));
    }

    #[test]
    fn test_schema_sorted_and_filtered() {
        let schema = SchemaDescriptor::new("public")
            .table(TableDescriptor::new("requests").column("url", "varchar"))
            .table(account())
            .table(TableDescriptor::new("complex").column("id", "json"));

        let ignore_tables: BTreeSet<String> =
            ["account".to_string(), "missing".to_string()].into_iter().collect();
        let decls =
            emit_schema(&schema, &ignore_tables, &BTreeSet::new(), &GenConfig::default()).unwrap();

        assert_eq!(decls[0], Declaration::Banner);
        assert_eq!(decls[1], Declaration::SchemaName("public".into()));
        assert_eq!(decls[2], Declaration::JsonPreamble { nullable: true });
        assert_eq!(names(&decls), ["ComplexTableIdColumn", "RequestsTableUrlColumn"]);
    }

    #[test]
    fn test_preamble_omitted_without_json() {
        let schema = SchemaDescriptor::new("public").table(account());
        let decls = emit_schema(
            &schema,
            &BTreeSet::new(),
            &BTreeSet::new(),
            &GenConfig::default(),
        )
        .unwrap();
        assert!(!decls.iter().any(|d| d.is_json_preamble()));
    }

    #[test]
    fn test_preamble_dropped_when_json_column_ignored() {
        let schema = SchemaDescriptor::new("public")
            .table(TableDescriptor::new("complex").column("id", "json").column("name", "text"));
        let ignore: BTreeSet<String> = ["complex.id".to_string()].into_iter().collect();
        let decls = emit_schema(&schema, &BTreeSet::new(), &ignore, &GenConfig::default()).unwrap();
        assert!(!decls.iter().any(|d| d.is_json_preamble()));
    }

    #[test]
    fn test_table_alias_collision() {
        let schema = SchemaDescriptor::new("public")
            .table(TableDescriptor::new("user_account"))
            .table(TableDescriptor::new("userAccount"));
        let err = emit_schema(
            &schema,
            &BTreeSet::new(),
            &BTreeSet::new(),
            &GenConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, GenError::NameCollision { ref name, .. } if name == "UserAccountTable"));
    }

    #[test]
    fn test_column_alias_collision_across_tables() {
        let schema = SchemaDescriptor::new("public")
            .table(TableDescriptor::new("a_table_b").column("c", "int4"))
            .table(TableDescriptor::new("a").column("b_table_c", "int4"));
        let err = emit_schema(
            &schema,
            &BTreeSet::new(),
            &BTreeSet::new(),
            &GenConfig::default(),
        )
        .unwrap_err();

        match err {
            GenError::NameCollision { table, name } => {
                assert_eq!(table, "a and a_table_b");
                assert_eq!(name, "ATableBTableCColumn");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_single_table_header() {
        let table = TableDescriptor::new("complex").nullable("payload", "jsonb");
        let config = GenConfig::builder().nullable_json(false).build();
        let decls = emit_single_table("public", &table, &BTreeSet::new(), &config).unwrap();
        assert_eq!(decls[2], Declaration::JsonPreamble { nullable: false });
        assert_eq!(decls.iter().filter(|d| d.is_json_preamble()).count(), 1);
    }
}
