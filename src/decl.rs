//! Declaration units and the serializer.
//!
//! Emitters never build source text directly. They produce an ordered
//! `Vec<Declaration>` and [`render`] turns it into TypeScript, so layout and
//! ordering live in one place.

use std::fmt::{self, Write};

use crate::ident::string_literal;
use crate::types::TypeExpr;

/// Linter banner placed at the top of every artifact.
pub const LINT_BANNER: &str = "/* tslint:disable */\n/* eslint-disable */";

/// A literal value on the right-hand side of a constant.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    /// `"value"`
    Str(String),
    /// Already rendered source, e.g. `` `"2a"` `` or an identifier.
    Raw(String),
    Object(Vec<(String, Literal)>),
    Array(Vec<Literal>),
}

impl Literal {
    /// Literalize a JSON value. Nested object keys are kept as they are.
    pub fn from_json(value: &serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => Literal::Null,
            Value::Bool(b) => Literal::Bool(*b),
            Value::Number(n) => Literal::Number(n.clone()),
            Value::String(s) => Literal::Str(s.clone()),
            Value::Array(items) => Literal::Array(items.iter().map(Literal::from_json).collect()),
            Value::Object(map) => Literal::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), Literal::from_json(v)))
                    .collect(),
            ),
        }
    }
}

/// One top-level declaration of the generated file.
#[derive(Debug, Clone, PartialEq)]
pub enum Declaration {
    /// The linter banner.
    Banner,
    /// `export const SchemaName = "public" as const;`
    SchemaName(String),
    /// The recursive `JSONValue` aliases.
    JsonPreamble { nullable: bool },
    /// `export type AccountTableEmailColumn = string;`
    ColumnType { name: String, ty: TypeExpr },
    /// `export type AccountTable = { "email": AccountTableEmailColumn; };`
    Record {
        name: String,
        fields: Vec<(String, String)>,
    },
    /// `export const AccountTableName = "account" as const;`
    TableName { name: String, table: String },
    /// `export const AccountTableEmailColumnName = "email" as const;`
    ColumnName { name: String, literal: String },
    /// `export const AccountTableColumnNames = { ... } as const;`
    NameMap {
        name: String,
        entries: Vec<(String, String)>,
    },
    /// Exported rows keyed by primary key, with their `typeof` alias.
    DataMap {
        name: String,
        entries: Vec<(String, Literal)>,
    },
    /// Primary keys in row order, with their element type alias.
    KeyTuple { name: String, keys: Vec<Literal> },
}

impl Declaration {
    /// Single-line declarations of the same kind are rendered without a blank
    /// line between them.
    fn joins(&self, next: &Declaration) -> bool {
        matches!(
            (self, next),
            (Declaration::ColumnType { .. }, Declaration::ColumnType { .. })
                | (Declaration::ColumnName { .. }, Declaration::ColumnName { .. })
        )
    }

    pub fn is_json_preamble(&self) -> bool {
        matches!(self, Declaration::JsonPreamble { .. })
    }

    /// Identifier a table declaration introduces at the top level.
    pub fn declared_name(&self) -> Option<String> {
        match self {
            Declaration::ColumnType { name, .. } | Declaration::Record { name, .. } => {
                Some(name.clone())
            }
            Declaration::TableName { name, .. } | Declaration::ColumnName { name, .. } => {
                Some(format!("{}Name", name))
            }
            Declaration::NameMap { name, .. } => Some(format!("{}ColumnNames", name)),
            _ => None,
        }
    }

    fn write_to(&self, out: &mut String) -> fmt::Result {
        match self {
            Declaration::Banner => writeln!(out, "{}", LINT_BANNER),
            Declaration::SchemaName(schema) => writeln!(
                out,
                "export const SchemaName = {} as const;",
                string_literal(schema)
            ),
            Declaration::JsonPreamble { nullable } => {
                let null = if *nullable { " | null" } else { "" };
                writeln!(out, "export type JSONPrimitive = string | number | boolean{};", null)?;
                writeln!(out, "export type JSONValue = JSONPrimitive | JSONObject | JSONArray;")?;
                writeln!(out, "export type JSONObject = {{ [member: string]: JSONValue }};")?;
                writeln!(out, "export type JSONArray = Array<JSONValue>;")
            }
            Declaration::ColumnType { name, ty } => writeln!(out, "export type {} = {};", name, ty),
            Declaration::Record { name, fields } => {
                if fields.is_empty() {
                    return writeln!(out, "export type {} = {{}};", name);
                }
                writeln!(out, "export type {} = {{", name)?;
                for (key, ty) in fields {
                    writeln!(out, "  {}: {};", string_literal(key), ty)?;
                }
                writeln!(out, "}};")
            }
            Declaration::TableName { name, table } => writeln!(
                out,
                "export const {}Name = {} as const;",
                name,
                string_literal(table)
            ),
            Declaration::ColumnName { name, literal } => {
                writeln!(out, "export const {}Name = {} as const;", name, literal)
            }
            Declaration::NameMap { name, entries } => {
                let object = Literal::Object(
                    entries
                        .iter()
                        .map(|(k, v)| (k.clone(), Literal::Raw(format!("{}Name", v))))
                        .collect(),
                );
                write!(out, "export const {}ColumnNames = ", name)?;
                write_literal(out, &object, 0)?;
                writeln!(out, " as const;")
            }
            Declaration::DataMap { name, entries } => {
                writeln!(out, "export type {0}Data = typeof {0}Data;", name)?;
                write!(out, "export const {}Data = ", name)?;
                write_literal(out, &Literal::Object(entries.clone()), 0)?;
                writeln!(out, " as const;")
            }
            Declaration::KeyTuple { name, keys } => {
                writeln!(
                    out,
                    "export type {0}DataPrimaryKeys = (typeof {0}DataPrimaryKeys)[number];",
                    name
                )?;
                write!(out, "export const {}DataPrimaryKeys = ", name)?;
                write_literal(out, &Literal::Array(keys.clone()), 0)?;
                writeln!(out, " as const;")
            }
        }
    }
}

fn indent(out: &mut String, level: usize) {
    for _ in 0..level {
        out.push_str("  ");
    }
}

fn write_literal(out: &mut String, literal: &Literal, level: usize) -> fmt::Result {
    match literal {
        Literal::Null => write!(out, "null"),
        Literal::Bool(b) => write!(out, "{}", b),
        Literal::Number(n) => write!(out, "{}", n),
        Literal::Str(s) => write!(out, "{}", string_literal(s)),
        Literal::Raw(src) => write!(out, "{}", src),
        Literal::Object(entries) if entries.is_empty() => write!(out, "{{}}"),
        Literal::Object(entries) => {
            writeln!(out, "{{")?;
            for (i, (key, value)) in entries.iter().enumerate() {
                indent(out, level + 1);
                write!(out, "{}: ", string_literal(key))?;
                write_literal(out, value, level + 1)?;
                if i + 1 < entries.len() {
                    out.push(',');
                }
                out.push('\n');
            }
            indent(out, level);
            write!(out, "}}")
        }
        Literal::Array(items) => {
            let scalar = items
                .iter()
                .all(|i| !matches!(i, Literal::Object(_) | Literal::Array(_)));
            if scalar {
                write!(out, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(out, ", ")?;
                    }
                    write_literal(out, item, level)?;
                }
                return write!(out, "]");
            }
            writeln!(out, "[")?;
            for (i, item) in items.iter().enumerate() {
                indent(out, level + 1);
                write_literal(out, item, level + 1)?;
                if i + 1 < items.len() {
                    out.push(',');
                }
                out.push('\n');
            }
            indent(out, level);
            write!(out, "]")
        }
    }
}

/// Render declarations into TypeScript source.
pub fn render(decls: &[Declaration]) -> String {
    let mut out = String::new();
    let mut prev: Option<&Declaration> = None;

    for decl in decls {
        if let Some(p) = prev {
            if !p.joins(decl) {
                out.push('\n');
            }
        }
        // Writing into a String cannot fail
        let _ = decl.write_to(&mut out);
        prev = Some(decl);
    }

    out
}
