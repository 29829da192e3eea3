//! Native column type → TypeScript type expression.
//!
//! Mapping priority: enum members, then the configured overrides, then the
//! built-in table. Anything left is an [`GenError::UnsupportedType`].

use nom::{
    bytes::complete::{take_while, take_while1},
    character::complete::{char, digit0, multispace0},
    combinator::eof,
    multi::{many0, many1},
    sequence::{delimited, pair, terminated},
    IResult,
};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::config::GenConfig;
use crate::error::{GenError, GenResult};
use crate::ident::string_literal;
use crate::schema::ColumnDescriptor;

/// Scalar TypeScript types a column can map to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaseType {
    String,
    Number,
    Boolean,
    #[serde(alias = "Date")]
    Date,
    #[serde(alias = "JSONValue")]
    Json,
}

impl BaseType {
    pub fn as_ts(&self) -> &'static str {
        match self {
            BaseType::String => "string",
            BaseType::Number => "number",
            BaseType::Boolean => "boolean",
            BaseType::Date => "Date",
            BaseType::Json => "JSONValue",
        }
    }
}

/// A column type before nullability.
#[derive(Debug, Clone, PartialEq)]
pub enum TsType {
    Base(BaseType),
    Array(BaseType),
    /// Literal union of enum members, in declaration order.
    Union(Vec<String>),
}

/// A complete column type expression.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeExpr {
    pub ty: TsType,
    pub nullable: bool,
}

impl TypeExpr {
    /// True when rendering needs the `JSONValue` preamble.
    pub fn uses_json(&self) -> bool {
        matches!(self.ty, TsType::Base(BaseType::Json) | TsType::Array(BaseType::Json))
    }
}

impl fmt::Display for TsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TsType::Base(base) => write!(f, "{}", base.as_ts()),
            TsType::Array(base) => write!(f, "Array<{}>", base.as_ts()),
            TsType::Union(members) => {
                let literals: Vec<String> = members.iter().map(|m| string_literal(m)).collect();
                write!(f, "{}", literals.join(" | "))
            }
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ty)?;
        if self.nullable {
            write!(f, " | null")?;
        }
        Ok(())
    }
}

/// A parsed native type token.
#[derive(Debug, Clone, PartialEq)]
pub struct NativeType {
    /// Lower-cased name with modifiers removed (`timestamp with time zone`).
    pub name: String,
    pub array: bool,
}

impl NativeType {
    /// Normalize a native type token.
    ///
    /// `varchar(255)` → `varchar`, `integer[]` → array of `integer`,
    /// `_int4` → array of `int4`. Unparseable input is kept as typed.
    pub fn parse(input: &str) -> Self {
        let (name, mut array) = match parse_native(input) {
            Ok((_, (words, dims))) => (words.join(" ").to_lowercase(), dims > 0),
            Err(_) => (input.trim().to_lowercase(), false),
        };

        let name = match name.strip_prefix('_') {
            Some(element) if !array && !element.is_empty() => {
                array = true;
                element.to_string()
            }
            _ => name,
        };

        Self { name, array }
    }
}

fn word(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric() || matches!(c, '_' | '.' | '"'))(input)
}

fn modifier(input: &str) -> IResult<&str, &str> {
    delimited(char('('), take_while(|c| c != ')'), char(')'))(input)
}

fn array_suffix(input: &str) -> IResult<&str, &str> {
    delimited(char('['), digit0, char(']'))(input)
}

fn parse_native(input: &str) -> IResult<&str, (Vec<&str>, usize)> {
    let (input, _) = multispace0(input)?;
    let (input, words) = many1(terminated(
        word,
        pair(multispace0, many0(pair(modifier, multispace0))),
    ))(input)?;
    let (input, dims) = many0(terminated(array_suffix, multispace0))(input)?;
    let (input, _) = eof(input)?;
    Ok((input, (words, dims.len())))
}

/// Built-in PostgreSQL mapping table.
fn builtin(name: &str) -> Option<BaseType> {
    let base = match name {
        "text" | "varchar" | "character varying" | "char" | "character" | "bpchar"
        | "citext" | "name" | "uuid" | "bytea" | "inet" | "cidr" | "macaddr" | "macaddr8"
        | "money" | "interval" | "xml" | "tsvector" | "tsquery" | "bit" | "varbit"
        | "bit varying" => BaseType::String,
        "int2" | "int4" | "int8" | "smallint" | "integer" | "int" | "bigint" | "smallserial"
        | "serial" | "bigserial" | "serial2" | "serial4" | "serial8" | "numeric" | "decimal"
        | "real" | "float4" | "float8" | "float" | "double precision" | "oid" => {
            BaseType::Number
        }
        "bool" | "boolean" => BaseType::Boolean,
        "date" | "time" | "timetz" | "time with time zone" | "time without time zone"
        | "timestamp" | "timestamptz" | "timestamp with time zone"
        | "timestamp without time zone" => BaseType::Date,
        "json" | "jsonb" => BaseType::Json,
        _ => return None,
    };
    Some(base)
}

/// Maps native column types to TypeScript types.
#[derive(Debug, Clone, Copy)]
pub struct TypeMapper<'a> {
    overrides: &'a BTreeMap<String, BaseType>,
}

impl<'a> TypeMapper<'a> {
    pub fn new(overrides: &'a BTreeMap<String, BaseType>) -> Self {
        Self { overrides }
    }

    pub fn from_config(config: &'a GenConfig) -> Self {
        Self::new(&config.types)
    }

    fn lookup(&self, name: &str) -> Option<BaseType> {
        self.overrides.get(name).copied().or_else(|| builtin(name))
    }

    /// Resolve a native type token without nullability.
    pub fn resolve(&self, native_type: &str) -> Option<TsType> {
        // An override may name the raw token, e.g. an array udt
        if let Some(base) = self.overrides.get(&native_type.trim().to_lowercase()) {
            return Some(TsType::Base(*base));
        }

        let native = NativeType::parse(native_type);
        let base = self.lookup(&native.name)?;
        Some(if native.array {
            TsType::Array(base)
        } else {
            TsType::Base(base)
        })
    }

    /// Map a native type, returning `None` when it has no mapping.
    pub fn map_type(
        &self,
        native_type: &str,
        nullable: bool,
        enum_members: Option<&[String]>,
    ) -> Option<TypeExpr> {
        let ty = match enum_members {
            Some(members) if !members.is_empty() => TsType::Union(members.to_vec()),
            _ => self.resolve(native_type)?,
        };
        Some(TypeExpr { ty, nullable })
    }

    /// Map a column of `table`, failing with the column's identity.
    pub fn map_column(&self, table: &str, column: &ColumnDescriptor) -> GenResult<TypeExpr> {
        self.map_type(
            &column.native_type,
            column.nullable,
            column.enum_members.as_deref(),
        )
        .ok_or_else(|| GenError::unsupported(table, &column.name, &column.native_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(native: &str, nullable: bool) -> Option<String> {
        let overrides = BTreeMap::new();
        TypeMapper::new(&overrides)
            .map_type(native, nullable, None)
            .map(|t| t.to_string())
    }

    #[test]
    fn test_scalar_families() {
        assert_eq!(render("varchar", false).as_deref(), Some("string"));
        assert_eq!(render("text", false).as_deref(), Some("string"));
        assert_eq!(render("int4", false).as_deref(), Some("number"));
        assert_eq!(render("integer", false).as_deref(), Some("number"));
        assert_eq!(render("float8", false).as_deref(), Some("number"));
        assert_eq!(render("bool", false).as_deref(), Some("boolean"));
        assert_eq!(render("timestamp", false).as_deref(), Some("Date"));
        assert_eq!(render("date", false).as_deref(), Some("Date"));
        assert_eq!(render("jsonb", false).as_deref(), Some("JSONValue"));
    }

    #[test]
    fn test_nullability_law() {
        assert_eq!(render("timestamp", true).as_deref(), Some("Date | null"));
        assert_eq!(render("json", true).as_deref(), Some("JSONValue | null"));
    }

    #[test]
    fn test_modifiers_and_arrays() {
        assert_eq!(render("varchar(255)", false).as_deref(), Some("string"));
        assert_eq!(render("NUMERIC(10, 2)", false).as_deref(), Some("number"));
        assert_eq!(
            render("timestamp(3) with time zone", false).as_deref(),
            Some("Date")
        );
        assert_eq!(render("integer[]", false).as_deref(), Some("Array<number>"));
        assert_eq!(render("_text", true).as_deref(), Some("Array<string> | null"));
    }

    #[test]
    fn test_unsupported() {
        assert_eq!(render("geometry", false), None);
        assert_eq!(render("_geometry", false), None);
    }

    #[test]
    fn test_enum_keeps_declaration_order() {
        let overrides = BTreeMap::new();
        let mapper = TypeMapper::new(&overrides);
        let members = vec!["source".to_string(), "destination".to_string()];

        let ty = mapper.map_type("integration_type_enum", false, Some(&members)).unwrap();
        assert_eq!(ty.to_string(), r#""source" | "destination""#);

        let ty = mapper.map_type("integration_type_enum", true, Some(&members)).unwrap();
        assert_eq!(ty.to_string(), r#""source" | "destination" | null"#);
    }

    #[test]
    fn test_enum_wins_over_scalar() {
        let overrides = BTreeMap::new();
        let members = vec!["a".to_string()];
        let ty = TypeMapper::new(&overrides)
            .map_type("text", false, Some(&members))
            .unwrap();
        assert_eq!(ty.to_string(), r#""a""#);
    }

    #[test]
    fn test_overrides() {
        let mut overrides = BTreeMap::new();
        overrides.insert("geometry".to_string(), BaseType::String);
        overrides.insert("int4".to_string(), BaseType::String);
        let mapper = TypeMapper::new(&overrides);

        assert_eq!(mapper.map_type("geometry", false, None).unwrap().to_string(), "string");
        assert_eq!(mapper.map_type("int4", false, None).unwrap().to_string(), "string");
        assert_eq!(
            mapper.map_type("_geometry", false, None).unwrap().to_string(),
            "Array<string>"
        );
    }

    #[test]
    fn test_map_column_error_names_column() {
        let overrides = BTreeMap::new();
        let column = ColumnDescriptor::new("shape", "geometry", false);
        let err = TypeMapper::new(&overrides).map_column("places", &column).unwrap_err();
        match err {
            GenError::UnsupportedType {
                table,
                column,
                native_type,
            } => {
                assert_eq!(table, "places");
                assert_eq!(column, "shape");
                assert_eq!(native_type, "geometry");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_uses_json() {
        let overrides = BTreeMap::new();
        let mapper = TypeMapper::new(&overrides);
        assert!(mapper.map_type("jsonb", true, None).unwrap().uses_json());
        assert!(mapper.map_type("_json", false, None).unwrap().uses_json());
        assert!(!mapper.map_type("text", false, None).unwrap().uses_json());
    }
}
