//! Identifier normalization.
//!
//! Turns raw SQL identifiers into TypeScript alias names, record keys and
//! quoted literal forms.

use crate::config::GenConfig;

/// Characters that separate words in a SQL identifier.
fn is_delimiter(c: char) -> bool {
    matches!(c, '_' | '-' | '.' | ' ')
}

/// PascalCase an identifier.
///
/// Delimiters are dropped and the next character upper-cased. Everything else
/// is kept as is, so uppercase runs survive (`userID` → `UserID`) and a digit
/// never starts a new word (`2a` → `2a`).
pub fn pascal_case(ident: &str) -> String {
    let mut out = String::with_capacity(ident.len());
    let mut upper_next = true;

    for c in ident.chars() {
        if is_delimiter(c) {
            upper_next = true;
            continue;
        }
        if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }

    out
}

/// camelCase an identifier.
///
/// Same as [`pascal_case`] except the first character is lower-cased, unless it
/// starts an uppercase run in the raw identifier (`ID_value` → `IDValue`,
/// `x_coordinate` → `xCoordinate`).
pub fn camel_case(ident: &str) -> String {
    let pascal = pascal_case(ident);
    if starts_uppercase_run(ident) {
        return pascal;
    }

    let mut chars = pascal.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// The first word opens with two adjacent uppercase characters.
fn starts_uppercase_run(ident: &str) -> bool {
    let mut chars = ident.chars().skip_while(|c| is_delimiter(*c));
    matches!(
        (chars.next(), chars.next()),
        (Some(a), Some(b)) if a.is_uppercase() && b.is_uppercase()
    )
}

/// Quote a string as a double-quoted TypeScript string literal.
pub fn string_literal(value: &str) -> String {
    // JSON string escaping is valid TypeScript string escaping
    serde_json::to_string(value).unwrap_or_else(|_| format!("\"{}\"", value))
}

/// Wrap a double-quoted literal in backticks (`` `"name"` ``).
fn template_literal(value: &str) -> String {
    let inner = string_literal(value).replace('`', "\\`").replace("${", "\\${");
    format!("`{}`", inner)
}

/// Name builder for one generation run.
#[derive(Debug, Clone, Copy)]
pub struct Identifiers {
    to_camel_case: bool,
    use_quotes: bool,
}

impl Identifiers {
    pub fn new(to_camel_case: bool, use_quotes: bool) -> Self {
        Self {
            to_camel_case,
            use_quotes,
        }
    }

    pub fn from_config(config: &GenConfig) -> Self {
        Self::new(config.to_camel_case, config.use_quotes)
    }

    /// `Pascal(table) + "Table"`.
    pub fn table_alias(&self, table: &str) -> String {
        format!("{}Table", pascal_case(table))
    }

    /// `Pascal(table) + "Table" + Pascal(column) + "Column"`.
    pub fn type_alias(&self, table: &str, column: &str) -> String {
        format!("{}{}Column", self.table_alias(table), pascal_case(column))
    }

    /// Raw key used for a column in record types and name maps.
    pub fn record_key(&self, column: &str) -> String {
        if self.to_camel_case {
            camel_case(column)
        } else {
            column.to_string()
        }
    }

    /// Literal text of a column name constant.
    pub fn quoted_literal(&self, column: &str) -> String {
        if self.use_quotes {
            template_literal(column)
        } else {
            string_literal(column)
        }
    }
}
