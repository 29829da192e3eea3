//! Error types for sqlts.

use thiserror::Error;

/// The main error type for generation.
#[derive(Debug, Error)]
pub enum GenError {
    /// Failed to connect to the database.
    #[error("Connection error: {0}")]
    Connection(String),

    /// An introspection or data query failed.
    #[error("Database error: {0}")]
    Database(String),

    /// The requested table does not exist in the schema.
    #[error("Table not found: '{0}'")]
    TableNotFound(String),

    /// A column's native type has no TypeScript mapping.
    #[error("Unsupported type '{native_type}' for column {table}.{column}")]
    UnsupportedType {
        table: String,
        column: String,
        native_type: String,
    },

    /// Two identifiers normalize to the same generated name.
    #[error("Name collision in {table}: '{name}' would be declared twice")]
    NameCollision { table: String, name: String },

    /// The generated source could not be formatted.
    #[error("Format error: {0}")]
    Format(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A schema file could not be parsed.
    #[error("Schema error: {0}")]
    Schema(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GenError {
    /// Create an unsupported type error for a column.
    pub fn unsupported(
        table: impl Into<String>,
        column: impl Into<String>,
        native_type: impl Into<String>,
    ) -> Self {
        Self::UnsupportedType {
            table: table.into(),
            column: column.into(),
            native_type: native_type.into(),
        }
    }

    /// Create a name collision error.
    pub fn collision(table: impl Into<String>, name: impl Into<String>) -> Self {
        Self::NameCollision {
            table: table.into(),
            name: name.into(),
        }
    }
}

/// Result type alias for generation.
pub type GenResult<T> = Result<T, GenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GenError::unsupported("account", "shape", "geometry");
        assert_eq!(
            err.to_string(),
            "Unsupported type 'geometry' for column account.shape"
        );
    }

    #[test]
    fn test_collision_display() {
        let err = GenError::collision("users", "UsersTableUserIdColumn");
        assert_eq!(
            err.to_string(),
            "Name collision in users: 'UsersTableUserIdColumn' would be declared twice"
        );
    }
}
