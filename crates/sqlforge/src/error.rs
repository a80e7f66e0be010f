//! Error types for sqlforge.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

/// Result type alias for sqlforge operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for sqlforge operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Schema declaration failed (blank names, duplicate columns, dangling keys).
    #[error("Schema error: {0}")]
    Schema(String),

    /// Validation errors accumulated while building a statement.
    #[error("{0}")]
    Statement(StmtErrors),

    /// A clause could not be rendered.
    #[error("Compile error: {0}")]
    Compile(String),

    /// No dialect is registered under the requested name.
    #[error("Unknown dialect: {0}")]
    UnknownDialect(String),

    /// A dialect is already registered under the name.
    #[error("Dialect already registered: {0}")]
    DuplicateDialect(String),

    /// The cursor produced no rows where one was required.
    #[error("No rows in result set")]
    NoRows,

    /// A column value could not be converted into its destination.
    #[error("Decode error on column '{column}': {source}")]
    Decode {
        column: String,
        #[source]
        source: ConversionError,
    },

    /// The destination cannot hold the shape of the result.
    #[error("Unsupported destination: {0}")]
    UnsupportedShape(String),

    /// The row cursor reported an error.
    #[error("Cursor error: {0}")]
    Cursor(String),

    /// Database configuration is missing or malformed.
    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Driver error from tokio-postgres.
    #[cfg(feature = "postgres")]
    #[error("Postgres error: {0}")]
    Postgres(#[from] tokio_postgres::Error),
}

impl Error {
    /// Create a schema construction error.
    pub fn schema(msg: impl Into<String>) -> Self {
        Error::Schema(msg.into())
    }

    /// Create a compile-time error.
    pub fn compile(msg: impl Into<String>) -> Self {
        Error::Compile(msg.into())
    }

    /// Create a decode error for a column.
    pub fn decode(column: impl Into<String>, source: ConversionError) -> Self {
        Error::Decode {
            column: column.into(),
            source,
        }
    }

    /// Create an unsupported destination error.
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Error::UnsupportedShape(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Check if this is a "no rows" error.
    pub fn is_no_rows(&self) -> bool {
        matches!(self, Error::NoRows)
    }

    /// Check if this error carries deferred statement errors.
    pub fn is_statement(&self) -> bool {
        matches!(self, Error::Statement(_))
    }

    /// Check if this is a decode error.
    pub fn is_decode(&self) -> bool {
        matches!(self, Error::Decode { .. })
    }
}

/// Location of an error tied to a single column of a statement.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldError {
    pub column: String,
    pub table: String,
    pub clause: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{} in {}", self.table, self.column, self.clause)
    }
}

/// Accumulator of validation failures recorded during statement construction.
///
/// Builders never stop on the first problem. Every failure is recorded here
/// and surfaced once, as a single [`Error::Statement`], when the statement is
/// compiled.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StmtErrors {
    meta: Vec<String>,
    fields: BTreeMap<FieldError, String>,
}

impl StmtErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a statement-level error.
    pub fn add_meta(&mut self, msg: impl Into<String>) {
        self.meta.push(msg.into());
    }

    /// Record an error scoped to one column of one clause.
    pub fn add_field(
        &mut self,
        column: impl Into<String>,
        table: impl Into<String>,
        clause: impl Into<String>,
        msg: impl Into<String>,
    ) {
        let key = FieldError {
            column: column.into(),
            table: table.into(),
            clause: clause.into(),
        };
        self.fields.insert(key, msg.into());
    }

    /// Fold another accumulator into this one.
    pub fn extend(&mut self, other: StmtErrors) {
        self.meta.extend(other.meta);
        self.fields.extend(other.fields);
    }

    pub fn exist(&self) -> bool {
        !self.meta.is_empty() || !self.fields.is_empty()
    }

    pub fn meta(&self) -> &[String] {
        &self.meta
    }

    pub fn fields(&self) -> impl Iterator<Item = (&FieldError, &str)> {
        self.fields.iter().map(|(k, v)| (k, v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.meta.len() + self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        !self.exist()
    }

    /// Return `Err(Error::Statement)` if anything was recorded.
    pub fn check(&self) -> Result<()> {
        if self.exist() {
            Err(Error::Statement(self.clone()))
        } else {
            Ok(())
        }
    }
}

impl fmt::Display for StmtErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = self.meta.clone();
        parts.extend(
            self.fields
                .iter()
                .map(|(field, msg)| format!("{msg} ({field})")),
        );
        f.write_str(&parts.join("; "))
    }
}

/// A value could not be converted into the requested Rust type.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("expected {expected}, found {found}")]
pub struct ConversionError {
    pub expected: &'static str,
    pub found: String,
}

impl ConversionError {
    pub fn new(expected: &'static str, found: impl Into<String>) -> Self {
        Self {
            expected,
            found: found.into(),
        }
    }
}
