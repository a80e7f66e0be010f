//! Record field descriptors and column alignment.
//!
//! A [`Record`] describes its fields once, as a flat list in declaration
//! order with embedded records already inlined. Values are read and written
//! by index into that list. `#[derive(Record)]` generates the descriptor;
//! hand-written impls should cache it the same way.

use crate::error::ConversionError;
use crate::value::Value;

/// Per-field options.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FieldOptions {
    /// Skip the field in INSERTs and value maps when it holds a zero value.
    pub omit_empty: bool,
    /// Skip the field when building UPDATE values.
    pub omit_update: bool,
}

/// A resolved destination field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Field {
    /// Column name the field maps to.
    pub name: String,
    /// Table qualifier from a `table.column` rename.
    pub table: Option<String>,
    /// Struct field names from the outermost record down to this field.
    pub path: Vec<&'static str>,
    pub options: FieldOptions,
}

impl Field {
    /// A field named `name`, which may be qualified as `table.column`.
    pub fn new(name: &str, path: &'static str) -> Self {
        let (table, column) = match name.split_once('.') {
            Some((table, column)) => (Some(table.to_string()), column.to_string()),
            None => (None, name.to_string()),
        };
        Self {
            name: column,
            table,
            path: vec![path],
            options: FieldOptions::default(),
        }
    }

    pub fn omit_empty(mut self) -> Self {
        self.options.omit_empty = true;
        self
    }

    pub fn omit_update(mut self) -> Self {
        self.options.omit_update = true;
        self
    }

    /// This field as seen through an embedding field of the outer record.
    pub fn nested(&self, parent: &'static str) -> Self {
        let mut field = self.clone();
        field.path.insert(0, parent);
        field
    }

    /// Whether the field matches a column name, exactly or as snake case.
    pub fn matches(&self, column: &str) -> bool {
        self.name == column || camel_to_snake(&self.name) == column
    }
}

/// A struct whose fields can be read and written by position.
pub trait Record {
    /// Flattened field list. Embedded records are inlined in place.
    fn fields() -> &'static [Field];

    /// Value of the field at `index` in [`Record::fields`].
    fn get(&self, index: usize) -> Value;

    /// Store a value into the field at `index`.
    fn set(&mut self, index: usize, value: Value) -> Result<(), ConversionError>;
}

/// Convert a camel case name to snake case.
///
/// A boundary is placed before an uppercase character that follows a
/// non-uppercase one, so runs like `ID` and `UUID` stay together:
/// `UserID` becomes `user_id` and `UUID` becomes `uuid`.
pub fn camel_to_snake(camel: &str) -> String {
    let mut snake = String::with_capacity(camel.len() + 4);
    let mut prev_upper = false;
    for (i, ch) in camel.chars().enumerate() {
        let upper = ch.is_uppercase();
        if i > 0 && upper && !prev_upper {
            snake.push('_');
        }
        snake.extend(ch.to_lowercase());
        prev_upper = upper;
    }
    snake
}

/// Match result columns to record fields.
///
/// Returns one entry per column: the index of the matching field, or `None`
/// when the column should be discarded. If no column matched any field but
/// the counts are equal, columns are paired with fields by position.
pub fn align_columns(columns: &[String], fields: &[Field]) -> Vec<Option<usize>> {
    let aligned: Vec<Option<usize>> = columns
        .iter()
        .map(|column| fields.iter().position(|f| f.matches(column)))
        .collect();
    if aligned.iter().all(Option::is_none) && columns.len() == fields.len() {
        tracing::debug!(
            columns = columns.len(),
            "no column names matched, pairing columns with fields by position"
        );
        return (0..columns.len()).map(Some).collect();
    }
    aligned
}
