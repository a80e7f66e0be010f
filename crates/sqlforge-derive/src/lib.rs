//! Derive macros for sqlforge
//!
//! Provides `#[derive(Record)]`.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod attrs;
mod record;

/// Derive `Record` and `Destination` for a struct with named fields.
///
/// # Example
///
/// ```ignore
/// use sqlforge::Record;
///
/// #[derive(Debug, Default, Record)]
/// struct User {
///     #[db(omit_empty)]
///     id: i64,
///     name: String,
///     #[db(rename = "users.email")]
///     email: String,
///     #[db(flatten)]
///     audit: Audit,
///     #[db(skip)]
///     cached: Option<String>,
/// }
/// ```
///
/// # Attributes
///
/// - `#[db(rename = "name")]` - Column name, optionally qualified as `table.column`
/// - `#[db(skip)]` - Leave the field out entirely
/// - `#[db(omit_empty)]` - Skip zero values in INSERTs and value maps
/// - `#[db(omit_update)]` - Skip the field in UPDATE values
/// - `#[db(flatten)]` - Inline the fields of an embedded `Record`
#[proc_macro_derive(Record, attributes(db))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    record::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
