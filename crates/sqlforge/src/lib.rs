//! # sqlforge
//!
//! A dialect-neutral SQL statement builder with result mapping.
//!
//! ## Features
//!
//! - **Schema first**: tables are declared once and validated at construction
//! - **Composable statements**: immutable builders for SELECT, INSERT, UPDATE,
//!   DELETE, CREATE and DROP plus raw text with `:name` parameters
//! - **Deferred errors**: builder mistakes accumulate and surface at compile time
//! - **Dialects**: `$n` or `?` placeholders and identifier quoting per database
//! - **Result mapping**: rows into scalars, maps or `#[derive(Record)]` structs
//!
//! ## Example
//!
//! ```ignore
//! use sqlforge::prelude::*;
//!
//! let users = Table::new("users", vec![
//!     Column::new("id", DataType::integer()).into(),
//!     Column::new("name", DataType::varchar(32).not_null()).into(),
//!     PrimaryKey::new(["id"]).into(),
//! ])?;
//!
//! let stmt = users.select().where_([users.c("name").equals("admin")]).limit(1);
//! let (sql, params) = compile(&Postgres, &stmt)?;
//! // SELECT "users"."id", "users"."name" FROM "users" WHERE "users"."name" = $1 LIMIT 1
//! ```

pub mod clause;
pub mod config;
pub mod conn;
pub mod dialect;
pub mod error;
pub mod param;
pub mod prelude;
pub mod record;
pub mod result;
pub mod schema;
pub mod stmt;
pub mod value;
pub mod values;

#[cfg(feature = "postgres")]
pub mod postgres;

pub use clause::{Clause, Compiles, all_of, any_of, compile};
pub use config::DatabaseConfig;
pub use conn::{Conn, Executor};
pub use dialect::{Dialect, DialectRegistry, MySql, Postgres, Sqlite};
pub use error::{ConversionError, Error, FieldError, Result, StmtErrors};
pub use param::Params;
pub use record::{Field, FieldOptions, Record, align_columns, camel_to_snake};
pub use result::{Destination, MemoryRows, Plan, QueryResult, Rows, Shape};
pub use schema::{Column, DataType, FkAction, ForeignKey, Modifier, PrimaryKey, Schema, Table, Unique};
pub use stmt::{
    CreateStmt, CreateViewStmt, DeleteStmt, DropStmt, FromItem, InsertStmt, JoinKind, OrderedColumn,
    SelectStmt, Selection, TextStmt, UpdateStmt, View, create, delete, insert, select, text, update,
    view,
};
pub use value::{FromValue, Value};
pub use values::Values;

#[cfg(feature = "postgres")]
pub use postgres::PgExecutor;

#[cfg(feature = "derive")]
pub use sqlforge_derive::Record;
