//! Common imports.
//!
//! ```ignore
//! use sqlforge::prelude::*;
//! ```

pub use crate::{
    Clause, Column, Compiles, Conn, DataType, Destination, Dialect, Error, Executor, FkAction,
    ForeignKey, MySql, Postgres, PrimaryKey, Record, Result, Sqlite, Table, Unique, Value, Values,
    all_of, any_of, compile, delete, insert, select, text, update,
};
pub use crate::stmt::function::{avg, count, max, min, sum};
