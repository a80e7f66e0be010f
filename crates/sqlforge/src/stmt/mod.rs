//! Statement builders.
//!
//! Every builder is a value: modifiers consume the statement and return the
//! changed copy, and validation failures are collected until compile time.

mod create;
mod delete;
pub mod function;
mod insert;
mod join;
mod order;
mod select;
mod text;
mod update;
mod view;

pub use create::{CreateStmt, DropStmt, create, drop};
pub use delete::{DeleteStmt, delete};
pub use insert::{InsertStmt, insert};
pub use join::JoinKind;
pub use order::OrderedColumn;
pub use select::{FromItem, SelectStmt, Selection, select};
pub use text::{TextStmt, text};
pub use update::{UpdateStmt, update};
pub use view::{CreateViewStmt, View, view};

use crate::clause::{Clause, all_of};

/// WHERE/HAVING merge rule: none clears, one is used as is, several are
/// joined with AND.
pub(crate) fn merge_conditions(clauses: impl IntoIterator<Item = Clause>) -> Option<Clause> {
    let mut clauses: Vec<Clause> = clauses.into_iter().collect();
    match clauses.len() {
        0 => None,
        1 => clauses.pop(),
        _ => Some(all_of(clauses)),
    }
}
