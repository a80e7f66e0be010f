//! Table, column and constraint metadata.

mod column;
mod constraint;
mod table;
mod types;

use std::collections::BTreeMap;
use std::sync::Arc;

pub use column::Column;
pub use constraint::{FkAction, ForeignKey, PrimaryKey, Unique};
pub use table::{Modifier, Table};
pub use types::DataType;

use crate::error::{Error, Result};

/// Registry of declared tables.
///
/// Tables never point at each other, so reverse foreign keys are answered
/// here instead of being stored on the referenced table.
#[derive(Clone, Debug, Default)]
pub struct Schema {
    tables: BTreeMap<String, Arc<Table>>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table. Names must be unique within the schema.
    pub fn add(&mut self, table: Table) -> Result<Arc<Table>> {
        if self.tables.contains_key(table.name()) {
            return Err(Error::schema(format!(
                "schema already has a table {}",
                table.name()
            )));
        }
        let table = Arc::new(table);
        self.tables.insert(table.name().to_string(), Arc::clone(&table));
        Ok(table)
    }

    pub fn get(&self, name: &str) -> Option<Arc<Table>> {
        self.tables.get(name).cloned()
    }

    pub fn tables(&self) -> impl Iterator<Item = &Arc<Table>> {
        self.tables.values()
    }

    /// Foreign keys on other tables that reference `table`.
    pub fn referenced_by(&self, table: &str) -> Vec<&ForeignKey> {
        self.tables
            .values()
            .flat_map(|t| t.foreign_keys())
            .filter(|fk| fk.references().and_then(Column::table) == Some(table))
            .collect()
    }
}
