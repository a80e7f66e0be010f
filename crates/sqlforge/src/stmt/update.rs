//! UPDATE statements.

use std::sync::Arc;

use crate::clause::{Clause, Compiles};
use crate::dialect::Dialect;
use crate::error::{Result, StmtErrors};
use crate::param::Params;
use crate::record::{Record, camel_to_snake};
use crate::schema::Table;
use crate::stmt::merge_conditions;
use crate::value::Value;
use crate::values::Values;

/// UPDATE statement.
///
/// Until values are given, every column is set to a NULL parameter.
#[derive(Clone, Debug)]
pub struct UpdateStmt {
    errs: StmtErrors,
    table: Arc<Table>,
    values: Values,
    where_: Option<Clause>,
}

/// Build an UPDATE for `table`.
pub fn update(table: &Table) -> UpdateStmt {
    let values = table
        .columns()
        .iter()
        .map(|c| (c.name().to_string(), Value::Null))
        .collect();
    UpdateStmt {
        errs: StmtErrors::new(),
        table: Arc::new(table.clone()),
        values,
        where_: None,
    }
}

impl UpdateStmt {
    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn errors(&self) -> &StmtErrors {
        &self.errs
    }

    /// Replace the SET values. Keys must name columns of the table, either
    /// exactly or in camel case.
    pub fn values(mut self, values: Values) -> Self {
        if values.is_empty() {
            self.errs.add_meta("UPDATE must be given at least one value");
            return self;
        }
        let mut resolved = Values::new();
        for (key, value) in values {
            let column = if self.table.has(&key) {
                Some(key.clone())
            } else {
                let snake = camel_to_snake(&key);
                self.table.has(&snake).then_some(snake)
            };
            match column {
                Some(column) => {
                    resolved.insert(column, value);
                }
                None => self.errs.add_meta(format!(
                    "no column '{key}' exists in the table '{}'",
                    self.table.name()
                )),
            }
        }
        self.values = resolved;
        self
    }

    /// Set values from a record, skipping `omit_update` fields and empty
    /// `omit_empty` fields.
    pub fn record<R: Record>(self, record: &R) -> Self {
        self.values(Values::for_update(record))
    }

    /// Set the WHERE clause; several clauses are joined with AND.
    pub fn where_(mut self, clauses: impl IntoIterator<Item = Clause>) -> Self {
        self.where_ = merge_conditions(clauses);
        self
    }
}

impl Compiles for UpdateStmt {
    fn compile(&self, d: &dyn Dialect, ps: &mut Params) -> Result<String> {
        self.errs.check()?;
        let mut sql = format!(
            "UPDATE {} SET {}",
            d.quote(self.table.name()),
            self.values.compile(d, ps)?
        );
        if let Some(clause) = &self.where_ {
            sql.push_str(" WHERE ");
            sql.push_str(&clause.compile(d, ps)?);
        }
        Ok(sql)
    }
}
