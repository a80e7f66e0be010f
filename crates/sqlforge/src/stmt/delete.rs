//! DELETE statements.

use crate::clause::{Clause, Compiles};
use crate::dialect::Dialect;
use crate::error::Result;
use crate::param::Params;
use crate::schema::Table;
use crate::stmt::merge_conditions;

/// DELETE statement. Without a WHERE clause it deletes every row.
#[derive(Clone, Debug)]
pub struct DeleteStmt {
    table: String,
    where_: Option<Clause>,
}

pub fn delete(table: &Table) -> DeleteStmt {
    DeleteStmt {
        table: table.name().to_string(),
        where_: None,
    }
}

impl DeleteStmt {
    pub fn where_(mut self, clauses: impl IntoIterator<Item = Clause>) -> Self {
        self.where_ = merge_conditions(clauses);
        self
    }
}

impl Compiles for DeleteStmt {
    fn compile(&self, d: &dyn Dialect, ps: &mut Params) -> Result<String> {
        let mut sql = format!("DELETE FROM {}", d.quote(&self.table));
        if let Some(clause) = &self.where_ {
            sql.push_str(" WHERE ");
            sql.push_str(&clause.compile(d, ps)?);
        }
        Ok(sql)
    }
}
