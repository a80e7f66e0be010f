//! CREATE TABLE and DROP TABLE/VIEW.

use crate::clause::Compiles;
use crate::dialect::Dialect;
use crate::error::Result;
use crate::param::Params;
use crate::schema::{Modifier, Table};

/// CREATE TABLE statement. Emits one line per column and constraint in
/// declaration order.
#[derive(Clone, Debug)]
pub struct CreateStmt {
    table: Table,
    temporary: bool,
    if_not_exists: bool,
}

pub fn create(table: &Table) -> CreateStmt {
    CreateStmt {
        table: table.clone(),
        temporary: false,
        if_not_exists: false,
    }
}

impl CreateStmt {
    pub fn temporary(mut self) -> Self {
        self.temporary = true;
        self
    }

    pub fn if_not_exists(mut self) -> Self {
        self.if_not_exists = true;
        self
    }
}

impl Compiles for CreateStmt {
    fn compile(&self, d: &dyn Dialect, _ps: &mut Params) -> Result<String> {
        let lines: Vec<String> = self
            .table
            .items()
            .iter()
            .map(|item| match item {
                Modifier::Column(column) => match column.data_type() {
                    Some(ty) => format!("{} {ty}", d.quote(column.name())),
                    None => d.quote(column.name()),
                },
                Modifier::PrimaryKey(pk) => pk.create(d),
                Modifier::Unique(unique) => unique.create(d),
                Modifier::ForeignKey(fk) => fk.create(d),
            })
            .collect();

        let mut sql = String::from("CREATE ");
        if self.temporary {
            sql.push_str("TEMPORARY ");
        }
        sql.push_str("TABLE ");
        if self.if_not_exists {
            sql.push_str("IF NOT EXISTS ");
        }
        sql.push_str(&format!(
            "{} (\n  {}\n);",
            d.quote(self.table.name()),
            lines.join(",\n  ")
        ));
        Ok(sql)
    }
}

/// DROP TABLE or DROP VIEW statement.
#[derive(Clone, Debug)]
pub struct DropStmt {
    object: &'static str,
    name: String,
    if_exists: bool,
}

pub fn drop(table: &Table) -> DropStmt {
    DropStmt::new("TABLE", table.name())
}

impl DropStmt {
    pub(crate) fn new(object: &'static str, name: &str) -> Self {
        Self {
            object,
            name: name.to_string(),
            if_exists: false,
        }
    }

    pub fn if_exists(mut self) -> Self {
        self.if_exists = true;
        self
    }
}

impl Compiles for DropStmt {
    fn compile(&self, d: &dyn Dialect, _ps: &mut Params) -> Result<String> {
        Ok(if self.if_exists {
            format!("DROP {} IF EXISTS {}", self.object, d.quote(&self.name))
        } else {
            format!("DROP {} {}", self.object, d.quote(&self.name))
        })
    }
}
