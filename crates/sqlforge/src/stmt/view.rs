//! Views defined by a SELECT.

use std::sync::Arc;

use crate::clause::Compiles;
use crate::dialect::Dialect;
use crate::error::{Error, Result};
use crate::param::Params;
use crate::schema::Column;
use crate::stmt::create::DropStmt;
use crate::stmt::select::{FromItem, SelectStmt, select};

/// A named view over a SELECT statement.
///
/// The view exposes the statement's columns under its own name, so it can
/// be queried like a table once created.
#[derive(Clone, Debug)]
pub struct View {
    name: String,
    columns: Vec<Column>,
    stmt: SelectStmt,
}

/// Define a view. Selected column names (after aliasing) must be unique.
pub fn view(name: impl Into<String>, stmt: SelectStmt) -> Result<View> {
    let name = name.into();
    if name.is_empty() {
        return Err(Error::schema("view names cannot be blank"));
    }
    let stmt = stmt.without_alias();
    let mut columns: Vec<Column> = Vec::new();
    for column in stmt.columns() {
        let column = column.reparent(&name);
        if columns.iter().any(|c| c.name() == column.name()) {
            return Err(Error::schema(format!(
                "view '{name}' has duplicate column '{}'",
                column.name()
            )));
        }
        columns.push(column);
    }
    Ok(View { name, columns, stmt })
}

impl View {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn has(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name() == name)
    }

    /// Column `name` of the view, or an invalid marker if there is none.
    pub fn c(&self, name: &str) -> Column {
        self.columns
            .iter()
            .find(|c| c.name() == name)
            .cloned()
            .unwrap_or_else(|| Column::invalid(name, &self.name))
    }

    /// The statement the view is built from.
    pub fn query(&self) -> &SelectStmt {
        &self.stmt
    }

    /// `SELECT` every column of the view.
    pub fn select(&self) -> SelectStmt {
        select([self.columns.clone()])
    }

    pub fn create(&self) -> CreateViewStmt {
        CreateViewStmt {
            view: Arc::new(self.clone()),
            temporary: false,
            or_replace: false,
        }
    }

    pub fn drop(&self) -> DropStmt {
        DropStmt::new("VIEW", &self.name)
    }
}

impl From<&View> for FromItem {
    fn from(view: &View) -> Self {
        FromItem::Table(view.name.clone())
    }
}

/// CREATE VIEW statement. Parameters of the view's SELECT are bound in
/// order.
#[derive(Clone, Debug)]
pub struct CreateViewStmt {
    view: Arc<View>,
    temporary: bool,
    or_replace: bool,
}

impl CreateViewStmt {
    pub fn temporary(mut self) -> Self {
        self.temporary = true;
        self
    }

    pub fn or_replace(mut self) -> Self {
        self.or_replace = true;
        self
    }
}

impl Compiles for CreateViewStmt {
    fn compile(&self, d: &dyn Dialect, ps: &mut Params) -> Result<String> {
        let query = self.view.stmt.compile(d, ps)?;

        let mut sql = String::from("CREATE ");
        if self.or_replace {
            sql.push_str("OR REPLACE ");
        }
        if self.temporary {
            sql.push_str("TEMPORARY ");
        }
        sql.push_str(&format!("VIEW {} AS {query}", d.quote(&self.view.name)));
        Ok(sql)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clause::compile;
    use crate::dialect::{Postgres, Sqlite};
    use crate::schema::{DataType, Table};
    use crate::stmt::function::count;
    use crate::value::Value;

    fn users() -> Table {
        Table::new(
            "users",
            vec![
                Column::new("id", DataType::integer()).into(),
                Column::new("email", DataType::varchar(256)).into(),
                Column::new("is_admin", DataType::boolean()).into(),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_create_view() {
        let users = users();
        let emails = view(
            "user_emails",
            select([users.c("id"), users.c("email")]).order_by([users.c("email")]),
        )
        .unwrap();
        assert_eq!(emails.name(), "user_emails");
        assert_eq!(
            emails.create().to_sql().unwrap(),
            r#"CREATE VIEW "user_emails" AS SELECT "users"."id", "users"."email" FROM "users" ORDER BY "users"."email""#
        );
        assert_eq!(
            emails.create().or_replace().temporary().to_sql().unwrap(),
            r#"CREATE OR REPLACE TEMPORARY VIEW "user_emails" AS SELECT "users"."id", "users"."email" FROM "users" ORDER BY "users"."email""#
        );
    }

    #[test]
    fn test_create_view_binds_where() {
        let users = users();
        let admins = view(
            "admins",
            users.select().where_([users.c("is_admin").equals(true)]),
        )
        .unwrap();
        let (sql, ps) = compile(&Sqlite, &admins.create()).unwrap();
        assert_eq!(
            sql,
            r#"CREATE VIEW "admins" AS SELECT "users"."id", "users"."email", "users"."is_admin" FROM "users" WHERE "users"."is_admin" = ?"#
        );
        assert_eq!(ps.into_vec(), vec![Value::Bool(true)]);
    }

    #[test]
    fn test_select_from_view() {
        let users = users();
        let totals = view(
            "admin_counts",
            select([users.c("is_admin"), count(&users.c("id")).with_alias("total")])
                .group_by([users.c("is_admin")]),
        )
        .unwrap();
        assert!(totals.has("total"));
        assert!(!totals.c("missing").is_valid());

        let (sql, ps) = compile(&Postgres, &totals.select().where_([totals.c("total").gt(2)])).unwrap();
        assert_eq!(
            sql,
            r#"SELECT "admin_counts"."is_admin", "admin_counts"."total" FROM "admin_counts" WHERE "admin_counts"."total" > $1"#
        );
        assert_eq!(ps.len(), 1);
    }

    #[test]
    fn test_duplicate_columns() {
        let users = users();
        let contacts = Table::new("contacts", vec![Column::new("id", DataType::integer()).into()]).unwrap();
        let err = view("ids", select([users.c("id"), contacts.c("id")])).unwrap_err();
        assert_eq!(err.to_string(), "Schema error: view 'ids' has duplicate column 'id'");

        let renamed = view("ids", select([users.c("id"), contacts.c("id").with_alias("contact_id")]));
        assert!(renamed.is_ok());
    }

    #[test]
    fn test_blank_name() {
        assert!(view("", users().select()).is_err());
    }

    #[test]
    fn test_drop_view() {
        let users = users();
        let emails = view("user_emails", select([users.c("email")])).unwrap();
        assert_eq!(emails.drop().to_sql().unwrap(), r#"DROP VIEW "user_emails""#);
        assert_eq!(
            emails.drop().if_exists().to_sql().unwrap(),
            r#"DROP VIEW IF EXISTS "user_emails""#
        );
    }
}
