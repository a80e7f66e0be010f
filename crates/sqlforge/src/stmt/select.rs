//! SELECT statements.

use std::sync::Arc;

use crate::clause::{Clause, Compiles};
use crate::dialect::Dialect;
use crate::error::{Error, Result, StmtErrors};
use crate::param::Params;
use crate::schema::{Column, Table};
use crate::stmt::join::{JoinClause, JoinKind};
use crate::stmt::{OrderedColumn, merge_conditions};

/// Something that can be selected: a table, columns, or an aliased subquery.
///
/// `None` converts into a missing selection, which is reported when the
/// statement compiles. This lets lookups such as `schema.get("users")` feed
/// `select` directly.
#[derive(Clone, Debug)]
pub enum Selection {
    Columns(Vec<Column>),
    Subquery(Box<SelectStmt>),
    Missing,
}

impl From<&Table> for Selection {
    fn from(table: &Table) -> Self {
        Selection::Columns(table.columns().to_vec())
    }
}

impl From<Table> for Selection {
    fn from(table: Table) -> Self {
        Selection::from(&table)
    }
}

impl From<Arc<Table>> for Selection {
    fn from(table: Arc<Table>) -> Self {
        Selection::from(table.as_ref())
    }
}

impl From<&Arc<Table>> for Selection {
    fn from(table: &Arc<Table>) -> Self {
        Selection::from(table.as_ref())
    }
}

impl From<Column> for Selection {
    fn from(column: Column) -> Self {
        Selection::Columns(vec![column])
    }
}

impl From<&Column> for Selection {
    fn from(column: &Column) -> Self {
        Selection::Columns(vec![column.clone()])
    }
}

impl From<Vec<Column>> for Selection {
    fn from(columns: Vec<Column>) -> Self {
        Selection::Columns(columns)
    }
}

impl From<SelectStmt> for Selection {
    fn from(stmt: SelectStmt) -> Self {
        Selection::Subquery(Box::new(stmt))
    }
}

impl<T: Into<Selection>> From<Option<T>> for Selection {
    fn from(selection: Option<T>) -> Self {
        selection.map_or(Selection::Missing, Into::into)
    }
}

/// One element of a FROM list.
#[derive(Clone, Debug)]
pub enum FromItem {
    Table(String),
    /// An aliased subquery.
    Select(Box<SelectStmt>),
}

impl FromItem {
    /// Name the item is referenced by: the table name or subquery alias.
    pub fn name(&self) -> &str {
        match self {
            FromItem::Table(name) => name,
            FromItem::Select(stmt) => stmt.alias().unwrap_or_default(),
        }
    }

    pub(crate) fn compile(&self, d: &dyn Dialect, ps: &mut Params) -> Result<String> {
        match self {
            FromItem::Table(name) => Ok(d.quote(name)),
            FromItem::Select(stmt) => stmt.compile(d, ps),
        }
    }
}

impl From<&Table> for FromItem {
    fn from(table: &Table) -> Self {
        FromItem::Table(table.name().to_string())
    }
}

impl From<&Arc<Table>> for FromItem {
    fn from(table: &Arc<Table>) -> Self {
        FromItem::Table(table.name().to_string())
    }
}

impl From<SelectStmt> for FromItem {
    fn from(stmt: SelectStmt) -> Self {
        FromItem::Select(Box::new(stmt))
    }
}

/// SELECT statement.
///
/// Builder methods consume and return the statement; clone a base statement
/// to derive several independent variants from it.
#[derive(Clone, Debug, Default)]
pub struct SelectStmt {
    errs: StmtErrors,
    columns: Vec<Column>,
    tables: Vec<FromItem>,
    distinct: bool,
    distinct_on: Vec<Column>,
    joins: Vec<JoinClause>,
    where_: Option<Clause>,
    group_by: Vec<Column>,
    having: Option<Clause>,
    order_by: Vec<OrderedColumn>,
    limit: u64,
    offset: u64,
    alias: Option<String>,
}

/// Build a SELECT over tables, columns and aliased subqueries.
///
/// Tables referenced by the selected columns form the FROM list, in order of
/// first appearance.
pub fn select<I>(selections: I) -> SelectStmt
where
    I: IntoIterator,
    I::Item: Into<Selection>,
{
    let mut stmt = SelectStmt::default();
    for selection in selections {
        match selection.into() {
            Selection::Missing => stmt.errs.add_meta(
                "received a nil selection - do the columns or tables you selected exist?",
            ),
            Selection::Columns(columns) => {
                for column in columns {
                    stmt.add_column(column);
                }
            }
            Selection::Subquery(sub) => {
                if sub.alias().is_none() {
                    stmt.errs.add_meta("a subquery selection must have an alias");
                    continue;
                }
                let columns = sub.columns();
                let item = FromItem::Select(sub);
                if !stmt.tables.iter().any(|t| t.name() == item.name()) {
                    stmt.tables.push(item);
                }
                for column in columns {
                    stmt.add_column(column);
                }
            }
        }
    }
    if stmt.columns.is_empty() {
        stmt.errs.add_meta("SELECT must be given at least one column");
    }
    stmt
}

impl SelectStmt {
    fn add_column(&mut self, column: Column) {
        let Some(table) = column.table() else {
            self.errs.add_meta(format!(
                "column '{}' does not belong to a table",
                column.name()
            ));
            return;
        };
        if !column.is_valid() {
            self.errs
                .add_field(column.name(), table, "SELECT", "column does not exist");
            return;
        }
        if !self.tables.iter().any(|t| t.name() == table) {
            self.tables.push(FromItem::Table(table.to_string()));
        }
        self.columns.push(column);
    }

    fn check_columns(&mut self, columns: &[Column], clause: &str) -> bool {
        let mut ok = true;
        for column in columns {
            match column.table() {
                None => {
                    self.errs.add_meta(format!(
                        "column '{}' in {clause} does not belong to a table",
                        column.name()
                    ));
                    ok = false;
                }
                Some(table) if !column.is_valid() => {
                    self.errs
                        .add_field(column.name(), table, clause, "column does not exist");
                    ok = false;
                }
                Some(_) => {}
            }
        }
        ok
    }

    /// The alias this statement is known by when used as a subquery.
    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// Selected columns. When aliased, they are re-parented under the alias
    /// so an outer statement can reference them.
    pub fn columns(&self) -> Vec<Column> {
        match &self.alias {
            Some(alias) => self.columns.iter().map(|c| c.reparent(alias)).collect(),
            None => self.columns.clone(),
        }
    }

    /// Column `name` of this (aliased) subquery.
    pub fn c(&self, name: &str) -> Column {
        let alias = self.alias.as_deref().unwrap_or_default();
        self.columns()
            .into_iter()
            .find(|c| c.name() == name)
            .unwrap_or_else(|| Column::invalid(name, alias))
    }

    /// Name of the first table in the FROM list.
    pub fn table_name(&self) -> Option<&str> {
        self.tables.first().map(FromItem::name)
    }

    pub fn errors(&self) -> &StmtErrors {
        &self.errs
    }

    // ==================== Modifiers ====================

    /// Wrap as `(SELECT ...) AS alias` for use as a FROM source.
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub(crate) fn without_alias(mut self) -> Self {
        self.alias = None;
        self
    }

    /// Replace the FROM list.
    pub fn from<I>(mut self, tables: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<FromItem>,
    {
        self.tables = tables.into_iter().map(Into::into).collect();
        self
    }

    /// `SELECT DISTINCT`.
    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self.distinct_on.clear();
        self
    }

    /// `SELECT DISTINCT ON (cols)` (PostgreSQL).
    pub fn distinct_on(mut self, columns: impl IntoIterator<Item = Column>) -> Self {
        let columns: Vec<Column> = columns.into_iter().collect();
        if self.check_columns(&columns, "DISTINCT ON") {
            self.distinct = true;
            self.distinct_on = columns;
        }
        self
    }

    /// Remove any DISTINCT.
    pub fn all(mut self) -> Self {
        self.distinct = false;
        self.distinct_on.clear();
        self
    }

    fn join(mut self, kind: JoinKind, table: FromItem, on: Vec<Clause>) -> Self {
        self.joins.push(JoinClause { kind, table, on });
        self
    }

    pub fn cross_join(self, table: impl Into<FromItem>) -> Self {
        self.join(JoinKind::Cross, table.into(), Vec::new())
    }

    /// `INNER JOIN t ON ...`; no clauses makes it a NATURAL join.
    pub fn inner_join(self, table: impl Into<FromItem>, on: impl IntoIterator<Item = Clause>) -> Self {
        self.join(JoinKind::Inner, table.into(), on.into_iter().collect())
    }

    pub fn left_outer_join(self, table: impl Into<FromItem>, on: impl IntoIterator<Item = Clause>) -> Self {
        self.join(JoinKind::LeftOuter, table.into(), on.into_iter().collect())
    }

    pub fn right_outer_join(self, table: impl Into<FromItem>, on: impl IntoIterator<Item = Clause>) -> Self {
        self.join(JoinKind::RightOuter, table.into(), on.into_iter().collect())
    }

    pub fn full_outer_join(self, table: impl Into<FromItem>, on: impl IntoIterator<Item = Clause>) -> Self {
        self.join(JoinKind::FullOuter, table.into(), on.into_iter().collect())
    }

    /// Set the WHERE clause. Several clauses are joined with AND; none
    /// removes it. Replaces any previous WHERE.
    pub fn where_(mut self, clauses: impl IntoIterator<Item = Clause>) -> Self {
        self.where_ = merge_conditions(clauses);
        self
    }

    /// Append GROUP BY columns.
    pub fn group_by(mut self, columns: impl IntoIterator<Item = Column>) -> Self {
        let columns: Vec<Column> = columns.into_iter().collect();
        if self.check_columns(&columns, "GROUP BY") {
            self.group_by.extend(columns);
        }
        self
    }

    /// Set the HAVING clause, with the same rules as [`SelectStmt::where_`].
    pub fn having(mut self, clauses: impl IntoIterator<Item = Clause>) -> Self {
        self.having = merge_conditions(clauses);
        self
    }

    /// Replace the ORDER BY list.
    pub fn order_by<I>(mut self, order: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<OrderedColumn>,
    {
        let order: Vec<OrderedColumn> = order.into_iter().map(Into::into).collect();
        let columns: Vec<Column> = order.iter().map(|o| o.column().clone()).collect();
        if self.check_columns(&columns, "ORDER BY") {
            self.order_by = order;
        }
        self
    }

    /// LIMIT; zero means no limit.
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = limit;
        self
    }

    /// OFFSET; zero means no offset.
    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    fn compile_tables(&self, d: &dyn Dialect, ps: &mut Params) -> Result<String> {
        let joined: Vec<&str> = self.joins.iter().map(|j| j.table.name()).collect();
        let mut tables = Vec::with_capacity(self.tables.len());
        for table in &self.tables {
            if !joined.contains(&table.name()) {
                tables.push(table.compile(d, ps)?);
            }
        }
        if tables.is_empty() {
            return Err(Error::compile(
                "SELECT has no FROM source: every selected table is a join target, use from() to name one",
            ));
        }
        Ok(tables.join(", "))
    }
}

impl Compiles for SelectStmt {
    fn compile(&self, d: &dyn Dialect, ps: &mut Params) -> Result<String> {
        self.errs.check()?;

        let mut sql = String::from("SELECT ");
        if self.distinct {
            sql.push_str("DISTINCT ");
            if !self.distinct_on.is_empty() {
                let on = self
                    .distinct_on
                    .iter()
                    .map(|c| c.compile(d, ps))
                    .collect::<Result<Vec<_>>>()?;
                sql.push_str(&format!("ON ({}) ", on.join(", ")));
            }
        }

        let columns = self
            .columns
            .iter()
            .map(|c| c.compile_selected(d, ps))
            .collect::<Result<Vec<_>>>()?;
        sql.push_str(&columns.join(", "));

        sql.push_str(" FROM ");
        sql.push_str(&self.compile_tables(d, ps)?);

        for join in &self.joins {
            sql.push_str(&join.compile(d, ps)?);
        }

        if let Some(clause) = &self.where_ {
            sql.push_str(" WHERE ");
            sql.push_str(&clause.compile(d, ps)?);
        }

        if !self.group_by.is_empty() {
            let names: Vec<String> = self.group_by.iter().map(|c| c.full_name(d)).collect();
            sql.push_str(" GROUP BY ");
            sql.push_str(&names.join(", "));
        }

        if let Some(clause) = &self.having {
            sql.push_str(" HAVING ");
            sql.push_str(&clause.compile(d, ps)?);
        }

        if !self.order_by.is_empty() {
            let order = self
                .order_by
                .iter()
                .map(|o| o.compile(d, ps))
                .collect::<Result<Vec<_>>>()?;
            sql.push_str(" ORDER BY ");
            sql.push_str(&order.join(", "));
        }

        if self.limit != 0 {
            sql.push_str(&format!(" LIMIT {}", self.limit));
        }
        if self.offset != 0 {
            sql.push_str(&format!(" OFFSET {}", self.offset));
        }

        if let Some(alias) = &self.alias {
            sql = format!("({sql}) AS {}", d.quote(alias));
        }
        Ok(sql)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clause::compile;
    use crate::dialect::{MySql, Postgres};
    use crate::schema::{DataType, Schema, Table};
    use crate::stmt::function::{count, max};
    use crate::value::Value;

    fn users() -> Table {
        Table::new(
            "users",
            vec![
                Column::new("id", DataType::integer()).into(),
                Column::new("email", DataType::varchar(256)).into(),
                Column::new("name", DataType::varchar(32)).into(),
                Column::new("password", DataType::varchar(0)).into(),
                Column::new("created_at", DataType::timestamp()).into(),
            ],
        )
        .unwrap()
    }

    fn contacts() -> Table {
        Table::new(
            "contacts",
            vec![
                Column::new("id", DataType::integer()).into(),
                Column::new("user_id", DataType::integer()).into(),
                Column::new("key", DataType::varchar(0)).into(),
                Column::new("value", DataType::varchar(0)).into(),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_select_table() {
        let (sql, ps) = compile(&Postgres, &select([&users()])).unwrap();
        assert_eq!(
            sql,
            r#"SELECT "users"."id", "users"."email", "users"."name", "users"."password", "users"."created_at" FROM "users""#
        );
        assert!(ps.is_empty());
    }

    #[test]
    fn test_select_columns_with_alias() {
        let users = users();
        let stmt = select([users.c("email").with_alias("Email"), users.c("id")]);
        assert_eq!(
            stmt.to_sql().unwrap(),
            r#"SELECT "users"."email" AS "Email", "users"."id" FROM "users""#
        );
    }

    #[test]
    fn test_where_limit_offset() {
        let users = users();
        let stmt = users
            .select()
            .where_([users.c("id").equals(1)])
            .order_by([users.c("created_at").desc()])
            .limit(10)
            .offset(20);
        let (sql, ps) = compile(&Postgres, &stmt).unwrap();
        assert_eq!(
            sql,
            r#"SELECT "users"."id", "users"."email", "users"."name", "users"."password", "users"."created_at" FROM "users" WHERE "users"."id" = $1 ORDER BY "users"."created_at" DESC LIMIT 10 OFFSET 20"#
        );
        assert_eq!(ps.as_slice(), &[Value::Int(1)]);
    }

    #[test]
    fn test_multiple_where_is_all_of() {
        let users = users();
        let stmt = select([users.c("id")]).where_([
            users.c("id").gt(1),
            users.c("name").equals("admin"),
        ]);
        assert_eq!(
            stmt.to_sql().unwrap(),
            r#"SELECT "users"."id" FROM "users" WHERE ("users"."id" > $1 AND "users"."name" = $2)"#
        );
    }

    #[test]
    fn test_where_replaces_and_clears() {
        let users = users();
        let base = select([users.c("id")]);
        let a = base.clone().where_([users.c("id").equals(1)]);
        let b = a.clone().where_([users.c("id").equals(2)]);
        let (_, ps) = compile(&Postgres, &b).unwrap();
        assert_eq!(ps.as_slice(), &[Value::Int(2)]);
        let cleared = b.where_([]);
        assert_eq!(cleared.to_sql().unwrap(), r#"SELECT "users"."id" FROM "users""#);
        // The base statement is unaffected by derived variants.
        assert_eq!(base.to_sql().unwrap(), r#"SELECT "users"."id" FROM "users""#);
    }

    #[test]
    fn test_invalid_column_is_deferred() {
        let users = users();
        let stmt = select([users.c("id"), users.c("nope")]);
        let err = stmt.to_sql().unwrap_err();
        assert!(err.is_statement());
        assert_eq!(err.to_string(), "column does not exist (users.nope in SELECT)");
    }

    #[test]
    fn test_errors_accumulate() {
        let schema = Schema::new();
        let users = users();
        let stmt = select([
            Selection::from(schema.get("missing")),
            Selection::from(users.c("nope")),
        ]);
        let err = stmt.to_sql().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("received a nil selection"));
        assert!(msg.contains("users.nope in SELECT"));
        assert!(msg.contains("at least one column"));
    }

    #[test]
    fn test_distinct() {
        let users = users();
        let stmt = select([users.c("name")]).distinct();
        assert_eq!(
            stmt.to_sql().unwrap(),
            r#"SELECT DISTINCT "users"."name" FROM "users""#
        );
        let stmt = select([users.c("name"), users.c("id")]).distinct_on([users.c("name")]);
        assert_eq!(
            stmt.to_sql().unwrap(),
            r#"SELECT DISTINCT ON ("users"."name") "users"."name", "users"."id" FROM "users""#
        );
        assert_eq!(
            stmt.all().to_sql().unwrap(),
            r#"SELECT "users"."name", "users"."id" FROM "users""#
        );
    }

    #[test]
    fn test_group_by_having() {
        let contacts = contacts();
        let stmt = select([contacts.c("user_id"), count(&contacts.c("id"))])
            .group_by([contacts.c("user_id")])
            .having([count(&contacts.c("id")).gt(2)])
            .order_by([count(&contacts.c("id")).desc()]);
        let (sql, ps) = compile(&Postgres, &stmt).unwrap();
        assert_eq!(
            sql,
            r#"SELECT "contacts"."user_id", COUNT("contacts"."id") FROM "contacts" GROUP BY "contacts"."user_id" HAVING COUNT("contacts"."id") > $1 ORDER BY COUNT("contacts"."id") DESC"#
        );
        assert_eq!(ps.len(), 1);
    }

    #[test]
    fn test_joins() {
        let users = users();
        let contacts = contacts();
        let stmt = select([users.c("name"), contacts.c("value")]).left_outer_join(
            &contacts,
            [users.c("id").equals(contacts.c("user_id")), contacts.c("key").equals("email")],
        );
        let (sql, ps) = compile(&Postgres, &stmt).unwrap();
        assert_eq!(
            sql,
            r#"SELECT "users"."name", "contacts"."value" FROM "users" LEFT OUTER JOIN "contacts" ON "users"."id" = "contacts"."user_id" AND "contacts"."key" = $1"#
        );
        assert_eq!(ps.len(), 1);
    }

    #[test]
    fn test_natural_and_cross_join() {
        let users = users();
        let contacts = contacts();
        let stmt = select([users.c("id")]).inner_join(&contacts, []);
        assert_eq!(
            stmt.to_sql().unwrap(),
            r#"SELECT "users"."id" FROM "users" NATURAL INNER JOIN "contacts""#
        );
        let stmt = select([users.c("id")]).cross_join(&contacts);
        assert_eq!(
            stmt.to_sql().unwrap(),
            r#"SELECT "users"."id" FROM "users" CROSS JOIN "contacts""#
        );
    }

    #[test]
    fn test_join_target_only_needs_from() {
        let users = users();
        let contacts = contacts();
        let on = [users.c("id").equals(contacts.c("user_id"))];
        let stmt = select([contacts.c("id")]).inner_join(&contacts, on.clone());
        let err = stmt.to_sql().unwrap_err();
        assert!(matches!(err, Error::Compile(_)));
        assert!(err.to_string().contains("no FROM source"));

        let stmt = select([contacts.c("id")]).from([&users]).inner_join(&contacts, on);
        assert_eq!(
            stmt.to_sql().unwrap(),
            r#"SELECT "contacts"."id" FROM "users" INNER JOIN "contacts" ON "users"."id" = "contacts"."user_id""#
        );
    }

    #[test]
    fn test_subquery_source() {
        let contacts = contacts();
        let latest = select([contacts.c("user_id"), max(&contacts.c("id")).with_alias("last_id")])
            .group_by([contacts.c("user_id")])
            .with_alias("latest");
        let stmt = select([latest.clone()]).where_([latest.c("last_id").gt(5)]);
        assert_eq!(
            stmt.to_sql().unwrap(),
            r#"SELECT "latest"."user_id", "latest"."last_id" FROM (SELECT "contacts"."user_id", MAX("contacts"."id") AS "last_id" FROM "contacts" GROUP BY "contacts"."user_id") AS "latest" WHERE "latest"."last_id" > $1"#
        );
    }

    #[test]
    fn test_subquery_in_where() {
        let users = users();
        let contacts = contacts();
        let sub = select([contacts.c("user_id")]).where_([contacts.c("key").equals("phone")]);
        let stmt = select([users.c("id")]).where_([users.c("id").in_select(sub), users.c("name").is_not_null()]);
        let (sql, ps) = compile(&Postgres, &stmt).unwrap();
        assert_eq!(
            sql,
            r#"SELECT "users"."id" FROM "users" WHERE ("users"."id" IN (SELECT "contacts"."user_id" FROM "contacts" WHERE "contacts"."key" = $1) AND "users"."name" IS NOT NULL)"#
        );
        assert_eq!(ps.len(), 1);
    }

    #[test]
    fn test_from_override() {
        let users = users();
        let contacts = contacts();
        let stmt = select([users.c("id")]).from([&users, &contacts]);
        assert_eq!(
            stmt.to_sql().unwrap(),
            r#"SELECT "users"."id" FROM "users", "contacts""#
        );
    }

    #[test]
    fn test_mysql_dialect() {
        let users = users();
        let stmt = select([users.c("id")]).where_([users.c("id").equals(3)]);
        let (sql, _) = compile(&MySql, &stmt).unwrap();
        assert_eq!(sql, "SELECT `users`.`id` FROM `users` WHERE `users`.`id` = ?");
    }
}
