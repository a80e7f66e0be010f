//! Table declaration.

use crate::error::{Error, Result};
use crate::schema::constraint::FkTarget;
use crate::schema::{Column, ForeignKey, PrimaryKey, Unique};
use crate::stmt::{CreateStmt, DeleteStmt, DropStmt, InsertStmt, SelectStmt, UpdateStmt};

/// One element of a table declaration, applied in order by [`Table::new`].
#[derive(Clone, Debug, PartialEq)]
pub enum Modifier {
    Column(Column),
    PrimaryKey(PrimaryKey),
    Unique(Unique),
    ForeignKey(ForeignKey),
}

impl From<Column> for Modifier {
    fn from(column: Column) -> Self {
        Modifier::Column(column)
    }
}

impl From<PrimaryKey> for Modifier {
    fn from(pk: PrimaryKey) -> Self {
        Modifier::PrimaryKey(pk)
    }
}

impl From<Unique> for Modifier {
    fn from(unique: Unique) -> Self {
        Modifier::Unique(unique)
    }
}

impl From<ForeignKey> for Modifier {
    fn from(fk: ForeignKey) -> Self {
        Modifier::ForeignKey(fk)
    }
}

/// A declared table.
///
/// Tables are built once, usually at startup, and are read-only afterwards.
/// Statements copy what they need from them.
#[derive(Clone, Debug, PartialEq)]
pub struct Table {
    name: String,
    columns: Vec<Column>,
    primary_key: Option<PrimaryKey>,
    uniques: Vec<Unique>,
    foreign_keys: Vec<ForeignKey>,
    // Declaration order, as emitted by CREATE TABLE.
    items: Vec<Modifier>,
}

impl Table {
    /// Declare a table.
    ///
    /// ```ignore
    /// let users = Table::new("users", vec![
    ///     Column::new("id", DataType::integer().not_null()).into(),
    ///     Column::new("email", DataType::varchar(256)).into(),
    ///     PrimaryKey::new(["id"]).into(),
    /// ])?;
    /// ```
    pub fn new(name: impl Into<String>, modifiers: impl IntoIterator<Item = Modifier>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::schema("table names cannot be blank"));
        }
        let mut table = Self {
            name,
            columns: Vec::new(),
            primary_key: None,
            uniques: Vec::new(),
            foreign_keys: Vec::new(),
            items: Vec::new(),
        };
        for modifier in modifiers {
            table.modify(modifier)?;
        }
        Ok(table)
    }

    fn modify(&mut self, modifier: Modifier) -> Result<()> {
        match modifier {
            Modifier::Column(column) => {
                let column = self.add_column(column)?;
                self.items.push(Modifier::Column(column));
            }
            Modifier::PrimaryKey(pk) => {
                if self.primary_key.is_some() {
                    return Err(Error::schema(format!(
                        "table {} already has a primary key",
                        self.name
                    )));
                }
                self.require_columns(pk.columns(), "primary key")?;
                self.primary_key = Some(pk.clone());
                self.items.push(Modifier::PrimaryKey(pk));
            }
            Modifier::Unique(unique) => {
                self.require_columns(unique.columns(), "unique constraint")?;
                self.uniques.push(unique.clone());
                self.items.push(Modifier::Unique(unique));
            }
            Modifier::ForeignKey(fk) => {
                let target = self.resolve_target(&fk)?;
                let fk = fk.resolved(&self.name, target);
                let column = match fk.data_type() {
                    Some(ty) => Column::new(fk.name(), ty.clone()),
                    None => Column::untyped(fk.name()),
                };
                self.add_column(column)?;
                self.foreign_keys.push(fk.clone());
                self.items.push(Modifier::ForeignKey(fk));
            }
        }
        Ok(())
    }

    fn add_column(&mut self, mut column: Column) -> Result<Column> {
        if column.name().is_empty() {
            return Err(Error::schema(format!(
                "column names cannot be blank (table {})",
                self.name
            )));
        }
        if self.has(column.name()) {
            return Err(Error::schema(format!(
                "table {} already has a column {}",
                self.name,
                column.name()
            )));
        }
        column.attach(&self.name)?;
        self.columns.push(column.clone());
        Ok(column)
    }

    fn require_columns(&self, names: &[String], what: &str) -> Result<()> {
        if names.is_empty() {
            return Err(Error::schema(format!(
                "{what} on table {} needs at least one column",
                self.name
            )));
        }
        match names.iter().find(|n| !self.has(n)) {
            Some(missing) => Err(Error::schema(format!(
                "no column {missing} exists on table {} for the {what}",
                self.name
            ))),
            None => Ok(()),
        }
    }

    fn resolve_target(&self, fk: &ForeignKey) -> Result<Column> {
        match &fk.target {
            FkTarget::Column(column) => {
                if column.table().is_none() {
                    return Err(Error::schema(format!(
                        "foreign key {} references column {} which does not belong to a table",
                        fk.name(),
                        column.name()
                    )));
                }
                if !column.is_valid() {
                    return Err(Error::schema(format!(
                        "foreign key {} references column {} which does not exist on table {}",
                        fk.name(),
                        column.name(),
                        column.table().unwrap_or_default()
                    )));
                }
                Ok(column.clone())
            }
            FkTarget::Table { name, primary_key } => match primary_key.as_slice() {
                [column] => Ok(column.clone()),
                _ => Err(Error::schema(format!(
                    "foreign key {} references table {name} which must have exactly one primary key column",
                    fk.name()
                ))),
            },
            FkTarget::SelfColumn(name) => self.column(name).cloned().ok_or_else(|| {
                Error::schema(format!(
                    "no column {name} exists on table {} - is it created after the foreign key?",
                    self.name
                ))
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The named column, or an invalid marker that builders report when used.
    pub fn c(&self, name: &str) -> Column {
        self.column(name)
            .cloned()
            .unwrap_or_else(|| Column::invalid(name, &self.name))
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn primary_key(&self) -> Option<&PrimaryKey> {
        self.primary_key.as_ref()
    }

    pub fn uniques(&self) -> &[Unique] {
        &self.uniques
    }

    pub fn foreign_keys(&self) -> &[ForeignKey] {
        &self.foreign_keys
    }

    pub(crate) fn items(&self) -> &[Modifier] {
        &self.items
    }

    // ==================== Statement shortcuts ====================

    /// `SELECT` every column of the table.
    pub fn select(&self) -> SelectStmt {
        crate::stmt::select([self])
    }

    /// `INSERT` into every column of the table.
    pub fn insert(&self) -> InsertStmt {
        crate::stmt::insert([self])
    }

    pub fn update(&self) -> UpdateStmt {
        crate::stmt::update(self)
    }

    pub fn delete(&self) -> DeleteStmt {
        crate::stmt::delete(self)
    }

    pub fn create(&self) -> CreateStmt {
        crate::stmt::create(self)
    }

    pub fn drop(&self) -> DropStmt {
        crate::stmt::drop(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{DataType, FkAction};

    fn users() -> Table {
        Table::new(
            "users",
            vec![
                Column::new("id", DataType::integer()).into(),
                Column::new("email", DataType::varchar(256)).into(),
                PrimaryKey::new(["id"]).into(),
                Unique::new(["email"]).into(),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_declaration() {
        let users = users();
        assert_eq!(users.name(), "users");
        assert_eq!(users.columns().len(), 2);
        assert_eq!(users.c("id").table(), Some("users"));
        assert!(users.primary_key().unwrap().has("id"));
        assert_eq!(users.uniques().len(), 1);
    }

    #[test]
    fn test_unknown_column_is_invalid_marker() {
        let users = users();
        let missing = users.c("nope");
        assert!(!missing.is_valid());
        assert_eq!(missing.table(), Some("users"));
        assert!(!users.has("nope"));
    }

    #[test]
    fn test_blank_names() {
        assert!(Table::new("", Vec::new()).is_err());
        let err = Table::new("t", vec![Column::new("", DataType::text()).into()]).unwrap_err();
        assert!(err.to_string().contains("column names cannot be blank"));
    }

    #[test]
    fn test_duplicate_column() {
        let err = Table::new(
            "t",
            vec![
                Column::new("a", DataType::text()).into(),
                Column::new("a", DataType::integer()).into(),
            ],
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Schema error: table t already has a column a");
    }

    #[test]
    fn test_reattach_column() {
        let users = users();
        let err = Table::new("other", vec![users.c("id").into()]).unwrap_err();
        assert!(err.to_string().contains("already belongs to table users"));
    }

    #[test]
    fn test_primary_key_missing_column() {
        let err = Table::new(
            "t",
            vec![
                PrimaryKey::new(["id"]).into(),
                Column::new("id", DataType::integer()).into(),
            ],
        )
        .unwrap_err();
        assert!(err.to_string().contains("no column id exists on table t"));
    }

    #[test]
    fn test_foreign_key_to_column() {
        let users = users();
        let contacts = Table::new(
            "contacts",
            vec![
                Column::new("id", DataType::integer()).into(),
                ForeignKey::new("user_id", users.c("id"))
                    .on_delete(FkAction::Cascade)
                    .into(),
            ],
        )
        .unwrap();
        let fk = &contacts.foreign_keys()[0];
        assert_eq!(fk.table(), Some("contacts"));
        assert_eq!(fk.references().unwrap().table(), Some("users"));
        assert_eq!(contacts.c("user_id").data_type(), Some(&DataType::integer()));
    }

    #[test]
    fn test_foreign_key_to_table() {
        let users = users();
        let contacts = Table::new("contacts", vec![ForeignKey::to_table("user_id", &users).into()]).unwrap();
        assert_eq!(contacts.foreign_keys()[0].references().unwrap().name(), "id");

        let no_pk = Table::new("tags", vec![Column::new("name", DataType::text()).into()]).unwrap();
        let err = Table::new("x", vec![ForeignKey::to_table("tag", &no_pk).into()]).unwrap_err();
        assert!(err.to_string().contains("exactly one primary key column"));
    }

    #[test]
    fn test_self_foreign_key_order() {
        let ok = Table::new(
            "nodes",
            vec![
                Column::new("id", DataType::integer()).into(),
                ForeignKey::to_self("parent_id", "id").into(),
            ],
        );
        assert!(ok.is_ok());

        let err = Table::new(
            "nodes",
            vec![
                ForeignKey::to_self("parent_id", "id").into(),
                Column::new("id", DataType::integer()).into(),
            ],
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Schema error: no column id exists on table nodes - is it created after the foreign key?"
        );
    }

    #[test]
    fn test_foreign_key_to_missing_column() {
        let users = users();
        let err = Table::new("contacts", vec![ForeignKey::new("user_id", users.c("uid")).into()]).unwrap_err();
        assert!(err.to_string().contains("uid"));
    }
}
