//! Table constraints: primary keys, unique groups and foreign keys.

use std::fmt;

use crate::dialect::Dialect;
use crate::schema::{Column, DataType, Table};

fn quoted_list(d: &dyn Dialect, names: &[String]) -> String {
    names
        .iter()
        .map(|n| d.quote(n))
        .collect::<Vec<_>>()
        .join(", ")
}

/// `PRIMARY KEY ("a", "b")`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrimaryKey {
    columns: Vec<String>,
}

impl PrimaryKey {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub(crate) fn create(&self, d: &dyn Dialect) -> String {
        format!("PRIMARY KEY ({})", quoted_list(d, &self.columns))
    }
}

/// `UNIQUE ("a", "b")`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Unique {
    columns: Vec<String>,
}

impl Unique {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub(crate) fn create(&self, d: &dyn Dialect) -> String {
        format!("UNIQUE ({})", quoted_list(d, &self.columns))
    }
}

/// Referential action for ON DELETE / ON UPDATE.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FkAction {
    NoAction,
    Restrict,
    Cascade,
    SetNull,
    SetDefault,
}

impl fmt::Display for FkAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FkAction::NoAction => "NO ACTION",
            FkAction::Restrict => "RESTRICT",
            FkAction::Cascade => "CASCADE",
            FkAction::SetNull => "SET NULL",
            FkAction::SetDefault => "SET DEFAULT",
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum FkTarget {
    /// A column of an already declared table.
    Column(Column),
    /// The single-column primary key of a table, resolved on attach.
    Table {
        name: String,
        primary_key: Vec<Column>,
    },
    /// A column of the table being declared.
    SelfColumn(String),
}

/// A foreign-key column.
///
/// Attaching it to a table creates the column itself (typed like the
/// referenced column unless a type is given) and records the reference.
#[derive(Clone, Debug, PartialEq)]
pub struct ForeignKey {
    name: String,
    data_type: Option<DataType>,
    pub(crate) target: FkTarget,
    on_delete: Option<FkAction>,
    on_update: Option<FkAction>,
    owner: Option<String>,
}

impl ForeignKey {
    /// Reference a column of another table, e.g. `users.c("id")`.
    pub fn new(name: impl Into<String>, references: Column) -> Self {
        Self::with_target(name, FkTarget::Column(references))
    }

    /// Reference the primary key of `table`, which must have exactly one
    /// primary-key column.
    pub fn to_table(name: impl Into<String>, table: &Table) -> Self {
        let primary_key = table
            .primary_key()
            .map(|pk| pk.columns().iter().map(|c| table.c(c)).collect())
            .unwrap_or_default();
        Self::with_target(
            name,
            FkTarget::Table {
                name: table.name().to_string(),
                primary_key,
            },
        )
    }

    /// Reference a column of the table being declared. The column must be
    /// declared before this key.
    pub fn to_self(name: impl Into<String>, column: impl Into<String>) -> Self {
        Self::with_target(name, FkTarget::SelfColumn(column.into()))
    }

    fn with_target(name: impl Into<String>, target: FkTarget) -> Self {
        Self {
            name: name.into(),
            data_type: None,
            target,
            on_delete: None,
            on_update: None,
            owner: None,
        }
    }

    /// Override the type of the created column.
    pub fn with_type(mut self, data_type: DataType) -> Self {
        self.data_type = Some(data_type);
        self
    }

    pub fn on_delete(mut self, action: FkAction) -> Self {
        self.on_delete = Some(action);
        self
    }

    pub fn on_update(mut self, action: FkAction) -> Self {
        self.on_update = Some(action);
        self
    }

    /// Name of the created column.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the table holding the key, once attached.
    pub fn table(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    /// The referenced column, once attached.
    pub fn references(&self) -> Option<&Column> {
        match &self.target {
            FkTarget::Column(column) => Some(column),
            _ => None,
        }
    }

    pub fn delete_action(&self) -> Option<FkAction> {
        self.on_delete
    }

    pub fn update_action(&self) -> Option<FkAction> {
        self.on_update
    }

    pub fn data_type(&self) -> Option<&DataType> {
        self.data_type.as_ref()
    }

    pub(crate) fn resolved(mut self, owner: &str, target: Column) -> Self {
        if self.data_type.is_none() {
            self.data_type = target.data_type().map(DataType::base);
        }
        self.target = FkTarget::Column(target);
        self.owner = Some(owner.to_string());
        self
    }

    pub(crate) fn create(&self, d: &dyn Dialect) -> String {
        let mut compiled = d.quote(&self.name);
        if let Some(ty) = &self.data_type {
            compiled.push(' ');
            compiled.push_str(&ty.to_string());
        }
        if let Some(target) = self.references() {
            compiled.push_str(&format!(
                " REFERENCES {}({})",
                d.quote(target.table().unwrap_or_default()),
                d.quote(target.name())
            ));
        }
        if let Some(action) = self.on_delete {
            compiled.push_str(&format!(" ON DELETE {action}"));
        }
        if let Some(action) = self.on_update {
            compiled.push_str(&format!(" ON UPDATE {action}"));
        }
        compiled
    }
}
