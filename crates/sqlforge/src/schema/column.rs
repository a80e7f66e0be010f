//! Columns and the comparison builders they expose.

use std::sync::Arc;

use crate::clause::{Clause, Compiles, all_of, any_of};
use crate::dialect::Dialect;
use crate::error::{Error, Result};
use crate::param::Params;
use crate::schema::DataType;
use crate::stmt::{OrderedColumn, SelectStmt};
use crate::value::Value;

/// A column of a table.
///
/// Columns are values. Setting an alias or wrapping a function returns a new
/// column and leaves the original untouched, so the same column can appear
/// several times in one statement.
#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    name: String,
    table: Option<Arc<str>>,
    data_type: Option<DataType>,
    alias: Option<String>,
    functions: Vec<String>,
    invalid: bool,
}

impl Column {
    /// A detached column. It gets its table when passed to [`Table::new`].
    ///
    /// [`Table::new`]: crate::schema::Table::new
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            table: None,
            data_type: Some(data_type),
            alias: None,
            functions: Vec::new(),
            invalid: false,
        }
    }

    /// A column without a declared type.
    pub fn untyped(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: None,
            data_type: None,
            alias: None,
            functions: Vec::new(),
            invalid: false,
        }
    }

    /// Marker returned by a failed lookup. It carries the attempted name and
    /// table so builders can report it.
    pub(crate) fn invalid(name: &str, table: &str) -> Self {
        Self {
            name: name.to_string(),
            table: Some(Arc::from(table)),
            data_type: None,
            alias: None,
            functions: Vec::new(),
            invalid: true,
        }
    }

    pub(crate) fn attach(&mut self, table: &str) -> Result<()> {
        if let Some(owner) = &self.table {
            return Err(Error::schema(format!(
                "column {} already belongs to table {owner}",
                self.name
            )));
        }
        self.table = Some(Arc::from(table));
        Ok(())
    }

    /// Re-parent a copy of this column under another source name, as when a
    /// subquery is used as a table.
    pub(crate) fn reparent(&self, table: &str) -> Self {
        let mut column = self.clone();
        column.name = self.alias.clone().unwrap_or_else(|| self.name.clone());
        column.table = Some(Arc::from(table));
        column.alias = None;
        column.functions.clear();
        column
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the owning table, if attached.
    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    pub fn data_type(&self) -> Option<&DataType> {
        self.data_type.as_ref()
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// False for the marker produced by a lookup of an unknown name.
    pub fn is_valid(&self) -> bool {
        !self.invalid
    }

    /// `"table"."column"`, quoted by the dialect.
    pub fn full_name(&self, d: &dyn Dialect) -> String {
        match &self.table {
            Some(table) => format!("{}.{}", d.quote(table), d.quote(&self.name)),
            None => d.quote(&self.name),
        }
    }

    /// A copy selected under `alias`.
    pub fn with_alias(&self, alias: impl Into<String>) -> Self {
        let mut column = self.clone();
        column.alias = Some(alias.into());
        column
    }

    /// A copy wrapped in a SQL function, e.g. `COUNT("users"."id")`.
    /// Functions nest in call order: the last one applied is outermost.
    pub fn function(&self, name: impl Into<String>) -> Self {
        let mut column = self.clone();
        column.functions.push(name.into());
        column
    }

    /// Compile for a select list, adding `AS alias` when set.
    pub(crate) fn compile_selected(&self, d: &dyn Dialect, ps: &mut Params) -> Result<String> {
        let compiled = self.compile(d, ps)?;
        Ok(match &self.alias {
            Some(alias) => format!("{compiled} AS {}", d.quote(alias)),
            None => compiled,
        })
    }

    fn compare(&self, op: &str, value: impl Into<Clause>) -> Clause {
        Clause::binary(self.clone(), op, value)
    }

    // ==================== Comparisons ====================

    pub fn equals(&self, value: impl Into<Clause>) -> Clause {
        self.compare(" = ", value)
    }

    pub fn does_not_equal(&self, value: impl Into<Clause>) -> Clause {
        self.compare(" <> ", value)
    }

    pub fn lt(&self, value: impl Into<Clause>) -> Clause {
        self.compare(" < ", value)
    }

    pub fn lte(&self, value: impl Into<Clause>) -> Clause {
        self.compare(" <= ", value)
    }

    pub fn gt(&self, value: impl Into<Clause>) -> Clause {
        self.compare(" > ", value)
    }

    pub fn gte(&self, value: impl Into<Clause>) -> Clause {
        self.compare(" >= ", value)
    }

    pub fn like(&self, value: impl Into<Clause>) -> Clause {
        self.compare(" LIKE ", value)
    }

    pub fn not_like(&self, value: impl Into<Clause>) -> Clause {
        self.compare(" NOT LIKE ", value)
    }

    /// Case-insensitive LIKE (PostgreSQL).
    pub fn ilike(&self, value: impl Into<Clause>) -> Clause {
        self.compare(" ILIKE ", value)
    }

    pub fn not_ilike(&self, value: impl Into<Clause>) -> Clause {
        self.compare(" NOT ILIKE ", value)
    }

    /// `col IN ($1, $2, ...)`.
    ///
    /// An empty list compiles to `1=0`, which matches nothing.
    pub fn in_list<I, V>(&self, values: I) -> Clause
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let params: Vec<Clause> = values.into_iter().map(Clause::param).collect();
        if params.is_empty() {
            return Clause::custom(Literal("1=0"));
        }
        self.compare(" IN ", Clause::func("", Clause::array(params, ", ")))
    }

    /// `col NOT IN ($1, $2, ...)`. An empty list compiles to `1=1`.
    pub fn not_in<I, V>(&self, values: I) -> Clause
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let params: Vec<Clause> = values.into_iter().map(Clause::param).collect();
        if params.is_empty() {
            return Clause::custom(Literal("1=1"));
        }
        self.compare(" NOT IN ", Clause::func("", Clause::array(params, ", ")))
    }

    /// `col IN (SELECT ...)`.
    pub fn in_select(&self, stmt: SelectStmt) -> Clause {
        self.compare(" IN ", stmt)
    }

    pub fn is_null(&self) -> Clause {
        Clause::unary(self.clone(), " IS NULL")
    }

    pub fn is_not_null(&self) -> Clause {
        Clause::unary(self.clone(), " IS NOT NULL")
    }

    /// `(col >= a AND col <= b)`.
    pub fn between(&self, low: impl Into<Clause>, high: impl Into<Clause>) -> Clause {
        all_of([self.gte(low), self.lte(high)])
    }

    /// `(col < a OR col > b)`.
    pub fn not_between(&self, low: impl Into<Clause>, high: impl Into<Clause>) -> Clause {
        any_of([self.lt(low), self.gt(high)])
    }

    // ==================== Ordering ====================

    pub fn asc(&self) -> OrderedColumn {
        OrderedColumn::new(self.clone())
    }

    pub fn desc(&self) -> OrderedColumn {
        OrderedColumn::new(self.clone()).desc()
    }

    pub fn nulls_first(&self) -> OrderedColumn {
        OrderedColumn::new(self.clone()).nulls_first()
    }

    pub fn nulls_last(&self) -> OrderedColumn {
        OrderedColumn::new(self.clone()).nulls_last()
    }
}

impl Compiles for Column {
    fn compile(&self, d: &dyn Dialect, _ps: &mut Params) -> Result<String> {
        let Some(table) = &self.table else {
            return Err(Error::compile(format!(
                "column '{}' does not belong to a table",
                self.name
            )));
        };
        if self.invalid {
            return Err(Error::compile(format!(
                "no column '{}' exists in the table '{table}'",
                self.name
            )));
        }
        let mut compiled = self.full_name(d);
        for function in &self.functions {
            compiled = format!("{function}({compiled})");
        }
        Ok(compiled)
    }
}

#[derive(Debug)]
struct Literal(&'static str);

impl Compiles for Literal {
    fn compile(&self, _d: &dyn Dialect, _ps: &mut Params) -> Result<String> {
        Ok(self.0.to_string())
    }
}
