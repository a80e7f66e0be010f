//! The clause algebra.
//!
//! Every node compiles against a dialect and a parameter sink. Parameters are
//! appended to the sink in traversal order, so the placeholder emitted for the
//! k-th parameter always references sink index k-1.

use std::fmt::Debug;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use uuid::Uuid;

use crate::dialect::{Dialect, Postgres};
use crate::error::Result;
use crate::param::Params;
use crate::schema::Column;
use crate::stmt::SelectStmt;
use crate::value::Value;

/// Anything that renders to SQL text while binding values into a sink.
pub trait Compiles: Debug {
    fn compile(&self, d: &dyn Dialect, ps: &mut Params) -> Result<String>;

    /// Render with the neutral (PostgreSQL-style) dialect, discarding values.
    fn to_sql(&self) -> Result<String> {
        let mut ps = Params::new();
        self.compile(&Postgres, &mut ps)
    }
}

/// Compile a statement or clause with a fresh parameter sink.
pub fn compile(d: &dyn Dialect, stmt: &(impl Compiles + ?Sized)) -> Result<(String, Params)> {
    let mut ps = Params::new();
    let sql = stmt.compile(d, &mut ps)?;
    Ok((sql, ps))
}

/// A node in the expression tree.
#[derive(Clone, Debug)]
pub enum Clause {
    /// `left sep right`
    Binary {
        left: Box<Clause>,
        sep: String,
        right: Box<Clause>,
    },
    /// `operand suffix`, e.g. `x IS NULL`
    Unary { operand: Box<Clause>, suffix: String },
    /// Members joined by a separator. Empty lists render as "".
    Array { clauses: Vec<Clause>, sep: String },
    /// `NAME(inner)`; an empty name is plain parentheses.
    Func { name: String, inner: Box<Clause> },
    /// A bound value.
    Param(Value),
    Column(Column),
    /// A nested SELECT, parenthesized unless it carries its own alias.
    Select(Box<SelectStmt>),
    /// User-supplied node.
    Custom(Arc<dyn Compiles + Send + Sync>),
}

impl Clause {
    pub fn binary(left: impl Into<Clause>, sep: impl Into<String>, right: impl Into<Clause>) -> Self {
        Clause::Binary {
            left: Box::new(left.into()),
            sep: sep.into(),
            right: Box::new(right.into()),
        }
    }

    pub fn unary(operand: impl Into<Clause>, suffix: impl Into<String>) -> Self {
        Clause::Unary {
            operand: Box::new(operand.into()),
            suffix: suffix.into(),
        }
    }

    pub fn array(clauses: impl IntoIterator<Item = Clause>, sep: impl Into<String>) -> Self {
        Clause::Array {
            clauses: clauses.into_iter().collect(),
            sep: sep.into(),
        }
    }

    pub fn func(name: impl Into<String>, inner: impl Into<Clause>) -> Self {
        Clause::Func {
            name: name.into(),
            inner: Box::new(inner.into()),
        }
    }

    pub fn param(value: impl Into<Value>) -> Self {
        Clause::Param(value.into())
    }

    pub fn custom(node: impl Compiles + Send + Sync + 'static) -> Self {
        Clause::Custom(Arc::new(node))
    }
}

/// Conjunction of clauses: `(a AND b)`.
pub fn all_of(clauses: impl IntoIterator<Item = Clause>) -> Clause {
    Clause::func("", Clause::array(clauses, " AND "))
}

/// Disjunction of clauses: `(a OR b)`.
pub fn any_of(clauses: impl IntoIterator<Item = Clause>) -> Clause {
    Clause::func("", Clause::array(clauses, " OR "))
}

impl Compiles for Clause {
    fn compile(&self, d: &dyn Dialect, ps: &mut Params) -> Result<String> {
        match self {
            Clause::Binary { left, sep, right } => {
                let left = left.compile(d, ps)?;
                let right = right.compile(d, ps)?;
                Ok(format!("{left}{sep}{right}"))
            }
            Clause::Unary { operand, suffix } => Ok(format!("{}{suffix}", operand.compile(d, ps)?)),
            Clause::Array { clauses, sep } => {
                let parts = clauses
                    .iter()
                    .map(|c| c.compile(d, ps))
                    .collect::<Result<Vec<_>>>()?;
                Ok(parts.join(sep))
            }
            Clause::Func { name, inner } => Ok(format!("{name}({})", inner.compile(d, ps)?)),
            Clause::Param(value) => Ok(ps.bind(d, value.clone())),
            Clause::Column(column) => column.compile(d, ps),
            Clause::Select(stmt) => {
                let sql = stmt.compile(d, ps)?;
                if stmt.alias().is_some() {
                    Ok(sql)
                } else {
                    Ok(format!("({sql})"))
                }
            }
            Clause::Custom(node) => node.compile(d, ps),
        }
    }
}

impl From<Column> for Clause {
    fn from(column: Column) -> Self {
        Clause::Column(column)
    }
}

impl From<&Column> for Clause {
    fn from(column: &Column) -> Self {
        Clause::Column(column.clone())
    }
}

impl From<SelectStmt> for Clause {
    fn from(stmt: SelectStmt) -> Self {
        Clause::Select(Box::new(stmt))
    }
}

impl From<Value> for Clause {
    fn from(value: Value) -> Self {
        Clause::Param(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Clause {
    fn from(value: Option<T>) -> Self {
        Clause::Param(value.into())
    }
}

macro_rules! clause_from_value {
    ($($t:ty),* $(,)?) => {
        $(
            impl From<$t> for Clause {
                fn from(v: $t) -> Self {
                    Clause::Param(Value::from(v))
                }
            }
        )*
    };
}

clause_from_value!(
    bool,
    i8,
    i16,
    i32,
    i64,
    u8,
    u16,
    u32,
    u64,
    usize,
    f32,
    f64,
    String,
    &str,
    &String,
    Vec<u8>,
    NaiveDate,
    NaiveDateTime,
    DateTime<Utc>,
    Uuid,
    serde_json::Value,
);
