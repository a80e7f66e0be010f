//! JOIN clauses.

use std::fmt;

use crate::clause::{Clause, Compiles};
use crate::dialect::Dialect;
use crate::error::Result;
use crate::param::Params;
use crate::stmt::FromItem;

/// Join method.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JoinKind {
    Cross,
    Inner,
    LeftOuter,
    RightOuter,
    FullOuter,
}

impl fmt::Display for JoinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            JoinKind::Cross => "CROSS JOIN",
            JoinKind::Inner => "INNER JOIN",
            JoinKind::LeftOuter => "LEFT OUTER JOIN",
            JoinKind::RightOuter => "RIGHT OUTER JOIN",
            JoinKind::FullOuter => "FULL OUTER JOIN",
        })
    }
}

#[derive(Clone, Debug)]
pub(crate) struct JoinClause {
    pub(crate) kind: JoinKind,
    pub(crate) table: FromItem,
    pub(crate) on: Vec<Clause>,
}

impl Compiles for JoinClause {
    /// Compiles with a leading space so joins concatenate after FROM.
    fn compile(&self, d: &dyn Dialect, ps: &mut Params) -> Result<String> {
        let table = self.table.compile(d, ps)?;
        if self.kind == JoinKind::Cross {
            return Ok(format!(" {} {table}", self.kind));
        }
        if self.on.is_empty() {
            return Ok(format!(" NATURAL {} {table}", self.kind));
        }
        let on = self
            .on
            .iter()
            .map(|c| c.compile(d, ps))
            .collect::<Result<Vec<_>>>()?;
        Ok(format!(" {} {table} ON {}", self.kind, on.join(" AND ")))
    }
}
