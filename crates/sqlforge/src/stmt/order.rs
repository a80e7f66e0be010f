//! ORDER BY entries.

use crate::clause::Compiles;
use crate::dialect::Dialect;
use crate::error::Result;
use crate::param::Params;
use crate::schema::Column;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Nulls {
    First,
    Last,
}

/// A column with a sort direction and NULL placement.
#[derive(Clone, Debug, PartialEq)]
pub struct OrderedColumn {
    inner: Column,
    desc: bool,
    nulls: Option<Nulls>,
}

impl OrderedColumn {
    pub fn new(inner: Column) -> Self {
        Self {
            inner,
            desc: false,
            nulls: None,
        }
    }

    pub fn asc(mut self) -> Self {
        self.desc = false;
        self
    }

    pub fn desc(mut self) -> Self {
        self.desc = true;
        self
    }

    pub fn nulls_first(mut self) -> Self {
        self.nulls = Some(Nulls::First);
        self
    }

    pub fn nulls_last(mut self) -> Self {
        self.nulls = Some(Nulls::Last);
        self
    }

    pub fn column(&self) -> &Column {
        &self.inner
    }
}

impl From<Column> for OrderedColumn {
    fn from(column: Column) -> Self {
        Self::new(column)
    }
}

impl From<&Column> for OrderedColumn {
    fn from(column: &Column) -> Self {
        Self::new(column.clone())
    }
}

impl Compiles for OrderedColumn {
    fn compile(&self, d: &dyn Dialect, ps: &mut Params) -> Result<String> {
        let mut compiled = self.inner.compile(d, ps)?;
        if self.desc {
            compiled.push_str(" DESC");
        }
        match self.nulls {
            Some(Nulls::First) => compiled.push_str(" NULLS FIRST"),
            Some(Nulls::Last) => compiled.push_str(" NULLS LAST"),
            None => {}
        }
        Ok(compiled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{DataType, Table};

    #[test]
    fn test_ordering() {
        let t = Table::new("t", vec![Column::new("a", DataType::integer()).into()]).unwrap();
        assert_eq!(t.c("a").asc().to_sql().unwrap(), r#""t"."a""#);
        assert_eq!(t.c("a").desc().to_sql().unwrap(), r#""t"."a" DESC"#);
        assert_eq!(
            t.c("a").desc().nulls_last().to_sql().unwrap(),
            r#""t"."a" DESC NULLS LAST"#
        );
        assert_eq!(t.c("a").nulls_first().to_sql().unwrap(), r#""t"."a" NULLS FIRST"#);
    }
}
