//! Aggregate and scalar SQL functions over columns.
//!
//! Each returns a copy of the column wrapped in the function, so the result
//! can be selected, aliased, compared and ordered like any other column.

use crate::schema::Column;

/// Wrap a column in an arbitrary function.
pub fn function(name: &str, column: &Column) -> Column {
    column.function(name)
}

pub fn avg(column: &Column) -> Column {
    column.function("AVG")
}

pub fn count(column: &Column) -> Column {
    column.function("COUNT")
}

pub fn date(column: &Column) -> Column {
    column.function("DATE")
}

pub fn max(column: &Column) -> Column {
    column.function("MAX")
}

pub fn min(column: &Column) -> Column {
    column.function("MIN")
}

pub fn stddev(column: &Column) -> Column {
    column.function("STDDEV")
}

pub fn sum(column: &Column) -> Column {
    column.function("SUM")
}

pub fn variance(column: &Column) -> Column {
    column.function("VARIANCE")
}
