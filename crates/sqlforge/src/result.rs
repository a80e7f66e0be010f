//! Row cursors and result materialization.
//!
//! The destination's shape is resolved once per call into a [`Plan`]; each
//! row is then scanned into slots and handed to the destination.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::record::{Field, Record, align_columns};
use crate::value::{FromValue, Value};
use crate::values::Values;

/// A sequential cursor over result rows.
pub trait Rows {
    /// Column names of the result.
    fn columns(&self) -> Result<Vec<String>>;

    /// Move to the next row. Returns false when exhausted or on error.
    fn advance(&mut self) -> bool;

    /// Copy the current row into `dest`, one slot per column.
    fn scan(&mut self, dest: &mut [Value]) -> Result<()>;

    /// Error that ended iteration, if any.
    fn err(&self) -> Result<()>;
}

impl<R: Rows + ?Sized> Rows for Box<R> {
    fn columns(&self) -> Result<Vec<String>> {
        (**self).columns()
    }

    fn advance(&mut self) -> bool {
        (**self).advance()
    }

    fn scan(&mut self, dest: &mut [Value]) -> Result<()> {
        (**self).scan(dest)
    }

    fn err(&self) -> Result<()> {
        (**self).err()
    }
}

/// A fully buffered cursor.
#[derive(Clone, Debug, Default)]
pub struct MemoryRows {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
    current: Option<usize>,
    next: usize,
    error: Option<String>,
}

impl MemoryRows {
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>, rows: Vec<Vec<Value>>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows,
            current: None,
            next: 0,
            error: None,
        }
    }

    /// Make the cursor report `msg` from [`Rows::err`] once exhausted.
    pub fn with_error(mut self, msg: impl Into<String>) -> Self {
        self.error = Some(msg.into());
        self
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl Rows for MemoryRows {
    fn columns(&self) -> Result<Vec<String>> {
        Ok(self.columns.clone())
    }

    fn advance(&mut self) -> bool {
        if self.next < self.rows.len() {
            self.current = Some(self.next);
            self.next += 1;
            true
        } else {
            self.current = None;
            false
        }
    }

    fn scan(&mut self, dest: &mut [Value]) -> Result<()> {
        let Some(index) = self.current else {
            return Err(Error::Cursor("scan called without a current row".to_string()));
        };
        if dest.len() != self.columns.len() {
            return Err(Error::Cursor(format!(
                "expected {} destination slots, got {}",
                self.columns.len(),
                dest.len()
            )));
        }
        for (slot, value) in dest.iter_mut().zip(&self.rows[index]) {
            *slot = value.clone();
        }
        Ok(())
    }

    fn err(&self) -> Result<()> {
        match &self.error {
            Some(msg) if self.current.is_none() => Err(Error::Cursor(msg.clone())),
            _ => Ok(()),
        }
    }
}

/// The kind of value a destination holds.
#[derive(Clone, Copy, Debug)]
pub enum Shape {
    /// A single value; the result must have exactly one column.
    Scalar,
    /// A name-to-value map; every column is copied in.
    Map,
    /// A record; columns are aligned to its fields.
    Record(&'static [Field]),
}

/// Column-to-destination wiring, built once per materialization call.
#[derive(Clone, Debug)]
pub enum Plan {
    Scalar { column: String },
    Map { columns: Vec<String> },
    Record { columns: Vec<String>, slots: Vec<Option<usize>> },
}

impl Plan {
    pub fn build(shape: Shape, columns: Vec<String>) -> Result<Self> {
        match shape {
            Shape::Scalar => {
                let count = columns.len();
                match <[String; 1]>::try_from(columns) {
                    Ok([column]) => Ok(Plan::Scalar { column }),
                    Err(_) => Err(Error::unsupported(format!(
                        "cannot scan {count} columns into a single value"
                    ))),
                }
            }
            Shape::Map => Ok(Plan::Map { columns }),
            Shape::Record(fields) => {
                let slots = align_columns(&columns, fields);
                Ok(Plan::Record { columns, slots })
            }
        }
    }

    /// Number of scan slots per row.
    pub fn width(&self) -> usize {
        match self {
            Plan::Scalar { .. } => 1,
            Plan::Map { columns } | Plan::Record { columns, .. } => columns.len(),
        }
    }

    /// Extract the single value of a scalar plan.
    pub fn scalar<T: FromValue>(&self, row: Vec<Value>) -> Result<T> {
        let Plan::Scalar { column } = self else {
            return Err(Error::unsupported("destination expected a single column"));
        };
        let value = row.into_iter().next().unwrap_or_default();
        T::from_value(value).map_err(|e| Error::decode(column, e))
    }

    /// Copy a row into a map, replacing entries with the same name.
    pub fn fill_map(&self, map: &mut Values, row: Vec<Value>) -> Result<()> {
        let Plan::Map { columns } = self else {
            return Err(Error::unsupported("destination expected a map"));
        };
        for (column, value) in columns.iter().zip(row) {
            map.insert(column.clone(), value);
        }
        Ok(())
    }

    /// Store aligned values into a record. Unmatched columns are dropped.
    pub fn fill_record<R: Record>(&self, record: &mut R, row: Vec<Value>) -> Result<()> {
        let Plan::Record { columns, slots } = self else {
            return Err(Error::unsupported("destination expected a record"));
        };
        for ((column, slot), value) in columns.iter().zip(slots).zip(row) {
            if let Some(index) = slot {
                record
                    .set(*index, value)
                    .map_err(|e| Error::decode(column, e))?;
            }
        }
        Ok(())
    }
}

/// A type rows can be materialized into.
///
/// Implemented for scalars, [`Values`] and, through `#[derive(Record)]`,
/// for records.
pub trait Destination {
    fn shape() -> Shape;

    fn fill(&mut self, plan: &Plan, row: Vec<Value>) -> Result<()>;
}

macro_rules! scalar_destination {
    ($($t:ty),* $(,)?) => {
        $(
            impl Destination for $t {
                fn shape() -> Shape {
                    Shape::Scalar
                }

                fn fill(&mut self, plan: &Plan, row: Vec<Value>) -> Result<()> {
                    *self = plan.scalar(row)?;
                    Ok(())
                }
            }
        )*
    };
}

scalar_destination!(
    Value,
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
    Vec<u8>,
    NaiveDate,
    NaiveDateTime,
    DateTime<Utc>,
    Uuid,
    serde_json::Value,
);

impl<T: FromValue> Destination for Option<T> {
    fn shape() -> Shape {
        Shape::Scalar
    }

    fn fill(&mut self, plan: &Plan, row: Vec<Value>) -> Result<()> {
        *self = plan.scalar(row)?;
        Ok(())
    }
}

impl Destination for Values {
    fn shape() -> Shape {
        Shape::Map
    }

    fn fill(&mut self, plan: &Plan, row: Vec<Value>) -> Result<()> {
        plan.fill_map(self, row)
    }
}

/// Materializes a cursor into destinations.
#[derive(Debug)]
pub struct QueryResult<R> {
    rows: R,
}

impl<R: Rows> QueryResult<R> {
    pub fn new(rows: R) -> Self {
        Self { rows }
    }

    pub fn into_inner(self) -> R {
        self.rows
    }

    fn scan_row(&mut self, width: usize) -> Result<Vec<Value>> {
        let mut slots = vec![Value::Null; width];
        self.rows.scan(&mut slots)?;
        Ok(slots)
    }

    /// Read the first row into `dest`. Zero rows is [`Error::NoRows`].
    pub fn one<D: Destination>(&mut self, dest: &mut D) -> Result<()> {
        if !self.rows.advance() {
            self.rows.err()?;
            return Err(Error::NoRows);
        }
        let plan = Plan::build(D::shape(), self.rows.columns()?)?;
        let row = self.scan_row(plan.width())?;
        dest.fill(&plan, row)?;
        self.rows.err()
    }

    /// Read every row into `dest`.
    ///
    /// Existing elements are filled in place, in order, before new elements
    /// are appended. Elements beyond the row count are left as they are.
    pub fn all<D: Destination + Default>(&mut self, dest: &mut Vec<D>) -> Result<()> {
        let plan = Plan::build(D::shape(), self.rows.columns()?)?;
        let mut index = 0;
        while self.rows.advance() {
            let row = self.scan_row(plan.width())?;
            match dest.get_mut(index) {
                Some(existing) => existing.fill(&plan, row)?,
                None => {
                    let mut elem = D::default();
                    elem.fill(&plan, row)?;
                    dest.push(elem);
                }
            }
            index += 1;
        }
        self.rows.err()
    }
}
