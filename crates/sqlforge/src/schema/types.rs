//! Neutral column types used by CREATE TABLE.

use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Size {
    Length(u32),
    Precision(u32, u32),
}

/// A column type plus its inline constraints.
///
/// ```ignore
/// DataType::varchar(64).not_null().unique() // VARCHAR(64) NOT NULL UNIQUE
/// DataType::boolean().default_bool(false)   // BOOLEAN DEFAULT FALSE
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataType {
    name: String,
    size: Option<Size>,
    not_null: bool,
    unique: bool,
    default: Option<String>,
}

impl DataType {
    /// A type rendered verbatim, e.g. `DataType::new("JSONB")`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size: None,
            not_null: false,
            unique: false,
            default: None,
        }
    }

    pub fn integer() -> Self {
        Self::new("INTEGER")
    }

    pub fn smallint() -> Self {
        Self::new("SMALLINT")
    }

    pub fn bigint() -> Self {
        Self::new("BIGINT")
    }

    pub fn numeric(precision: u32, scale: u32) -> Self {
        Self::new("NUMERIC").sized(Size::Precision(precision, scale))
    }

    pub fn decimal(precision: u32, scale: u32) -> Self {
        Self::new("DECIMAL").sized(Size::Precision(precision, scale))
    }

    pub fn float() -> Self {
        Self::new("FLOAT")
    }

    pub fn real() -> Self {
        Self::new("REAL")
    }

    pub fn double() -> Self {
        Self::new("DOUBLE PRECISION")
    }

    pub fn boolean() -> Self {
        Self::new("BOOLEAN")
    }

    /// `VARCHAR(limit)`; a zero limit renders as plain `VARCHAR`.
    pub fn varchar(limit: u32) -> Self {
        Self::new("VARCHAR").sized(Size::Length(limit))
    }

    pub fn char(limit: u32) -> Self {
        Self::new("CHAR").sized(Size::Length(limit))
    }

    pub fn text() -> Self {
        Self::new("TEXT")
    }

    pub fn date() -> Self {
        Self::new("DATE")
    }

    pub fn datetime() -> Self {
        Self::new("DATETIME")
    }

    pub fn timestamp() -> Self {
        Self::new("TIMESTAMP")
    }

    fn sized(mut self, size: Size) -> Self {
        self.size = Some(size);
        self
    }

    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Raw SQL default expression, e.g. `now()` or `'draft'`.
    pub fn default(mut self, expr: impl Into<String>) -> Self {
        self.default = Some(expr.into());
        self
    }

    pub fn default_bool(self, value: bool) -> Self {
        self.default(if value { "TRUE" } else { "FALSE" })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_not_null(&self) -> bool {
        self.not_null
    }

    /// The same type without NOT NULL, UNIQUE or DEFAULT.
    pub fn base(&self) -> Self {
        Self {
            name: self.name.clone(),
            size: self.size,
            not_null: false,
            unique: false,
            default: None,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        match self.size {
            Some(Size::Length(0)) | None => {}
            Some(Size::Length(n)) => write!(f, "({n})")?,
            Some(Size::Precision(p, s)) => write!(f, "({p}, {s})")?,
        }
        if self.not_null {
            f.write_str(" NOT NULL")?;
        }
        if self.unique {
            f.write_str(" UNIQUE")?;
        }
        if let Some(default) = &self.default {
            write!(f, " DEFAULT {default}")?;
        }
        Ok(())
    }
}
