//! Raw SQL with named parameters.

use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::clause::Compiles;
use crate::dialect::Dialect;
use crate::error::{Result, StmtErrors};
use crate::param::Params;
use crate::record::Record;
use crate::values::Values;

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // `::name` is a cast and is matched only so it can be skipped.
    RE.get_or_init(|| Regex::new(r"::\w*|:(\w+)").expect("invalid built-in placeholder regex"))
}

/// A hand-written statement with `:name` placeholders.
///
/// ```ignore
/// text("SELECT * FROM users WHERE name = :name AND created_at > :since::date")
///     .values(Values::new().with("name", "admin").with("since", "2024-01-01"))
/// ```
///
/// Every occurrence binds its own parameter, left to right.
#[derive(Clone, Debug)]
pub struct TextStmt {
    text: String,
    values: Values,
}

pub fn text(sql: impl Into<String>) -> TextStmt {
    TextStmt {
        text: sql.into(),
        values: Values::new(),
    }
}

impl TextStmt {
    /// Merge values into the statement's parameters.
    pub fn values(mut self, values: Values) -> Self {
        self.values = self.values.merge(&values);
        self
    }

    /// Merge the record's fields as parameters.
    pub fn record<R: Record>(self, record: &R) -> Self {
        self.values(Values::of(record))
    }
}

impl Compiles for TextStmt {
    fn compile(&self, d: &dyn Dialect, ps: &mut Params) -> Result<String> {
        let mut errs = StmtErrors::new();
        let compiled = placeholder_re().replace_all(&self.text, |caps: &Captures<'_>| {
            let Some(name) = caps.get(1) else {
                return caps[0].to_string();
            };
            match self.values.get(name.as_str()) {
                Some(value) => ps.bind(d, value.clone()),
                None => {
                    errs.add_meta(format!("missing value for parameter '{}'", name.as_str()));
                    caps[0].to_string()
                }
            }
        });
        errs.check()?;
        Ok(compiled.into_owned())
    }
}
