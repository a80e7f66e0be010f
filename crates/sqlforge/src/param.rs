//! The parameter sink threaded through every compile call.

use crate::dialect::Dialect;
use crate::value::Value;

/// Ordered, append-only collection of values bound during one compile pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Params {
    values: Vec<Value>,
}

impl Params {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value and return its zero-based index.
    pub fn push(&mut self, value: Value) -> usize {
        self.values.push(value);
        self.values.len() - 1
    }

    /// Append a value and return the dialect placeholder referencing it.
    pub fn bind(&mut self, dialect: &dyn Dialect, value: Value) -> String {
        let index = self.push(value);
        dialect.param(index)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[Value] {
        &self.values
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.values.iter()
    }

    pub fn into_vec(self) -> Vec<Value> {
        self.values
    }
}

impl<'a> IntoIterator for &'a Params {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{Postgres, Sqlite};

    #[test]
    fn test_bind_tracks_index() {
        let mut ps = Params::new();
        assert_eq!(ps.bind(&Postgres, Value::from(1)), "$1");
        assert_eq!(ps.bind(&Postgres, Value::from("x")), "$2");
        assert_eq!(ps.len(), 2);
        assert_eq!(ps.as_slice(), &[Value::Int(1), Value::Text("x".into())]);
    }

    #[test]
    fn test_bind_generic_dialect() {
        let mut ps = Params::new();
        assert_eq!(ps.bind(&Sqlite, Value::Null), "?");
        assert_eq!(ps.bind(&Sqlite, Value::Null), "?");
        assert_eq!(ps.into_vec().len(), 2);
    }
}
