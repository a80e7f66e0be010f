//! `Values`: a column-name to value map.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::clause::Compiles;
use crate::dialect::Dialect;
use crate::error::Result;
use crate::param::Params;
use crate::record::Record;
use crate::value::Value;

/// Column values keyed by name. Iteration is always in sorted key order,
/// which makes compiled output deterministic.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Values(BTreeMap<String, Value>);

impl Values {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// Keys in sorted order.
    pub fn keys(&self) -> Vec<&str> {
        self.0.keys().map(String::as_str).collect()
    }

    /// Values in key order.
    pub fn values(&self) -> Vec<&Value> {
        self.0.values().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entries of `self` that are missing from `other` or hold a different
    /// value there.
    pub fn diff(&self, other: &Values) -> Values {
        Values(
            self.0
                .iter()
                .filter(|(k, v)| other.0.get(*k) != Some(*v))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }

    pub fn equals(&self, other: &Values) -> bool {
        self == other
    }

    /// A copy without the given keys.
    pub fn exclude<'a>(&self, keys: impl IntoIterator<Item = &'a str>) -> Values {
        let mut out = self.clone();
        for key in keys {
            out.0.remove(key);
        }
        out
    }

    /// Alias of [`Values::exclude`].
    pub fn reject<'a>(&self, keys: impl IntoIterator<Item = &'a str>) -> Values {
        self.exclude(keys)
    }

    /// A copy with only the given keys.
    pub fn filter<'a>(&self, keys: impl IntoIterator<Item = &'a str>) -> Values {
        let mut out = Values::new();
        for key in keys {
            if let Some(value) = self.0.get(key) {
                out.0.insert(key.to_string(), value.clone());
            }
        }
        out
    }

    /// A copy with every entry of `other` added. `other` wins on conflicts.
    pub fn merge(&self, other: &Values) -> Values {
        let mut out = self.clone();
        out.0
            .extend(other.0.iter().map(|(k, v)| (k.clone(), v.clone())));
        out
    }

    /// Collect a record's fields, skipping empty `omit_empty` fields.
    pub fn of<R: Record>(record: &R) -> Values {
        Self::collect(record, false)
    }

    /// Like [`Values::of`] but also skips `omit_update` fields.
    pub fn for_update<R: Record>(record: &R) -> Values {
        Self::collect(record, true)
    }

    fn collect<R: Record>(record: &R, updating: bool) -> Values {
        let mut out = Values::new();
        for (index, field) in R::fields().iter().enumerate() {
            if updating && field.options.omit_update {
                continue;
            }
            let value = record.get(index);
            if field.options.omit_empty && value.is_empty() {
                continue;
            }
            out.0.insert(field.name.clone(), value);
        }
        out
    }
}

impl Compiles for Values {
    /// `"a" = $1, "b" = $2` in key order.
    fn compile(&self, d: &dyn Dialect, ps: &mut Params) -> Result<String> {
        let pairs: Vec<String> = self
            .0
            .iter()
            .map(|(k, v)| format!("{} = {}", d.quote(k), ps.bind(d, v.clone())))
            .collect();
        Ok(pairs.join(", "))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Values {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Values(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl IntoIterator for Values {
    type Item = (String, Value);
    type IntoIter = std::collections::btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
