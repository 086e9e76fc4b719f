//! Records the table can display.
//!
//! A record is anything that can list its field names in a stable order and
//! hand back a [`CellValue`] per field. [`Row`] is the general-purpose
//! implementation; JSON objects from list endpoints implement it directly, and
//! call sites with a fixed schema can implement it for their own structs.

use serde_json::{Map, Value};
use ustr::Ustr;

use crate::value::CellValue;

pub trait Record {
    /// Field names in insertion order.
    fn keys(&self) -> Vec<Ustr>;

    /// Value of `key`, [`CellValue::Null`] when absent.
    fn value(&self, key: &str) -> CellValue;

    /// First field whose name matches `key` ignoring ASCII case.
    fn value_ignore_case(&self, key: &str) -> Option<(Ustr, CellValue)> {
        self.keys()
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(key))
            .map(|k| (k, self.value(&k)))
    }
}

/// An ordered list of named values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    fields: Vec<(Ustr, CellValue)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field, or overwrite it in place if the name already exists.
    pub fn with(mut self, key: &str, value: impl Into<CellValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<CellValue>) {
        let key = Ustr::from(key);
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((key, value)),
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Ustr, &CellValue)> {
        self.fields.iter().map(|(k, v)| (k, v))
    }
}

impl<K: AsRef<str>, V: Into<CellValue>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Self::new();
        for (k, v) in iter {
            row.insert(k.as_ref(), v);
        }
        row
    }
}

impl From<Map<String, Value>> for Row {
    fn from(map: Map<String, Value>) -> Self {
        map.into_iter().collect()
    }
}

impl Record for Row {
    fn keys(&self) -> Vec<Ustr> {
        self.fields.iter().map(|(k, _)| *k).collect()
    }

    fn value(&self, key: &str) -> CellValue {
        self.fields
            .iter()
            .find(|(k, _)| k.as_str() == key)
            .map(|(_, v)| v.clone())
            .unwrap_or_default()
    }
}

impl Record for Map<String, Value> {
    fn keys(&self) -> Vec<Ustr> {
        Map::keys(self).map(|k| Ustr::from(k.as_str())).collect()
    }

    fn value(&self, key: &str) -> CellValue {
        self.get(key).map(CellValue::from).unwrap_or_default()
    }
}

impl<R: Record + ?Sized> Record for &R {
    fn keys(&self) -> Vec<Ustr> {
        (**self).keys()
    }

    fn value(&self, key: &str) -> CellValue {
        (**self).value(key)
    }
}
