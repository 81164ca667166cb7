//! Typed per-atom properties keyed by property name.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::Atom;

/// A single property value as it appears in a [`crate::MoleculeRecord`].
///
/// Untagged, so a JSON number without a fraction parses as [`Self::Int`].
/// An int stored under a key that already holds doubles is widened to a
/// double.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// `true` / `false`.
    Bool(bool),
    /// Integral number.
    Int(i64),
    /// Floating point number.
    Double(f64),
    /// Text, such as an atom name.
    String(String),
}

impl PropertyValue {
    /// The value as a double if it is an int, otherwise unchanged.
    #[must_use]
    pub fn widened(self) -> Self {
        match self {
            Self::Int(v) => Self::Double(v as f64),
            other => other,
        }
    }
}

/// The four property columns of a molecule. Columns and the atoms inside a
/// column both keep insertion order.
#[derive(Clone, Debug, Default)]
pub(crate) struct Properties {
    bools: IndexMap<String, IndexMap<Atom, bool>>,
    ints: IndexMap<String, IndexMap<Atom, i64>>,
    doubles: IndexMap<String, IndexMap<Atom, f64>>,
    strings: IndexMap<String, IndexMap<Atom, String>>,
}

impl Properties {
    pub(crate) fn set(&mut self, atom: Atom, key: &str, value: PropertyValue) {
        let widen = self.doubles.contains_key(key) && !self.ints.contains_key(key);
        let value = if widen { value.widened() } else { value };
        match value {
            PropertyValue::Bool(v) => insert(&mut self.bools, atom, key, v),
            PropertyValue::Int(v) => insert(&mut self.ints, atom, key, v),
            PropertyValue::Double(v) => insert(&mut self.doubles, atom, key, v),
            PropertyValue::String(v) => insert(&mut self.strings, atom, key, v),
        }
    }

    pub(crate) fn bool(&self, atom: Atom, key: &str) -> Option<bool> {
        self.bools.get(key)?.get(&atom).copied()
    }

    pub(crate) fn int(&self, atom: Atom, key: &str) -> Option<i64> {
        self.ints.get(key)?.get(&atom).copied()
    }

    pub(crate) fn double(&self, atom: Atom, key: &str) -> Option<f64> {
        self.doubles.get(key)?.get(&atom).copied()
    }

    pub(crate) fn string(&self, atom: Atom, key: &str) -> Option<&str> {
        self.strings.get(key)?.get(&atom).map(String::as_str)
    }

    pub(crate) fn bool_keys(&self) -> impl Iterator<Item = &str> {
        self.bools.keys().map(String::as_str)
    }

    pub(crate) fn int_keys(&self) -> impl Iterator<Item = &str> {
        self.ints.keys().map(String::as_str)
    }

    pub(crate) fn double_keys(&self) -> impl Iterator<Item = &str> {
        self.doubles.keys().map(String::as_str)
    }

    pub(crate) fn string_keys(&self) -> impl Iterator<Item = &str> {
        self.strings.keys().map(String::as_str)
    }
}

fn insert<T>(columns: &mut IndexMap<String, IndexMap<Atom, T>>, atom: Atom, key: &str, value: T) {
    match columns.get_mut(key) {
        Some(column) => {
            column.insert(atom, value);
        }
        None => {
            let mut column = IndexMap::new();
            column.insert(atom, value);
            columns.insert(key.to_owned(), column);
        }
    }
}
