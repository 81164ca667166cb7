//! Serde description of a molecule.
//!
//! ```ignore
//! {
//!   "atoms": [
//!     { "id": 0, "color": 6 },
//!     { "id": 1, "color": 8, "properties": { "charge": -0.4 } }
//!   ],
//!   "bonds": [[0, 1]]
//! }
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::properties::PropertyValue;
use crate::{Atom, AtomId, Color, Molecule};

/// One atom of a [`MoleculeRecord`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AtomRecord {
    /// External identifier, unique within the record.
    pub id: AtomId,
    /// Atom label.
    pub color: Color,
    /// Named typed properties; omitted when empty.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, PropertyValue>,
}

/// Plain-data form of a [`Molecule`], convertible with
/// [`Molecule::from_record`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MoleculeRecord {
    /// Atoms in insertion order.
    pub atoms: Vec<AtomRecord>,
    /// Bonds as pairs of atom ids.
    #[serde(default)]
    pub bonds: Vec<(AtomId, AtomId)>,
}

impl From<&Molecule> for MoleculeRecord {
    /// Captures atoms, colors, properties and bonds. Properties are listed
    /// bool, int, double, then string columns; a key used by several of
    /// them keeps the last.
    fn from(mol: &Molecule) -> Self {
        Self {
            atoms: mol
                .atoms()
                .map(|atom| AtomRecord {
                    id: mol.id(atom),
                    color: mol.color(atom),
                    properties: properties_of(mol, atom),
                })
                .collect(),
            bonds: mol
                .bonds()
                .map(|(a, b)| (mol.id(a), mol.id(b)))
                .collect(),
        }
    }
}

fn properties_of(mol: &Molecule, atom: Atom) -> IndexMap<String, PropertyValue> {
    let mut properties = IndexMap::new();
    for key in mol.bool_property_keys() {
        if let Some(v) = mol.bool_property(atom, key) {
            properties.insert(key.to_owned(), PropertyValue::Bool(v));
        }
    }
    for key in mol.int_property_keys() {
        if let Some(v) = mol.int_property(atom, key) {
            properties.insert(key.to_owned(), PropertyValue::Int(v));
        }
    }
    for key in mol.double_property_keys() {
        if let Some(v) = mol.double_property(atom, key) {
            properties.insert(key.to_owned(), PropertyValue::Double(v));
        }
    }
    for key in mol.string_property_keys() {
        if let Some(v) = mol.string_property(atom, key) {
            properties.insert(key.to_owned(), PropertyValue::String(v.to_owned()));
        }
    }
    properties
}
