//! Attributed molecular graph.
//!
//! Atoms and bonds live in a petgraph arena; handles are stable as long as
//! nothing is removed, and nothing ever is. Every iterator on [`Molecule`]
//! yields items in insertion order, which downstream canonization and
//! rendering rely on for reproducible output.

use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;

use crate::properties::{Properties, PropertyValue};
use crate::record::MoleculeRecord;
use crate::{AtomId, Color, MoleculeError, PeriodicTable};

/// Graph handle of an atom inside one molecule.
pub type Atom = NodeIndex;

/// Graph handle of a bond inside one molecule.
pub type Bond = EdgeIndex;

/// Payload stored on each atom node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AtomData {
    id: AtomId,
    color: Color,
}

impl AtomData {
    /// External identifier of the atom.
    #[must_use]
    pub const fn id(&self) -> AtomId {
        self.id
    }

    /// Atom label, usually the atomic number.
    #[must_use]
    pub const fn color(&self) -> Color {
        self.color
    }
}

/// An undirected molecular graph with colored atoms, external atom ids,
/// and typed atom properties.
#[derive(Clone, Debug)]
pub struct Molecule {
    graph: UnGraph<AtomData, ()>,
    id_to_atom: IndexMap<AtomId, Atom>,
    next_id: u32,
    periodic_table: Arc<PeriodicTable>,
    properties: Properties,
}

impl Default for Molecule {
    fn default() -> Self {
        Self::new()
    }
}

impl Molecule {
    /// An empty molecule using the default periodic table.
    #[must_use]
    pub fn new() -> Self {
        Self::with_periodic_table(Arc::new(PeriodicTable::default()))
    }

    /// An empty molecule sharing `periodic_table`.
    #[must_use]
    pub fn with_periodic_table(periodic_table: Arc<PeriodicTable>) -> Self {
        Self {
            graph: UnGraph::default(),
            id_to_atom: IndexMap::new(),
            next_id: 0,
            periodic_table,
            properties: Properties::default(),
        }
    }

    /// Builds a molecule from its serde description.
    ///
    /// # Errors
    ///
    /// Fails on duplicate atom ids, bonds to unknown ids, self bonds and
    /// repeated bonds.
    pub fn from_record(record: &MoleculeRecord) -> Result<Self, MoleculeError> {
        // a key holding a double anywhere is a double column for every atom
        let double_keys: IndexSet<&str> = record
            .atoms
            .iter()
            .flat_map(|atom| &atom.properties)
            .filter(|(_, value)| matches!(value, PropertyValue::Double(_)))
            .map(|(key, _)| key.as_str())
            .collect();

        let mut mol = Self::new();
        for atom in &record.atoms {
            let handle = mol.add_atom(atom.id, atom.color)?;
            for (key, value) in &atom.properties {
                let value = if double_keys.contains(key.as_str()) {
                    value.clone().widened()
                } else {
                    value.clone()
                };
                mol.set_property(handle, key, value);
            }
        }
        for &(a, b) in &record.bonds {
            mol.add_bond(a, b)?;
        }
        tracing::debug!(
            "molecule built from record: {} atoms, {} bonds",
            mol.atom_count(),
            mol.bond_count()
        );
        Ok(mol)
    }

    /// Adds an atom with an explicit identifier.
    ///
    /// # Errors
    ///
    /// [`MoleculeError::DuplicateAtomId`] if `id` is already taken.
    pub fn add_atom(&mut self, id: AtomId, color: Color) -> Result<Atom, MoleculeError> {
        if self.id_to_atom.contains_key(&id) {
            return Err(MoleculeError::DuplicateAtomId(id));
        }
        let atom = self.graph.add_node(AtomData { id, color });
        self.id_to_atom.insert(id, atom);
        self.next_id = self.next_id.max(id.raw().saturating_add(1));
        Ok(atom)
    }

    /// Adds an atom whose identifier is one past the largest id seen so far.
    pub fn push_atom(&mut self, color: Color) -> Atom {
        let id = AtomId::new(self.next_id);
        let atom = self.graph.add_node(AtomData { id, color });
        self.id_to_atom.insert(id, atom);
        self.next_id = self.next_id.saturating_add(1);
        atom
    }

    /// Bonds the atoms identified by `a` and `b`.
    ///
    /// # Errors
    ///
    /// Unknown ids, self bonds, and bonds that already exist are rejected.
    pub fn add_bond(&mut self, a: AtomId, b: AtomId) -> Result<Bond, MoleculeError> {
        let u = self.atom_by_id(a).ok_or(MoleculeError::UnknownAtomId(a))?;
        let v = self.atom_by_id(b).ok_or(MoleculeError::UnknownAtomId(b))?;
        self.connect(u, v)
    }

    /// Bonds two atoms by handle.
    ///
    /// # Errors
    ///
    /// Self bonds and bonds that already exist are rejected.
    ///
    /// # Panics
    ///
    /// Panics if either handle does not belong to this molecule.
    pub fn connect(&mut self, u: Atom, v: Atom) -> Result<Bond, MoleculeError> {
        if u == v {
            return Err(MoleculeError::SelfBond(self.id(u)));
        }
        if self.has_bond(u, v) {
            return Err(MoleculeError::DuplicateBond(self.id(u), self.id(v)));
        }
        Ok(self.graph.add_edge(u, v, ()))
    }

    /// The underlying graph.
    #[must_use]
    pub const fn graph(&self) -> &UnGraph<AtomData, ()> {
        &self.graph
    }

    /// Number of atoms.
    #[must_use]
    pub fn atom_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of bonds.
    #[must_use]
    pub fn bond_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Whether the molecule has no atoms.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// All atoms in insertion order. The iterator is `Clone`, so it can drive
    /// pairwise walks such as `tuple_combinations`.
    pub fn atoms(&self) -> impl Iterator<Item = Atom> + Clone + '_ {
        self.graph.node_indices()
    }

    /// All bonds as endpoint pairs, in insertion order.
    pub fn bonds(&self) -> impl Iterator<Item = (Atom, Atom)> + '_ {
        self.graph.edge_references().map(|e| (e.source(), e.target()))
    }

    /// Whether `atom` is a handle issued by this molecule.
    #[must_use]
    pub fn contains(&self, atom: Atom) -> bool {
        atom.index() < self.graph.node_count()
    }

    /// Color of `atom`.
    ///
    /// # Panics
    ///
    /// Panics if `atom` does not belong to this molecule.
    #[must_use]
    pub fn color(&self, atom: Atom) -> Color {
        self.graph[atom].color
    }

    /// External identifier of `atom`.
    ///
    /// # Panics
    ///
    /// Panics if `atom` does not belong to this molecule.
    #[must_use]
    pub fn id(&self, atom: Atom) -> AtomId {
        self.graph[atom].id
    }

    /// Handle of the atom with identifier `id`, if there is one.
    #[must_use]
    pub fn atom_by_id(&self, id: AtomId) -> Option<Atom> {
        self.id_to_atom.get(&id).copied()
    }

    /// Number of bonds incident to `atom`.
    #[must_use]
    pub fn degree(&self, atom: Atom) -> usize {
        self.graph.edges(atom).count()
    }

    /// Bonded neighbours of `atom`, in bond insertion order.
    #[must_use]
    pub fn neighbors(&self, atom: Atom) -> Vec<Atom> {
        // petgraph walks incident edges newest first
        let mut neighbors: Vec<Atom> = self.graph.neighbors(atom).collect();
        neighbors.reverse();
        neighbors
    }

    /// Incident bonds of `atom`, in bond insertion order.
    #[must_use]
    pub fn incident_bonds(&self, atom: Atom) -> Vec<Bond> {
        let mut bonds: Vec<Bond> = self.graph.edges(atom).map(|e| e.id()).collect();
        bonds.reverse();
        bonds
    }

    /// The endpoint of `bond` that is not `atom`, if `atom` is an endpoint.
    #[must_use]
    pub fn opposite(&self, atom: Atom, bond: Bond) -> Option<Atom> {
        let (a, b) = self.graph.edge_endpoints(bond)?;
        if a == atom {
            Some(b)
        } else if b == atom {
            Some(a)
        } else {
            None
        }
    }

    /// Whether `u` and `v` are bonded.
    #[must_use]
    pub fn has_bond(&self, u: Atom, v: Atom) -> bool {
        self.graph.find_edge(u, v).is_some()
    }

    /// Table used to name and draw atoms.
    #[must_use]
    pub const fn periodic_table(&self) -> &Arc<PeriodicTable> {
        &self.periodic_table
    }

    /// Element symbol of `atom`.
    #[must_use]
    pub fn element(&self, atom: Atom) -> &str {
        self.periodic_table.element(self.color(atom))
    }

    /// Graphviz fill color of `atom`.
    #[must_use]
    pub fn chem_color(&self, atom: Atom) -> &str {
        self.periodic_table.chem_color(self.color(atom))
    }

    /// Sets a typed property on `atom`. A value of a different type under the
    /// same key lives in a separate column, except that an int under a key
    /// that so far only holds doubles is stored as a double.
    pub fn set_property(&mut self, atom: Atom, key: &str, value: PropertyValue) {
        self.properties.set(atom, key, value);
    }

    /// Boolean property `key` of `atom`.
    #[must_use]
    pub fn bool_property(&self, atom: Atom, key: &str) -> Option<bool> {
        self.properties.bool(atom, key)
    }

    /// Integer property `key` of `atom`.
    #[must_use]
    pub fn int_property(&self, atom: Atom, key: &str) -> Option<i64> {
        self.properties.int(atom, key)
    }

    /// Floating point property `key` of `atom`.
    #[must_use]
    pub fn double_property(&self, atom: Atom, key: &str) -> Option<f64> {
        self.properties.double(atom, key)
    }

    /// String property `key` of `atom`.
    #[must_use]
    pub fn string_property(&self, atom: Atom, key: &str) -> Option<&str> {
        self.properties.string(atom, key)
    }

    /// Names of the boolean property columns, in insertion order.
    #[must_use]
    pub fn bool_property_keys(&self) -> Vec<&str> {
        self.properties.bool_keys().collect()
    }

    /// Names of the integer property columns.
    #[must_use]
    pub fn int_property_keys(&self) -> Vec<&str> {
        self.properties.int_keys().collect()
    }

    /// Names of the floating point property columns.
    #[must_use]
    pub fn double_property_keys(&self) -> Vec<&str> {
        self.properties.double_keys().collect()
    }

    /// Names of the string property columns.
    #[must_use]
    pub fn string_property_keys(&self) -> Vec<&str> {
        self.properties.string_keys().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ethanol() -> Molecule {
        let mut mol = Molecule::new();
        mol.add_atom(AtomId::new(10), 6).unwrap();
        mol.add_atom(AtomId::new(11), 6).unwrap();
        mol.add_atom(AtomId::new(12), 8).unwrap();
        mol.add_bond(AtomId::new(10), AtomId::new(11)).unwrap();
        mol.add_bond(AtomId::new(11), AtomId::new(12)).unwrap();
        mol
    }

    #[test]
    fn atoms_and_bonds_keep_insertion_order() {
        let mol = ethanol();
        let ids: Vec<u32> = mol.atoms().map(|a| mol.id(a).raw()).collect();
        assert_eq!(ids, vec![10, 11, 12]);

        let bonds: Vec<(u32, u32)> = mol
            .bonds()
            .map(|(a, b)| (mol.id(a).raw(), mol.id(b).raw()))
            .collect();
        assert_eq!(bonds, vec![(10, 11), (11, 12)]);

        let middle = mol.atom_by_id(AtomId::new(11)).unwrap();
        let neighbors: Vec<u32> = mol
            .neighbors(middle)
            .into_iter()
            .map(|a| mol.id(a).raw())
            .collect();
        assert_eq!(neighbors, vec![10, 12]);
        assert_eq!(mol.degree(middle), 2);
    }

    #[test]
    fn atom_walks_can_be_restarted() {
        let mol = ethanol();
        let atoms = mol.atoms();
        let bonded: Vec<(u32, u32)> = atoms
            .clone()
            .flat_map(|u| atoms.clone().filter(move |&v| u < v).map(move |v| (u, v)))
            .filter(|&(u, v)| mol.has_bond(u, v))
            .map(|(u, v)| (mol.id(u).raw(), mol.id(v).raw()))
            .collect();
        assert_eq!(bonded, vec![(10, 11), (11, 12)]);
    }

    #[test]
    fn rejects_malformed_bonds() {
        let mut mol = ethanol();
        assert_eq!(
            mol.add_atom(AtomId::new(10), 1),
            Err(MoleculeError::DuplicateAtomId(AtomId::new(10)))
        );
        assert_eq!(
            mol.add_bond(AtomId::new(10), AtomId::new(99)),
            Err(MoleculeError::UnknownAtomId(AtomId::new(99)))
        );
        assert_eq!(
            mol.add_bond(AtomId::new(10), AtomId::new(10)),
            Err(MoleculeError::SelfBond(AtomId::new(10)))
        );
        assert_eq!(
            mol.add_bond(AtomId::new(11), AtomId::new(10)),
            Err(MoleculeError::DuplicateBond(AtomId::new(11), AtomId::new(10)))
        );
    }

    #[test]
    fn push_atom_continues_after_largest_id() {
        let mut mol = ethanol();
        let atom = mol.push_atom(1);
        assert_eq!(mol.id(atom), AtomId::new(13));
        assert_eq!(mol.element(atom), "H");
    }

    #[test]
    fn opposite_endpoint() {
        let mol = ethanol();
        let a = mol.atom_by_id(AtomId::new(10)).unwrap();
        let b = mol.atom_by_id(AtomId::new(11)).unwrap();
        let c = mol.atom_by_id(AtomId::new(12)).unwrap();
        let bond = mol.incident_bonds(a)[0];
        assert_eq!(mol.opposite(a, bond), Some(b));
        assert_eq!(mol.opposite(c, bond), None);
        assert!(mol.has_bond(b, a));
        assert!(!mol.has_bond(a, c));
    }

    #[test]
    fn typed_properties() {
        let mut mol = ethanol();
        let a = mol.atom_by_id(AtomId::new(12)).unwrap();
        mol.set_property(a, "charge", PropertyValue::Double(-0.5));
        mol.set_property(a, "aromatic", PropertyValue::Bool(false));
        mol.set_property(a, "name", PropertyValue::String("O1".into()));
        mol.set_property(a, "hcount", PropertyValue::Int(1));

        assert_eq!(mol.double_property(a, "charge"), Some(-0.5));
        assert_eq!(mol.bool_property(a, "aromatic"), Some(false));
        assert_eq!(mol.string_property(a, "name"), Some("O1"));
        assert_eq!(mol.int_property(a, "hcount"), Some(1));
        assert_eq!(mol.int_property(a, "charge"), None);
        assert_eq!(mol.double_property_keys(), vec!["charge"]);
    }
}
