//! Fragments: the common substructure selected by a clique, plus the
//! surrounding shell of the first molecule.
//!
//! Construction runs in one pass over an immutable [`Product`]:
//!
//! 1. every atom pair of the clique (reductions included) becomes a core
//!    atom, mapped exactly to both molecules;
//! 2. a breadth-first traversal of the first molecule from each core atom,
//!    bounded by the shell size, adds every non-core atom it reaches once as
//!    a shell atom, keeping the minimum depth it was reached at. The
//!    second-molecule counterpart of a shell atom is read off the canonical
//!    orders of the two neighborhoods matched at the originating core atom;
//! 3. fragment atoms are bonded iff their first-molecule atoms are bonded.
//!    With boundary pruning on, two shell atoms both at maximal depth are
//!    never bonded and never looked up.
//!
//! After construction the core flags and shell size can be changed directly;
//! nothing is re-derived when they are.

mod shell;

use itertools::Itertools;
use mcis_molecule::{Atom, AtomId, FixedBitSet, Molecule, PropertyValue};

use crate::mapping::AtomIdMap;
use crate::product::{NodeId, Product};
use crate::ProductError;

use self::shell::ShellExpansion;

/// A molecule extracted from a clique of a product graph.
#[derive(Clone, Debug)]
pub struct Fragment {
    molecule: Molecule,
    core: Vec<bool>,
    core_count: usize,
    shell_size: usize,
    shell_min_depth: Vec<Option<usize>>,
    sources: Vec<Atom>,
    product_nodes: Vec<Option<NodeId>>,
    mol1_map: AtomIdMap,
    mol2_map: AtomIdMap,
}

impl Fragment {
    /// Builds the fragment of `clique`. The clique property itself is not
    /// checked.
    ///
    /// # Errors
    ///
    /// Fails without building anything if the clique references an unknown
    /// node, repeats a node, or selects an atom of either molecule twice.
    pub fn new(product: &Product<'_>, clique: &[NodeId]) -> Result<Self, ProductError> {
        let start = std::time::Instant::now();
        let pairs = product.core_pairs(clique)?;
        let mol1 = product.mol1();
        let mol2 = product.mol2();

        let mut fragment = Self {
            molecule: Molecule::with_periodic_table(mol1.periodic_table().clone()),
            core: Vec::new(),
            core_count: 0,
            shell_size: product.shell(),
            shell_min_depth: Vec::new(),
            sources: Vec::new(),
            product_nodes: Vec::new(),
            mol1_map: AtomIdMap::new(),
            mol2_map: AtomIdMap::new(),
        };

        let mut core = FixedBitSet::with_capacity(mol1.atom_count());
        for pair in &pairs {
            let atom = fragment.materialize(mol1, pair.mol1, true);
            fragment.product_nodes[atom.index()] = Some(pair.node);
            fragment.mol2_map.insert(atom, mol2.id(pair.mol2));
            core.insert(pair.mol1.index());
        }

        let mut expansion = ShellExpansion::new(mol1, mol2, product.shell(), core);
        for pair in &pairs {
            let canons = product
                .mol1_neighborhoods()
                .canon(pair.mol1)
                .zip(product.mol2_neighborhoods().canon(pair.mol2));
            expansion.expand(&mut fragment, pair.mol1, canons);
        }

        fragment.bond_atoms(mol1, product.config().prune_boundary_edges)?;

        tracing::debug!(
            "fragment extracted in {:?}: {} core atoms, {} shell atoms, {} bonds",
            start.elapsed(),
            fragment.core_count,
            fragment.atom_count() - fragment.core_count,
            fragment.molecule.bond_count()
        );

        Ok(fragment)
    }

    /// Adds a fragment atom copying color and properties of `source`.
    fn materialize(&mut self, mol1: &Molecule, source: Atom, core: bool) -> Atom {
        let atom = self.molecule.push_atom(mol1.color(source));
        copy_properties(mol1, source, &mut self.molecule, atom);
        self.core.push(core);
        if core {
            self.core_count += 1;
        }
        self.shell_min_depth.push(None);
        self.sources.push(source);
        self.product_nodes.push(None);
        self.mol1_map.insert(atom, mol1.id(source));
        atom
    }

    fn materialize_shell(&mut self, mol1: &Molecule, source: Atom, depth: usize) -> Atom {
        let atom = self.materialize(mol1, source, false);
        self.shell_min_depth[atom.index()] = Some(depth);
        atom
    }

    fn lower_min_depth(&mut self, atom: Atom, depth: usize) {
        if let Some(Some(current)) = self.shell_min_depth.get_mut(atom.index()) {
            *current = (*current).min(depth);
        }
    }

    fn at_boundary(&self, atom: Atom) -> bool {
        !self.core[atom.index()] && self.shell_min_depth[atom.index()] == Some(self.shell_size)
    }

    fn bond_atoms(&mut self, mol1: &Molecule, prune: bool) -> Result<(), ProductError> {
        let bonds: Vec<(Atom, Atom)> = self
            .molecule
            .atoms()
            .tuple_combinations()
            .filter(|&(u, v)| !(prune && self.at_boundary(u) && self.at_boundary(v)))
            .filter(|&(u, v)| mol1.has_bond(self.sources[u.index()], self.sources[v.index()]))
            .collect();
        for (u, v) in bonds {
            self.molecule.connect(u, v)?;
        }
        Ok(())
    }

    /// The fragment as a molecule. Atom ids are assigned from 0 in
    /// materialization order.
    #[must_use]
    pub const fn molecule(&self) -> &Molecule {
        &self.molecule
    }

    /// Number of fragment atoms, core and shell.
    #[must_use]
    pub fn atom_count(&self) -> usize {
        self.molecule.atom_count()
    }

    /// Number of atoms flagged core.
    #[must_use]
    pub const fn core_atom_count(&self) -> usize {
        self.core_count
    }

    /// Whether `atom` is flagged core; false for unknown handles.
    #[must_use]
    pub fn is_core(&self, atom: Atom) -> bool {
        self.core.get(atom.index()).copied().unwrap_or(false)
    }

    /// Reclassifies `atom`, keeping the core count in step. Shell membership
    /// and bonds are left untouched.
    ///
    /// # Errors
    ///
    /// [`ProductError::UnknownAtom`] if `atom` is not a fragment atom.
    #[contracts::debug_ensures(self.core_count == self.core.iter().filter(|&&c| c).count())]
    pub fn set_core(&mut self, atom: Atom, core: bool) -> Result<(), ProductError> {
        let flag = self
            .core
            .get_mut(atom.index())
            .ok_or(ProductError::UnknownAtom(atom.index()))?;
        match (*flag, core) {
            (true, false) => self.core_count -= 1,
            (false, true) => self.core_count += 1,
            _ => {}
        }
        *flag = core;
        Ok(())
    }

    /// Recorded shell size.
    #[must_use]
    pub const fn shell_size(&self) -> usize {
        self.shell_size
    }

    /// Changes the recorded shell size. Does not expand or shrink the shell.
    pub fn set_shell_size(&mut self, shell_size: usize) {
        self.shell_size = shell_size;
    }

    /// Core atoms in materialization order.
    pub fn core_atoms(&self) -> impl Iterator<Item = Atom> + '_ {
        self.molecule.atoms().filter(|&a| self.is_core(a))
    }

    /// Non-core atoms in materialization order.
    pub fn shell_atoms(&self) -> impl Iterator<Item = Atom> + '_ {
        self.molecule.atoms().filter(|&a| !self.is_core(a))
    }

    /// Minimum traversal depth at which a shell atom was reached. `None` for
    /// atoms materialized as core.
    #[must_use]
    pub fn shell_min_depth(&self, atom: Atom) -> Option<usize> {
        self.shell_min_depth.get(atom.index()).copied().flatten()
    }

    /// Fragment atoms against first-molecule ids.
    #[must_use]
    pub const fn mol1_map(&self) -> &AtomIdMap {
        &self.mol1_map
    }

    /// Fragment atoms against second-molecule ids.
    #[must_use]
    pub const fn mol2_map(&self) -> &AtomIdMap {
        &self.mol2_map
    }

    /// First-molecule id of `atom`; present for every fragment atom.
    #[must_use]
    pub fn mol1_id(&self, atom: Atom) -> Option<AtomId> {
        self.mol1_map.id(atom)
    }

    /// Always present for core atoms; for shell atoms only when some
    /// traversal inferred a counterpart.
    #[must_use]
    pub fn mol2_id(&self, atom: Atom) -> Option<AtomId> {
        self.mol2_map.id(atom)
    }

    /// Product node a core atom was materialized from.
    #[must_use]
    pub fn product_node(&self, atom: Atom) -> Option<NodeId> {
        self.product_nodes.get(atom.index()).copied().flatten()
    }
}

fn copy_properties(from: &Molecule, source: Atom, to: &mut Molecule, atom: Atom) {
    for key in from.bool_property_keys() {
        if let Some(v) = from.bool_property(source, key) {
            to.set_property(atom, key, PropertyValue::Bool(v));
        }
    }
    for key in from.int_property_keys() {
        if let Some(v) = from.int_property(source, key) {
            to.set_property(atom, key, PropertyValue::Int(v));
        }
    }
    for key in from.double_property_keys() {
        if let Some(v) = from.double_property(source, key) {
            to.set_property(atom, key, PropertyValue::Double(v));
        }
    }
    for key in from.string_property_keys() {
        if let Some(v) = from.string_property(source, key) {
            to.set_property(atom, key, PropertyValue::String(v.to_owned()));
        }
    }
}
