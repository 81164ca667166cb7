use std::collections::VecDeque;

use indexmap::IndexMap;
use mcis_molecule::{Atom, AtomId, Canonization, FixedBitSet, Molecule};

use super::Fragment;

/// Canonizations of the two neighborhoods matched at one core atom,
/// positionally aligned.
pub(super) type AlignedCanons<'p> = (&'p Canonization, &'p Canonization);

/// State of the shell expansion of one fragment.
///
/// `materialized` and the fragment's minimum depths are shared by every
/// traversal. `visited`, `depth` and `queue` are scratch, reset per origin.
pub(super) struct ShellExpansion<'m> {
    mol1: &'m Molecule,
    mol2: &'m Molecule,
    radius: usize,
    core: FixedBitSet,
    materialized: IndexMap<Atom, Atom>,
    visited: FixedBitSet,
    depth: Vec<usize>,
    queue: VecDeque<Atom>,
}

impl<'m> ShellExpansion<'m> {
    /// `core` holds the indices of first-molecule atoms already in the core.
    pub(super) fn new(mol1: &'m Molecule, mol2: &'m Molecule, radius: usize, core: FixedBitSet) -> Self {
        Self {
            mol1,
            mol2,
            radius,
            core,
            materialized: IndexMap::new(),
            visited: FixedBitSet::with_capacity(mol1.atom_count()),
            depth: vec![0; mol1.atom_count()],
            queue: VecDeque::new(),
        }
    }

    /// Breadth-first traversal of the first molecule from `origin`, bounded
    /// by the radius. Non-core atoms reached become shell atoms of
    /// `fragment`.
    pub(super) fn expand(&mut self, fragment: &mut Fragment, origin: Atom, canons: Option<AlignedCanons<'_>>) {
        self.visited.clear();
        self.queue.clear();
        self.visited.insert(origin.index());
        self.depth[origin.index()] = 0;
        self.queue.push_back(origin);

        while let Some(atom) = self.queue.pop_front() {
            let depth = self.depth[atom.index()];
            if depth == self.radius {
                continue;
            }
            for next in self.mol1.neighbors(atom) {
                if self.visited.put(next.index()) {
                    continue;
                }
                self.depth[next.index()] = depth + 1;
                self.queue.push_back(next);
                if !self.core.contains(next.index()) {
                    self.visit_shell(fragment, next, depth + 1, canons);
                }
            }
        }
    }

    fn visit_shell(&mut self, fragment: &mut Fragment, source: Atom, depth: usize, canons: Option<AlignedCanons<'_>>) {
        let atom = if let Some(&atom) = self.materialized.get(&source) {
            fragment.lower_min_depth(atom, depth);
            atom
        } else {
            let atom = fragment.materialize_shell(self.mol1, source, depth);
            self.materialized.insert(source, atom);
            atom
        };

        if fragment.mol2_map.contains_atom(atom) {
            return;
        }
        let id1 = self.mol1.id(source);
        match canons.and_then(|c| self.corresponding(c, source)) {
            Some(id2) if fragment.mol2_map.insert(atom, id2) => {}
            _ => tracing::trace!("shell atom {} has no counterpart from this origin", id1),
        }
    }

    /// Second-molecule atom aligned with `source` by canonical position.
    fn corresponding(&self, (canon1, canon2): AlignedCanons<'_>, source: Atom) -> Option<AtomId> {
        let pos = canon1.position(self.mol1.id(source))?;
        let &target = canon2.atoms().get(pos)?;
        (self.mol2.color(target) == self.mol1.color(source)).then(|| self.mol2.id(target))
    }
}
