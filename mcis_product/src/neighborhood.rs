//! Bounded-radius atom neighborhoods.
//!
//! For every atom of a molecule this index holds the set of atoms within
//! `radius` bonds (the atom itself included) as a bitset over atom indices,
//! and the canonization of that induced subgraph rooted at the atom.

use std::collections::VecDeque;

use mcis_molecule::{Atom, Canonization, FixedBitSet, Molecule};

/// Per-atom neighborhoods of one molecule, indexed by atom index.
#[derive(Clone, Debug)]
pub struct Neighborhoods {
    radius: usize,
    members: Vec<FixedBitSet>,
    canons: Vec<Canonization>,
}

impl Neighborhoods {
    /// Computes the neighborhood of every atom of `mol`.
    #[must_use]
    pub fn build(mol: &Molecule, radius: usize) -> Self {
        let start = std::time::Instant::now();

        let members: Vec<FixedBitSet> = mol
            .atoms()
            .map(|atom| bounded_bfs(mol, atom, radius))
            .collect();
        let canons = mol
            .atoms()
            .zip(&members)
            .map(|(atom, bits)| Canonization::new(mol, bits, Some(atom)))
            .collect();

        tracing::debug!(
            "neighborhoods of radius {} built in {:?} for {} atoms",
            radius,
            start.elapsed(),
            mol.atom_count()
        );

        Self {
            radius,
            members,
            canons,
        }
    }

    /// Bond distance bound the neighborhoods were built with.
    #[must_use]
    pub const fn radius(&self) -> usize {
        self.radius
    }

    /// Atoms within `radius` bonds of `atom`.
    #[must_use]
    pub fn members(&self, atom: Atom) -> Option<&FixedBitSet> {
        self.members.get(atom.index())
    }

    /// Number of atoms in the neighborhood of `atom`, zero if unknown.
    #[must_use]
    pub fn size(&self, atom: Atom) -> usize {
        self.members(atom).map_or(0, |bits| bits.count_ones(..))
    }

    /// Whether the neighborhood of `inner` is contained in that of `outer`.
    #[must_use]
    pub fn is_contained(&self, inner: Atom, outer: Atom) -> bool {
        match (self.members(inner), self.members(outer)) {
            (Some(i), Some(o)) => i.is_subset(o),
            _ => false,
        }
    }

    /// Canonization of the neighborhood of `atom`, rooted at `atom`.
    #[must_use]
    pub fn canon(&self, atom: Atom) -> Option<&Canonization> {
        self.canons.get(atom.index())
    }

    /// Number of atoms indexed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether no atom is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

fn bounded_bfs(mol: &Molecule, root: Atom, radius: usize) -> FixedBitSet {
    let mut seen = FixedBitSet::with_capacity(mol.atom_count());
    let mut queue = VecDeque::from([(root, 0usize)]);
    seen.insert(root.index());
    while let Some((atom, depth)) = queue.pop_front() {
        if depth == radius {
            continue;
        }
        for next in mol.neighbors(atom) {
            if !seen.put(next.index()) {
                queue.push_back((next, depth + 1));
            }
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use mcis_molecule::AtomId;

    use super::*;

    fn chain(n: u32) -> Molecule {
        let mut mol = Molecule::new();
        for i in 0..n {
            mol.add_atom(AtomId::new(i), 6).unwrap();
        }
        for i in 1..n {
            mol.add_bond(AtomId::new(i - 1), AtomId::new(i)).unwrap();
        }
        mol
    }

    #[test]
    fn radius_bounds_membership() {
        let mol = chain(5);
        let hoods = Neighborhoods::build(&mol, 1);
        let ends: Vec<usize> = hoods.members(Atom::new(0)).unwrap().ones().collect();
        assert_eq!(ends, vec![0, 1]);
        let middle: Vec<usize> = hoods.members(Atom::new(2)).unwrap().ones().collect();
        assert_eq!(middle, vec![1, 2, 3]);
        assert_eq!(hoods.size(Atom::new(2)), 3);

        let wide = Neighborhoods::build(&mol, 2);
        assert_eq!(wide.size(Atom::new(2)), 5);
        assert_eq!(wide.size(Atom::new(0)), 3);
    }

    #[test]
    fn radius_zero_is_the_atom_alone() {
        let mol = chain(3);
        let hoods = Neighborhoods::build(&mol, 0);
        assert_eq!(hoods.size(Atom::new(1)), 1);
        assert_eq!(hoods.canon(Atom::new(1)).unwrap().node_order(), &[AtomId::new(1)]);
    }

    #[test]
    fn containment_and_rooted_canon() {
        let mol = chain(3);
        let hoods = Neighborhoods::build(&mol, 1);
        assert!(hoods.is_contained(Atom::new(0), Atom::new(1)));
        assert!(!hoods.is_contained(Atom::new(1), Atom::new(0)));
        assert!(!hoods.is_contained(Atom::new(0), Atom::new(9)));

        let canon = hoods.canon(Atom::new(1)).unwrap();
        assert_eq!(canon.node_order()[0], AtomId::new(1));
        assert_eq!(canon.len(), 3);
    }
}
