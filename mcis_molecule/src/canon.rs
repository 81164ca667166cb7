//! Canonical atom ordering of induced subgraphs.
//!
//! The ordering comes from iterated invariant refinement (Morgan style):
//! atoms start out ranked by `(root?, color, degree)` and are repeatedly
//! re-ranked by their own rank plus the sorted ranks of their neighbours
//! until the partition stops splitting. Remaining ties are broken by
//! individualising the first atom (in insertion order) of the smallest
//! ambiguous class and refining again.
//!
//! Two canonizations with equal [`Canonization::code`] are aligned
//! position by position: `a.node_order()[i]` corresponds to
//! `b.node_order()[i]` under a color preserving isomorphism. Unequal codes
//! do not prove the subgraphs are different, because tie breaking depends on
//! insertion order.

use fixedbitset::FixedBitSet;
use indexmap::IndexMap;

use crate::{Atom, AtomId, Color, Molecule};

/// One position of a canonical code: the color of the atom at that position
/// and the sorted positions of its neighbours inside the subgraph.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CodeEntry {
    /// Color of the atom at this position.
    pub color: Color,
    /// Positions of its neighbours inside the subgraph, ascending.
    pub neighbors: Vec<usize>,
}

/// Canonical ordering of an induced subgraph of a [`Molecule`].
#[derive(Clone, Debug, Default)]
pub struct Canonization {
    atoms: Vec<Atom>,
    node_order: Vec<AtomId>,
    positions: IndexMap<AtomId, usize>,
    code: Vec<CodeEntry>,
}

impl Canonization {
    /// Canonizes the subgraph induced by `members` (bit `i` set means atom
    /// index `i` is included). If `root` is given it is included as well and
    /// always lands at position 0.
    #[must_use]
    pub fn new(mol: &Molecule, members: &FixedBitSet, root: Option<Atom>) -> Self {
        let local: Vec<Atom> = mol
            .atoms()
            .filter(|a| members.contains(a.index()) || Some(*a) == root)
            .collect();

        let index_of: IndexMap<Atom, usize> =
            local.iter().enumerate().map(|(i, &a)| (a, i)).collect();

        let adjacency: Vec<Vec<usize>> = local
            .iter()
            .map(|&a| {
                mol.neighbors(a)
                    .into_iter()
                    .filter_map(|n| index_of.get(&n).copied())
                    .collect()
            })
            .collect();

        let initial: Vec<(bool, Color, usize)> = local
            .iter()
            .zip(&adjacency)
            .map(|(&a, nbrs)| (Some(a) != root, mol.color(a), nbrs.len()))
            .collect();

        let mut ranks = refine(rank_by(&initial), &adjacency);
        while class_count(&ranks) < local.len() {
            let Some(tied) = smallest_tied_rank(&ranks) else {
                break;
            };
            let Some(chosen) = ranks.iter().position(|&r| r == tied) else {
                break;
            };
            let split: Vec<(usize, bool)> = ranks
                .iter()
                .enumerate()
                .map(|(i, &r)| (r, i != chosen))
                .collect();
            ranks = refine(rank_by(&split), &adjacency);
        }

        // ranks are now a permutation of 0..n
        let mut by_rank: Vec<usize> = (0..local.len()).collect();
        by_rank.sort_by_key(|&i| ranks[i]);

        let atoms: Vec<Atom> = by_rank.iter().map(|&i| local[i]).collect();
        let node_order: Vec<AtomId> = atoms.iter().map(|&a| mol.id(a)).collect();
        let positions = node_order
            .iter()
            .enumerate()
            .map(|(pos, &id)| (id, pos))
            .collect();
        let code = by_rank
            .iter()
            .map(|&i| {
                let mut neighbors: Vec<usize> = adjacency[i].iter().map(|&j| ranks[j]).collect();
                neighbors.sort_unstable();
                CodeEntry {
                    color: mol.color(local[i]),
                    neighbors,
                }
            })
            .collect();

        Self {
            atoms,
            node_order,
            positions,
            code,
        }
    }

    /// Canonizes the whole molecule without a root.
    #[must_use]
    pub fn of_molecule(mol: &Molecule) -> Self {
        let mut members = FixedBitSet::with_capacity(mol.atom_count());
        members.insert_range(..);
        Self::new(mol, &members, None)
    }

    /// Atom identifiers in canonical order.
    #[must_use]
    pub fn node_order(&self) -> &[AtomId] {
        &self.node_order
    }

    /// Atom handles in canonical order.
    #[must_use]
    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    /// Canonical position of the atom with identifier `id`.
    #[must_use]
    pub fn position(&self, id: AtomId) -> Option<usize> {
        self.positions.get(&id).copied()
    }

    /// The canonical code, one entry per position.
    #[must_use]
    pub fn code(&self) -> &[CodeEntry] {
        &self.code
    }

    /// Whether the positional alignment with `other` is an isomorphism.
    #[must_use]
    pub fn is_equivalent(&self, other: &Self) -> bool {
        self.code == other.code
    }

    /// Number of atoms in the subgraph.
    #[must_use]
    pub fn len(&self) -> usize {
        self.node_order.len()
    }

    /// Whether the subgraph has no atoms.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.node_order.is_empty()
    }
}

/// Dense ranks (0..k) of `keys`, ordered by key value.
fn rank_by<K: Ord + Clone>(keys: &[K]) -> Vec<usize> {
    let mut distinct = keys.to_vec();
    distinct.sort();
    distinct.dedup();
    keys.iter()
        .map(|k| distinct.partition_point(|d| d < k))
        .collect()
}

fn class_count(ranks: &[usize]) -> usize {
    ranks.iter().max().map_or(0, |&m| m + 1)
}

fn refine(mut ranks: Vec<usize>, adjacency: &[Vec<usize>]) -> Vec<usize> {
    loop {
        let keys: Vec<(usize, Vec<usize>)> = ranks
            .iter()
            .zip(adjacency)
            .map(|(&r, nbrs)| {
                let mut nbr_ranks: Vec<usize> = nbrs.iter().map(|&j| ranks[j]).collect();
                nbr_ranks.sort_unstable();
                (r, nbr_ranks)
            })
            .collect();
        let next = rank_by(&keys);
        if class_count(&next) == class_count(&ranks) {
            return next;
        }
        ranks = next;
    }
}

fn smallest_tied_rank(ranks: &[usize]) -> Option<usize> {
    let mut counts = vec![0usize; class_count(ranks)];
    for &r in ranks {
        counts[r] += 1;
    }
    counts.iter().position(|&c| c > 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(colors: &[Color], first_id: u32) -> Molecule {
        let mut mol = Molecule::new();
        for (i, &c) in colors.iter().enumerate() {
            mol.add_atom(AtomId::new(first_id + i as u32), c).unwrap();
        }
        for i in 1..colors.len() as u32 {
            mol.add_bond(AtomId::new(first_id + i - 1), AtomId::new(first_id + i))
                .unwrap();
        }
        mol
    }

    fn all(mol: &Molecule) -> FixedBitSet {
        let mut bits = FixedBitSet::with_capacity(mol.atom_count());
        bits.insert_range(..);
        bits
    }

    #[test]
    fn root_comes_first() {
        let mol = chain(&[6, 6, 8], 0);
        let root = mol.atom_by_id(AtomId::new(1)).unwrap();
        let canon = Canonization::new(&mol, &all(&mol), Some(root));
        assert_eq!(canon.node_order()[0], AtomId::new(1));
        assert_eq!(canon.len(), 3);
    }

    #[test]
    fn relabelled_copies_align() {
        // C-C-O versus O-C-C with different ids
        let a = chain(&[6, 6, 8], 0);
        let b = chain(&[8, 6, 6], 100);
        let ca = Canonization::of_molecule(&a);
        let cb = Canonization::of_molecule(&b);
        assert!(ca.is_equivalent(&cb));

        for (&ia, &ib) in ca.node_order().iter().zip(cb.node_order()) {
            let atom_a = a.atom_by_id(ia).unwrap();
            let atom_b = b.atom_by_id(ib).unwrap();
            assert_eq!(a.color(atom_a), b.color(atom_b));
        }
        // the oxygens line up
        let o_pos = ca.position(AtomId::new(2)).unwrap();
        assert_eq!(cb.node_order()[o_pos], AtomId::new(100));
    }

    #[test]
    fn different_colors_are_not_equivalent() {
        let a = chain(&[6, 6, 8], 0);
        let b = chain(&[6, 6, 7], 0);
        assert!(!Canonization::of_molecule(&a).is_equivalent(&Canonization::of_molecule(&b)));
    }

    #[test]
    fn symmetric_ring_is_fully_ordered() {
        let mut mol = chain(&[6; 6], 0);
        mol.add_bond(AtomId::new(5), AtomId::new(0)).unwrap();
        let canon = Canonization::of_molecule(&mol);
        let mut ids = canon.node_order().to_vec();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 6);
        assert!(canon.code().iter().all(|e| e.neighbors.len() == 2));
    }

    #[test]
    fn subset_is_induced() {
        let mol = chain(&[6, 6, 6, 6], 0);
        let mut members = FixedBitSet::with_capacity(mol.atom_count());
        members.insert(0);
        members.insert(1);
        let canon = Canonization::new(&mol, &members, None);
        assert_eq!(canon.len(), 2);
        assert_eq!(canon.position(AtomId::new(3)), None);
        assert!(canon.code().iter().all(|e| e.neighbors.len() == 1));
    }
}
