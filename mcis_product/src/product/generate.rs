//! Node generation strategies.
//!
//! NO_OPT pairs every atom with every atom of the same color. DEG_1 and SUB
//! first fold atoms of each molecule into root atoms and pair the roots,
//! aligning the atoms folded into the two roots of a pair as reductions of
//! the node. A folded atom leaves the plain pairs only when every root pair
//! of its root found it a partner; otherwise it keeps a node of its own with
//! each compatible atom.

use std::cmp::Reverse;

use indexmap::IndexMap;
use mcis_molecule::{Atom, Canonization, FixedBitSet, Molecule};

use super::PairNode;
use crate::GenerationType;
use crate::neighborhood::Neighborhoods;

/// One input molecule together with its neighborhood index.
#[derive(Clone, Copy)]
pub(super) struct Source<'a> {
    /// The molecule.
    pub mol: &'a Molecule,
    /// Its neighborhoods.
    pub hoods: &'a Neighborhoods,
}

pub(super) fn generate_nodes(
    generation: GenerationType,
    first: Source<'_>,
    second: Source<'_>,
) -> Vec<PairNode> {
    match generation {
        GenerationType::NoOpt => all_pairs(first, second),
        GenerationType::Deg1 => {
            let f1 = Folding::pendants(first.mol);
            let f2 = Folding::pendants(second.mol);
            folded_pairs(first, second, &f1, &f2, |r1, r2| {
                paired_pendants(first, second, f1.folded(r1), f2.folded(r2))
            })
        }
        GenerationType::Sub => {
            let f1 = Folding::subtrees(first);
            let f2 = Folding::subtrees(second);
            let (c1, c2) = (f1.subtree_canons(first.mol), f2.subtree_canons(second.mol));
            folded_pairs(first, second, &f1, &f2, |r1, r2| {
                aligned_subtrees(
                    first,
                    second,
                    (r1, f1.folded(r1), c1[r1.index()].as_ref()),
                    (r2, f2.folded(r2), c2[r2.index()].as_ref()),
                )
            })
        }
    }
}

fn all_pairs(first: Source<'_>, second: Source<'_>) -> Vec<PairNode> {
    let mut nodes = Vec::new();
    for a1 in first.mol.atoms() {
        for a2 in second.mol.atoms() {
            if first.mol.color(a1) == second.mol.color(a2) {
                nodes.push(PairNode::new(a1, a2));
            }
        }
    }
    nodes
}

/// Pairs every label compatible root of `f1` with every one of `f2`,
/// attaching the reductions `reduce` returns, then adds a plain node for
/// every compatible pair involving a folded atom that is not absorbed.
/// Nodes come out in insertion order of the first atom, then the second.
fn folded_pairs<F>(
    first: Source<'_>,
    second: Source<'_>,
    f1: &Folding,
    f2: &Folding,
    mut reduce: F,
) -> Vec<PairNode>
where
    F: FnMut(Atom, Atom) -> Vec<(Atom, Atom)>,
{
    let mut absorbed1 = Absorption::new(first.mol.atom_count());
    let mut absorbed2 = Absorption::new(second.mol.atom_count());
    let mut reduced: IndexMap<(Atom, Atom), Vec<(Atom, Atom)>> = IndexMap::new();
    for r1 in first.mol.atoms().filter(|&a| f1.is_root(a)) {
        for r2 in second.mol.atoms().filter(|&a| f2.is_root(a)) {
            if first.mol.color(r1) != second.mol.color(r2) {
                continue;
            }
            let reductions = reduce(r1, r2);
            absorbed1.record(f1.folded(r1), reductions.iter().map(|&(w1, _)| w1));
            absorbed2.record(f2.folded(r2), reductions.iter().map(|&(_, w2)| w2));
            reduced.insert((r1, r2), reductions);
        }
    }

    let kept1: Vec<Atom> = first
        .mol
        .atoms()
        .filter(|&a| f1.is_root(a) || !absorbed1.is_absorbed(a))
        .collect();
    let kept2: Vec<Atom> = second
        .mol
        .atoms()
        .filter(|&a| f2.is_root(a) || !absorbed2.is_absorbed(a))
        .collect();

    let mut nodes = Vec::new();
    for &a1 in &kept1 {
        for &a2 in &kept2 {
            if first.mol.color(a1) != second.mol.color(a2) {
                continue;
            }
            match reduced.swap_remove(&(a1, a2)) {
                Some(reductions) => nodes.push(PairNode::with_reductions(a1, a2, reductions)),
                None => {
                    tracing::trace!(
                        "folded pair ({}, {}) kept as a plain node",
                        first.mol.id(a1),
                        second.mol.id(a2)
                    );
                    nodes.push(PairNode::new(a1, a2));
                }
            }
        }
    }
    nodes
}

/// Which folded atoms of one molecule found a partner in every root pair
/// they took part in.
#[derive(Debug)]
struct Absorption {
    aligned: FixedBitSet,
    missed: FixedBitSet,
}

impl Absorption {
    fn new(atom_count: usize) -> Self {
        Self {
            aligned: FixedBitSet::with_capacity(atom_count),
            missed: FixedBitSet::with_capacity(atom_count),
        }
    }

    /// Records one root pair: `folded` are the atoms folded into this side's
    /// root, `partnered` those of them the pair aligned.
    fn record(&mut self, folded: &[Atom], partnered: impl IntoIterator<Item = Atom>) {
        let mut hit = FixedBitSet::with_capacity(self.aligned.len());
        hit.extend(partnered.into_iter().map(Atom::index));
        for &w in folded {
            if hit.contains(w.index()) {
                self.aligned.insert(w.index());
            } else {
                self.missed.insert(w.index());
            }
        }
    }

    fn is_absorbed(&self, atom: Atom) -> bool {
        self.aligned.contains(atom.index()) && !self.missed.contains(atom.index())
    }
}

/// Assignment of the atoms of one molecule to the root atoms they are
/// folded into.
#[derive(Debug)]
struct Folding {
    roots: FixedBitSet,
    folded: Vec<Vec<Atom>>,
}

impl Folding {
    fn identity(atom_count: usize) -> Self {
        let mut roots = FixedBitSet::with_capacity(atom_count);
        roots.insert_range(..);
        Self {
            roots,
            folded: vec![Vec::new(); atom_count],
        }
    }

    /// Folds each degree one atom into its neighbor. When the neighbor is a
    /// pendant too, the end with the larger `(color, index)` key is folded.
    fn pendants(mol: &Molecule) -> Self {
        let mut folding = Self::identity(mol.atom_count());
        for atom in mol.atoms() {
            if mol.degree(atom) != 1 {
                continue;
            }
            let Some(&anchor) = mol.neighbors(atom).first() else {
                continue;
            };
            let folds = mol.degree(anchor) > 1
                || (mol.color(atom), atom.index()) > (mol.color(anchor), anchor.index());
            if folds {
                tracing::trace!(
                    "DEG_1: pendant {} folded into {}",
                    mol.id(atom),
                    mol.id(anchor)
                );
                folding.fold(atom, anchor);
            }
        }
        folding
    }

    /// Visits atoms by decreasing neighborhood size. Each unassigned atom
    /// becomes a root and absorbs every unassigned atom of its neighborhood
    /// whose own neighborhood it contains.
    fn subtrees(source: Source<'_>) -> Self {
        let Source { mol, hoods } = source;
        let mut folding = Self::identity(mol.atom_count());

        let mut order: Vec<Atom> = mol.atoms().collect();
        order.sort_by_key(|&a| (Reverse(hoods.size(a)), a.index()));

        let mut assigned = FixedBitSet::with_capacity(mol.atom_count());
        for root in order {
            if assigned.put(root.index()) {
                continue;
            }
            let Some(members) = hoods.members(root) else {
                continue;
            };
            for w in members.ones().map(Atom::new) {
                if assigned.contains(w.index()) || !hoods.is_contained(w, root) {
                    continue;
                }
                assigned.insert(w.index());
                tracing::trace!("SUB: {} folded into {}", mol.id(w), mol.id(root));
                folding.fold(w, root);
            }
        }
        folding
    }

    fn fold(&mut self, atom: Atom, into: Atom) {
        self.roots.set(atom.index(), false);
        self.folded[into.index()].push(atom);
    }

    fn is_root(&self, atom: Atom) -> bool {
        self.roots.contains(atom.index())
    }

    fn folded(&self, root: Atom) -> &[Atom] {
        self.folded.get(root.index()).map_or(&[], Vec::as_slice)
    }

    /// Canonization of every root together with the atoms folded into it,
    /// indexed by atom. Atoms with nothing folded into them get none.
    fn subtree_canons(&self, mol: &Molecule) -> Vec<Option<Canonization>> {
        mol.atoms()
            .map(|root| {
                let folded = self.folded(root);
                (!folded.is_empty()).then(|| {
                    let mut members = FixedBitSet::with_capacity(mol.atom_count());
                    members.extend(folded.iter().map(|a| a.index()));
                    Canonization::new(mol, &members, Some(root))
                })
            })
            .collect()
    }
}

/// Greedily pairs the pendants of two anchors by color, in insertion order.
fn paired_pendants(
    first: Source<'_>,
    second: Source<'_>,
    pendants1: &[Atom],
    pendants2: &[Atom],
) -> Vec<(Atom, Atom)> {
    let mut used = FixedBitSet::with_capacity(second.mol.atom_count());
    let mut pairs = Vec::new();
    for &p1 in pendants1 {
        let color = first.mol.color(p1);
        let partner = pendants2
            .iter()
            .copied()
            .find(|p2| !used.contains(p2.index()) && second.mol.color(*p2) == color);
        if let Some(p2) = partner {
            used.insert(p2.index());
            pairs.push((p1, p2));
        }
    }
    pairs
}

/// Aligns the atoms folded into two roots through the canonical order of
/// each root's subtree (the root plus its folded atoms). Nothing is aligned
/// unless both subtrees have the same canonical code.
fn aligned_subtrees(
    first: Source<'_>,
    second: Source<'_>,
    (root1, folded1, canon1): (Atom, &[Atom], Option<&Canonization>),
    (root2, folded2, canon2): (Atom, &[Atom], Option<&Canonization>),
) -> Vec<(Atom, Atom)> {
    let (Some(canon1), Some(canon2)) = (canon1, canon2) else {
        return Vec::new();
    };
    if !canon1.is_equivalent(canon2) {
        tracing::trace!(
            "SUB: subtrees of {} and {} differ, no reductions",
            first.mol.id(root1),
            second.mol.id(root2)
        );
        return Vec::new();
    }

    let mut used = FixedBitSet::with_capacity(second.mol.atom_count());
    let mut pairs = Vec::new();
    for &f1 in folded1 {
        let Some(pos) = canon1.position(first.mol.id(f1)) else {
            continue;
        };
        let Some(&f2) = canon2.atoms().get(pos) else {
            continue;
        };
        if !folded2.contains(&f2) || first.mol.color(f1) != second.mol.color(f2) {
            continue;
        }
        if !used.put(f2.index()) {
            pairs.push((f1, f2));
        }
    }
    pairs
}
