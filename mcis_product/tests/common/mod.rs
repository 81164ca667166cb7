#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Once;

use itertools::Itertools;
use mcis_molecule::{Atom, AtomId, Color, Molecule, MoleculeRecord};
use mcis_product::{NodeId, PairNode, Product};
use petgraph::graph::UnGraph;
use quickcheck::{Arbitrary, Gen};

static INIT: Once = Once::new();

/// Configures logging for the test runner.
pub fn setup_test_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

lazy_static::lazy_static! {
    pub static ref ETHANOL: Molecule = from_json(include_str!("../fixtures/ethanol.json"));
    pub static ref DIMETHYL_ETHER: Molecule = from_json(include_str!("../fixtures/dimethyl_ether.json"));
    pub static ref CYCLOPENTANE: Molecule = from_json(include_str!("../fixtures/cyclopentane.json"));
}

pub fn from_json(json: &str) -> Molecule {
    let record: MoleculeRecord = serde_json::from_str(json).expect("fixture is valid JSON");
    Molecule::from_record(&record).expect("fixture is a valid molecule")
}

/// Molecule with atoms `0..colors.len()` and the given bonds.
pub fn molecule(colors: &[Color], bonds: &[(u32, u32)]) -> Molecule {
    let mut mol = Molecule::new();
    for (i, &color) in colors.iter().enumerate() {
        mol.add_atom(AtomId::new(i as u32), color).unwrap();
    }
    for &(a, b) in bonds {
        mol.add_bond(AtomId::new(a), AtomId::new(b)).unwrap();
    }
    mol
}

pub fn chain(colors: &[Color]) -> Molecule {
    let bonds: Vec<(u32, u32)> = (1..colors.len() as u32).map(|i| (i - 1, i)).collect();
    molecule(colors, &bonds)
}

pub fn ring(colors: &[Color]) -> Molecule {
    let n = colors.len() as u32;
    let bonds: Vec<(u32, u32)> = (0..n).map(|i| (i, (i + 1) % n)).collect();
    molecule(colors, &bonds)
}

/// The node pairing atom index `a1` of the first molecule with `a2`.
pub fn node_of(product: &Product<'_>, a1: usize, a2: usize) -> NodeId {
    product
        .graph()
        .node_indices()
        .find(|&n| {
            product.mol1_atom(n) == Some(Atom::new(a1)) && product.mol2_atom(n) == Some(Atom::new(a2))
        })
        .expect("node exists")
}

/// Shortest bond distance from any of `sources` to every atom of `mol`.
pub fn distances(mol: &Molecule, sources: &[Atom]) -> Vec<Option<usize>> {
    let mut dist = vec![None; mol.atom_count()];
    let mut queue = VecDeque::new();
    for &s in sources {
        dist[s.index()] = Some(0);
        queue.push_back(s);
    }
    while let Some(atom) = queue.pop_front() {
        let d = dist[atom.index()].unwrap();
        for next in mol.neighbors(atom) {
            if dist[next.index()].is_none() {
                dist[next.index()] = Some(d + 1);
                queue.push_back(next);
            }
        }
    }
    dist
}

/// Number of atom pairs a node stands for.
pub fn weight(graph: &UnGraph<PairNode, bool>, node: NodeId) -> usize {
    graph[node].pairs().count()
}

/// Total number of atom pairs covered by `clique`.
pub fn clique_weight(product: &Product<'_>, clique: &[NodeId]) -> usize {
    clique.iter().map(|&n| weight(product.graph(), n)).sum()
}

/// Maximum-weight clique by Bron–Kerbosch with pivoting, where a node weighs
/// as many atom pairs as it stands for. Among cliques of equal weight the
/// first one found wins, so the result is deterministic.
pub fn max_clique(product: &Product<'_>) -> Vec<NodeId> {
    let graph = product.graph();
    let mut best = (0, Vec::new());
    bron_kerbosch(
        graph,
        &mut (0, Vec::new()),
        graph.node_indices().collect(),
        Vec::new(),
        &mut best,
    );
    let mut best = best.1;
    best.sort();
    best
}

fn bron_kerbosch(
    graph: &UnGraph<PairNode, bool>,
    clique: &mut (usize, Vec<NodeId>),
    mut candidates: Vec<NodeId>,
    mut excluded: Vec<NodeId>,
    best: &mut (usize, Vec<NodeId>),
) {
    if candidates.is_empty() {
        if excluded.is_empty() && clique.0 > best.0 {
            *best = clique.clone();
        }
        return;
    }
    let reachable: usize = candidates.iter().map(|&v| weight(graph, v)).sum();
    if clique.0 + reachable <= best.0 {
        return;
    }

    let pivot = candidates
        .iter()
        .chain(&excluded)
        .copied()
        .max_by_key(|&u| candidates.iter().filter(|&&v| graph.contains_edge(u, v)).count())
        .expect("candidates is not empty");
    let branches: Vec<NodeId> = candidates
        .iter()
        .copied()
        .filter(|&v| !graph.contains_edge(pivot, v))
        .collect();

    for v in branches {
        let adjacent = |set: &[NodeId]| -> Vec<NodeId> {
            set.iter().copied().filter(|&w| graph.contains_edge(v, w)).collect()
        };
        clique.0 += weight(graph, v);
        clique.1.push(v);
        bron_kerbosch(graph, clique, adjacent(&candidates), adjacent(&excluded), best);
        clique.1.pop();
        clique.0 -= weight(graph, v);
        candidates.retain(|&w| w != v);
        excluded.push(v);
    }
}

/// Copy of `mol` whose atoms are inserted in `order` (indices into `mol`)
/// under fresh ids, bonds preserved.
pub fn relabelled(mol: &Molecule, order: &[usize]) -> Molecule {
    let mut copy = Molecule::new();
    for (i, &index) in order.iter().enumerate() {
        copy.add_atom(AtomId::new(100 + i as u32), mol.color(Atom::new(index))).unwrap();
    }
    let new_id = |atom: Atom| {
        let position = order.iter().position(|&i| i == atom.index()).unwrap();
        AtomId::new(100 + position as u32)
    };
    for (a, b) in mol.bonds() {
        copy.add_bond(new_id(a), new_id(b)).unwrap();
    }
    copy
}

/// Whether the edge set of `product` is exactly what the compatibility rule
/// asks for: adjacent iff every interpretation is one-to-one and agrees on
/// bond presence, flagged iff some interpretation is bonded in both.
pub fn edges_are_lawful(product: &Product<'_>) -> bool {
    let (mol1, mol2) = (product.mol1(), product.mol2());
    let graph = product.graph();
    graph.node_indices().tuple_combinations().all(|(u, v)| {
        let mut lawful = true;
        let mut connected = false;
        for ((a1, a2), (b1, b2)) in graph[u].pairs().cartesian_product(graph[v].pairs().collect_vec()) {
            if a1 == b1 || a2 == b2 || mol1.has_bond(a1, b1) != mol2.has_bond(a2, b2) {
                lawful = false;
            }
            connected |= mol1.has_bond(a1, b1) && mol2.has_bond(a2, b2);
        }
        match graph.find_edge(u, v) {
            Some(edge) => lawful && graph[edge] == connected,
            None => !lawful,
        }
    })
}

/// Small random molecule over C, N and O with up to six atoms.
#[derive(Clone, Debug)]
pub struct ArbitraryMolecule(pub Molecule);

impl Arbitrary for ArbitraryMolecule {
    fn arbitrary(g: &mut Gen) -> Self {
        let colors: [Color; 3] = [6, 7, 8];
        let n = usize::arbitrary(g) % 6 + 1;
        let atom_colors: Vec<Color> = (0..n).map(|_| *g.choose(&colors).unwrap()).collect();
        let bonds: Vec<(u32, u32)> = (0..n as u32)
            .tuple_combinations()
            .filter(|_| u8::arbitrary(g) % 5 < 2)
            .collect();
        Self(molecule(&atom_colors, &bonds))
    }
}
