//! The product (compatibility) graph of two molecules.
//!
//! Each node pairs one atom of the first molecule with a same-colored atom of
//! the second, optionally carrying reductions: further atom pairs implied by
//! the primary pair. Two nodes are adjacent iff every interpretation of the
//! two nodes as atom pairs is one-to-one and agrees on bond presence in both
//! molecules. Cliques of this graph are therefore common induced subgraphs.

mod generate;

use indexmap::IndexSet;
use itertools::Itertools;
use mcis_molecule::{Atom, AtomId, Canonization, FixedBitSet, Molecule};
use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};

use crate::error::Side;
use crate::neighborhood::Neighborhoods;
use crate::{Config, GenerationType, ProductError};

use self::generate::Source;

/// Handle of a product graph node.
pub type NodeId = NodeIndex;

/// Handle of a product graph edge.
pub type EdgeId = EdgeIndex;

/// Payload of a product graph node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PairNode {
    mol1: Atom,
    mol2: Atom,
    reductions: Vec<(Atom, Atom)>,
}

impl PairNode {
    /// A plain node pairing `mol1` with `mol2`.
    #[must_use]
    pub const fn new(mol1: Atom, mol2: Atom) -> Self {
        Self {
            mol1,
            mol2,
            reductions: Vec::new(),
        }
    }

    /// A node standing for `(mol1, mol2)` plus the folded pairs in `reductions`.
    #[contracts::debug_requires(!reductions.contains(&(mol1, mol2)))]
    #[contracts::debug_requires(reductions.iter().all_unique())]
    #[must_use]
    pub fn with_reductions(mol1: Atom, mol2: Atom, reductions: Vec<(Atom, Atom)>) -> Self {
        Self {
            mol1,
            mol2,
            reductions,
        }
    }

    /// Primary first-molecule atom.
    #[must_use]
    pub const fn mol1(&self) -> Atom {
        self.mol1
    }

    /// Primary second-molecule atom.
    #[must_use]
    pub const fn mol2(&self) -> Atom {
        self.mol2
    }

    /// Folded atom pairs carried in addition to the primary pair.
    #[must_use]
    pub fn reductions(&self) -> &[(Atom, Atom)] {
        &self.reductions
    }

    /// Whether the node carries folded pairs.
    #[must_use]
    pub fn is_reduced(&self) -> bool {
        !self.reductions.is_empty()
    }

    /// The primary pair followed by the reductions.
    pub fn pairs(&self) -> impl Iterator<Item = (Atom, Atom)> + '_ {
        std::iter::once((self.mol1, self.mol2)).chain(self.reductions.iter().copied())
    }
}

/// One atom pair selected by a clique, with the node it came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct CorePair {
    /// Product node the pair was taken from.
    pub node: NodeId,
    /// First-molecule atom.
    pub mol1: Atom,
    /// Second-molecule atom.
    pub mol2: Atom,
}

/// Compatibility graph of two molecules.
#[derive(Debug)]
pub struct Product<'a> {
    mol1: &'a Molecule,
    mol2: &'a Molecule,
    config: Config,
    graph: UnGraph<PairNode, bool>,
    mol1_hoods: Neighborhoods,
    mol2_hoods: Neighborhoods,
}

impl<'a> Product<'a> {
    /// Builds the product graph of `mol1` and `mol2`.
    ///
    /// # Errors
    ///
    /// [`ProductError::ShellRequired`] if `config` asks for SUB without a
    /// shell.
    pub fn new(mol1: &'a Molecule, mol2: &'a Molecule, config: Config) -> Result<Self, ProductError> {
        config.validate()?;
        let start = std::time::Instant::now();

        let mol1_hoods = Neighborhoods::build(mol1, config.shell);
        let mol2_hoods = Neighborhoods::build(mol2, config.shell);

        let nodes = generate::generate_nodes(
            config.generation,
            Source {
                mol: mol1,
                hoods: &mol1_hoods,
            },
            Source {
                mol: mol2,
                hoods: &mol2_hoods,
            },
        );

        let mut graph = UnGraph::with_capacity(nodes.len(), 0);
        for node in nodes {
            graph.add_node(node);
        }

        let edges: Vec<(NodeId, NodeId, bool)> = graph
            .node_indices()
            .tuple_combinations()
            .filter_map(|(u, v)| {
                compatibility(mol1, mol2, &graph[u], &graph[v]).map(|connected| (u, v, connected))
            })
            .collect();
        for (u, v, connected) in edges {
            graph.add_edge(u, v, connected);
        }

        let product = Self {
            mol1,
            mol2,
            config,
            graph,
            mol1_hoods,
            mol2_hoods,
        };

        tracing::debug!(
            "{} product built in {:?}: {} nodes ({} reduced), {} edges ({} connectivity)",
            product.config.generation,
            start.elapsed(),
            product.node_count(),
            product.graph.node_weights().filter(|n| n.is_reduced()).count(),
            product.edge_count(),
            product.graph.edge_weights().filter(|&&c| c).count()
        );

        Ok(product)
    }

    /// The product graph; edge weights are the connectivity flags.
    #[must_use]
    pub const fn graph(&self) -> &UnGraph<PairNode, bool> {
        &self.graph
    }

    /// Payload of `node`, if it exists.
    #[must_use]
    pub fn node(&self, node: NodeId) -> Option<&PairNode> {
        self.graph.node_weight(node)
    }

    /// Primary first-molecule atom of `node`.
    #[must_use]
    pub fn mol1_atom(&self, node: NodeId) -> Option<Atom> {
        self.node(node).map(PairNode::mol1)
    }

    /// Primary second-molecule atom of `node`.
    #[must_use]
    pub fn mol2_atom(&self, node: NodeId) -> Option<Atom> {
        self.node(node).map(PairNode::mol2)
    }

    /// Reductions of `node`; empty for unknown handles.
    #[must_use]
    pub fn reductions(&self, node: NodeId) -> &[(Atom, Atom)] {
        self.node(node).map_or(&[], PairNode::reductions)
    }

    /// All atom pairs `node` stands for, primary pair first.
    #[must_use]
    pub fn pairs(&self, node: NodeId) -> Vec<(Atom, Atom)> {
        self.node(node)
            .map(|n| n.pairs().collect())
            .unwrap_or_default()
    }

    /// Whether `edge` reflects a bond present in both molecules.
    #[must_use]
    pub fn is_connectivity_edge(&self, edge: EdgeId) -> Option<bool> {
        self.graph.edge_weight(edge).copied()
    }

    /// Number of product nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of product edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// The first input molecule.
    #[must_use]
    pub const fn mol1(&self) -> &'a Molecule {
        self.mol1
    }

    /// The second input molecule.
    #[must_use]
    pub const fn mol2(&self) -> &'a Molecule {
        self.mol2
    }

    /// Neighborhood radius used for the build.
    #[must_use]
    pub const fn shell(&self) -> usize {
        self.config.shell
    }

    /// Strategy the nodes were generated with.
    #[must_use]
    pub const fn generation(&self) -> GenerationType {
        self.config.generation
    }

    /// Configuration the product was built with.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Neighborhood index of the first molecule.
    #[must_use]
    pub const fn mol1_neighborhoods(&self) -> &Neighborhoods {
        &self.mol1_hoods
    }

    /// Neighborhood index of the second molecule.
    #[must_use]
    pub const fn mol2_neighborhoods(&self) -> &Neighborhoods {
        &self.mol2_hoods
    }

    /// Canonization of the neighborhood of the first-molecule atom of `node`.
    #[must_use]
    pub fn mol1_canon(&self, node: NodeId) -> Option<&Canonization> {
        self.mol1_atom(node).and_then(|a| self.mol1_hoods.canon(a))
    }

    /// Canonization of the neighborhood of the second-molecule atom of `node`.
    #[must_use]
    pub fn mol2_canon(&self, node: NodeId) -> Option<&Canonization> {
        self.mol2_atom(node).and_then(|a| self.mol2_hoods.canon(a))
    }

    /// Expands each clique into the atom pairs it selects, reductions
    /// included, in clique order.
    ///
    /// # Errors
    ///
    /// Fails if a clique references an unknown node, repeats a node, or
    /// selects the same atom twice in either molecule.
    pub fn node_mapping(&self, cliques: &[Vec<NodeId>]) -> Result<Vec<Vec<(Atom, Atom)>>, ProductError> {
        cliques
            .iter()
            .map(|clique| -> Result<Vec<(Atom, Atom)>, ProductError> {
                Ok(self
                    .core_pairs(clique)?
                    .into_iter()
                    .map(|p| (p.mol1, p.mol2))
                    .collect())
            })
            .collect()
    }

    /// Validated atom pairs of `clique`.
    pub(crate) fn core_pairs(&self, clique: &[NodeId]) -> Result<Vec<CorePair>, ProductError> {
        let mut nodes = IndexSet::with_capacity(clique.len());
        let mut seen1 = FixedBitSet::with_capacity(self.mol1.atom_count());
        let mut seen2 = FixedBitSet::with_capacity(self.mol2.atom_count());
        let mut pairs = Vec::new();

        for &node in clique {
            let payload = self
                .node(node)
                .ok_or(ProductError::UnknownNode(node.index()))?;
            if !nodes.insert(node) {
                return Err(ProductError::DuplicateNode(node.index()));
            }
            for (mol1, mol2) in payload.pairs() {
                if seen1.put(mol1.index()) {
                    return Err(overlap(Side::First, self.mol1.id(mol1)));
                }
                if seen2.put(mol2.index()) {
                    return Err(overlap(Side::Second, self.mol2.id(mol2)));
                }
                pairs.push(CorePair { node, mol1, mol2 });
            }
        }
        Ok(pairs)
    }
}

const fn overlap(molecule: Side, atom: AtomId) -> ProductError {
    ProductError::OverlappingAtom { molecule, atom }
}

/// Edge label between two nodes: `None` if they may not share a clique,
/// otherwise whether some pair of interpretations is bonded in both
/// molecules.
fn compatibility(mol1: &Molecule, mol2: &Molecule, u: &PairNode, v: &PairNode) -> Option<bool> {
    let mut connected = false;
    for (a1, a2) in u.pairs() {
        for (b1, b2) in v.pairs() {
            if a1 == b1 || a2 == b2 {
                return None;
            }
            let bonded = mol1.has_bond(a1, b1);
            if bonded != mol2.has_bond(a2, b2) {
                return None;
            }
            connected |= bonded;
        }
    }
    Some(connected)
}
