//! Error types for product construction and fragment extraction.
//!
//! Every error is a violated precondition detected before any output is
//! produced. Empty inputs (no compatible atoms, empty cliques) are not errors.

use mcis_molecule::{AtomId, MoleculeError};
use thiserror::Error;

use crate::GenerationType;

/// Which of the two input molecules an error refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    /// The first molecule of the product.
    First,
    /// The second molecule of the product.
    Second,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::First => f.write_str("first"),
            Self::Second => f.write_str("second"),
        }
    }
}

/// Errors that can occur while building a product graph or a fragment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProductError {
    /// The generation type needs a neighborhood but the shell is zero.
    #[error("generation type {generation} requires a shell size greater than zero")]
    ShellRequired {
        /// The strategy that was asked for.
        generation: GenerationType,
    },

    /// A clique references a node index the product graph does not have.
    #[error("clique references product node {0}, which does not exist")]
    UnknownNode(usize),

    /// A clique lists the same product node twice.
    #[error("clique lists product node {0} more than once")]
    DuplicateNode(usize),

    /// Two pairs of a clique map the same atom.
    #[error("atom {atom} of the {molecule} molecule is claimed by more than one clique pair")]
    OverlappingAtom {
        /// Molecule the atom belongs to.
        molecule: Side,
        /// Id of the atom used twice.
        atom: AtomId,
    },

    /// A fragment mutator was given an atom handle the fragment does not own.
    #[error("fragment has no atom with index {0}")]
    UnknownAtom(usize),

    /// Assembling the fragment molecule failed.
    #[error("fragment molecule: {0}")]
    Molecule(#[from] MoleculeError),
}
