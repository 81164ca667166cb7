//! Error types for molecule construction.

use thiserror::Error;

use crate::AtomId;

/// Errors raised while assembling a [`crate::Molecule`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoleculeError {
    /// An atom with this identifier already exists.
    #[error("duplicate atom id {0}")]
    DuplicateAtomId(AtomId),

    /// A bond or lookup referenced an identifier that is not in the molecule.
    #[error("unknown atom id {0}")]
    UnknownAtomId(AtomId),

    /// A bond from an atom to itself.
    #[error("atom {0} cannot be bonded to itself")]
    SelfBond(AtomId),

    /// The two atoms are already bonded.
    #[error("atoms {0} and {1} are already bonded")]
    DuplicateBond(AtomId, AtomId),
}
