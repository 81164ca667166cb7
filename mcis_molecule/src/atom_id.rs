//! External atom identifiers.
//!
//! An [`AtomId`] is chosen by whoever builds the molecule and survives
//! copying, serialization and fragment extraction. The graph handle
//! ([`crate::Atom`]) is only meaningful inside the molecule that issued it,
//! so correspondences between molecules are always stated in ids.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Caller-chosen identifier of an atom, unique within one molecule.
///
/// Serialized as a bare integer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AtomId(u32);

impl AtomId {
    /// Wraps a caller-chosen integer.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// The integer this id was created from.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for AtomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
