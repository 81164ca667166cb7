//! Configuration for product graph construction and fragment extraction.
//!
//! The main concepts are:
//! - generation: which node generation strategy the builder uses, trading
//!   completeness of the product graph for a smaller clique search space.
//! - shell: the neighborhood radius. SUB folds atoms by comparing
//!   neighborhoods of this radius, every strategy canonizes neighborhoods of
//!   this radius for shell correspondence, and fragments expand their shell
//!   to this depth.
//! - prune_boundary_edges: whether fragment edge reconstruction skips pairs
//!   of shell atoms that both sit at the maximal depth.
//!
//! Quick examples
//!
//! Plain modular product, no fragment context:
//! ```ignore
//! use mcis_product::{Config, GenerationType};
//! let cfg = Config::new(GenerationType::NoOpt, 0);
//! ```
//!
//! Subtree folding with a two-bond shell:
//! ```ignore
//! use mcis_product::Config;
//! let cfg = Config::sub(2);
//! ```
//!
//! Exhaustive fragment edges:
//! ```ignore
//! use mcis_product::Config;
//! let cfg = Config::deg_1(1).with_boundary_pruning(false);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ProductError;

/// Node generation strategy of the product graph.
///
/// - NoOpt: one node per label-compatible atom pair.
/// - Deg1: pendant (degree 1) atoms are folded into their anchor's node.
/// - Sub: atoms whose bounded neighborhood is contained in another atom's
///   neighborhood are folded into that atom's node when the two roots'
///   subtrees are canonically equivalent.
///
/// A folded atom that some root pair cannot align keeps plain nodes of its
/// own, so folding never hides an atom from every node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GenerationType {
    /// Every label-compatible atom pair.
    #[default]
    #[serde(rename = "no_opt")]
    NoOpt,
    /// Pendant atoms folded into their anchor.
    #[serde(rename = "deg_1")]
    Deg1,
    /// Neighborhood subtrees folded into their root.
    #[serde(rename = "sub")]
    Sub,
}

impl GenerationType {
    /// Whether this strategy can produce reduced nodes.
    #[must_use]
    pub const fn reduces(self) -> bool {
        !matches!(self, Self::NoOpt)
    }
}

impl fmt::Display for GenerationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NoOpt => "NO_OPT",
            Self::Deg1 => "DEG_1",
            Self::Sub => "SUB",
        };
        f.write_str(name)
    }
}

/// Global build configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Node generation strategy.
    pub generation: GenerationType,
    /// Neighborhood radius, in bonds.
    pub shell: usize,
    /// Skip fragment edge lookups between two maximal-depth shell atoms.
    #[serde(default = "default_prune")]
    pub prune_boundary_edges: bool,
}

const fn default_prune() -> bool {
    true
}

impl Config {
    /// Create a new configuration with boundary pruning enabled.
    #[must_use]
    pub const fn new(generation: GenerationType, shell: usize) -> Self {
        Self {
            generation,
            shell,
            prune_boundary_edges: true,
        }
    }

    /// Convenience: NO_OPT generation.
    #[must_use]
    pub const fn no_opt(shell: usize) -> Self {
        Self::new(GenerationType::NoOpt, shell)
    }

    /// Convenience: DEG_1 generation.
    #[must_use]
    pub const fn deg_1(shell: usize) -> Self {
        Self::new(GenerationType::Deg1, shell)
    }

    /// Convenience: SUB generation. `shell` must be positive.
    #[must_use]
    pub const fn sub(shell: usize) -> Self {
        Self::new(GenerationType::Sub, shell)
    }

    /// Sets whether bonds between two maximal-depth shell atoms are dropped.
    #[must_use]
    pub const fn with_boundary_pruning(mut self, prune: bool) -> Self {
        self.prune_boundary_edges = prune;
        self
    }

    /// Checks that the generation type and shell agree.
    ///
    /// # Errors
    ///
    /// [`ProductError::ShellRequired`] for SUB with a shell of zero.
    pub fn validate(&self) -> Result<(), ProductError> {
        if self.generation == GenerationType::Sub && self.shell == 0 {
            return Err(ProductError::ShellRequired {
                generation: self.generation,
            });
        }
        Ok(())
    }
}

impl Default for Config {
    /// NO_OPT, no shell, boundary pruning on.
    fn default() -> Self {
        Self::new(GenerationType::NoOpt, 0)
    }
}
