//! Product graph construction and fragment extraction for maximum common
//! induced subgraph search on molecules.
//!
//! [`Product`] turns two molecules into a compatibility graph whose cliques
//! are common induced subgraphs. The clique search itself is left to the
//! caller. A clique handed to [`Fragment::new`] becomes a standalone
//! molecule holding the matched core plus a shell of surrounding atoms of
//! the first molecule, with atom id maps back to both inputs.

mod config;
mod dot;
mod error;
mod fragment;
mod mapping;
mod neighborhood;
mod product;

pub use crate::config::{Config, GenerationType};
pub use crate::dot::{FragmentDot, ProductDot};
pub use crate::error::{ProductError, Side};
pub use crate::fragment::Fragment;
pub use crate::mapping::AtomIdMap;
pub use crate::neighborhood::Neighborhoods;
pub use crate::product::{EdgeId, NodeId, PairNode, Product};
