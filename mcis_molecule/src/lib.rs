//! Molecular graph primitives shared by the MCIS workspace.
//!
//! This crate provides the attributed molecule representation, the periodic
//! table used for rendering, typed atom properties, and canonical atom
//! ordering of subgraphs. The product graph builder and fragment extractor in
//! `mcis_product` consume these types read-only.

mod atom_id;
mod canon;
mod error;
mod molecule;
mod periodic_table;
mod properties;
mod record;

pub use crate::atom_id::AtomId;
pub use crate::canon::{Canonization, CodeEntry};
pub use crate::error::MoleculeError;
pub use crate::molecule::{Atom, AtomData, Bond, Molecule};
pub use crate::periodic_table::{Color, ElementInfo, PeriodicTable};
pub use crate::properties::PropertyValue;
pub use crate::record::{AtomRecord, MoleculeRecord};

pub use fixedbitset::FixedBitSet;
