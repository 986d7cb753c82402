//! An in-memory particle bunch for the betatune diagnostics.
//!
//! [`MemoryBunch`] implements [`betatune_core::Bunch`] with a flat coordinate
//! vector, loss flags, and named [`MemoryAttributes`] sets. It is suitable for
//! simulation loops that do their own tracking and call diagnostics between
//! turns.

mod attributes;
mod memory;

pub use attributes::MemoryAttributes;
pub use memory::{BunchError, MemoryBunch};
