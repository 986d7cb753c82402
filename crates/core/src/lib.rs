//! Core traits and types for betatron diagnostics.
//!
//! This crate defines the pieces that diagnostics and particle containers
//! share:
//!
//! - [`Bunch`] and [`AttributeSet`] - the host container interface
//! - [`SyncParticle`] - the reference particle used to scale energy deviations
//! - [`constraint`] - numeric invariants checked at construction

mod bunch;
pub mod constraint;
mod sync_particle;

pub use bunch::{AttributeSet, Bunch, Coordinates};
pub use sync_particle::{SyncParticle, SyncParticleError};
