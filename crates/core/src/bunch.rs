//! The narrow interface a host particle container exposes to diagnostics.
//!
//! Diagnostics never own particles. They read coordinates and the reference
//! particle from a [`Bunch`], and keep their own per-particle state in named
//! attribute sets that the bunch stores alongside the coordinates.

use crate::SyncParticle;

/// Phase-space coordinates of one particle: `(x, xp, y, yp, z, dE)`.
pub type Coordinates = [f64; 6];

/// Per-particle storage for a fixed list of named `f64` slots.
///
/// Slots are addressed by index for speed; use [`AttributeSet::slot`] to
/// resolve a name once before looping over particles.
pub trait AttributeSet {
    /// Returns the index of the slot called `name`, if present.
    fn slot(&self, name: &str) -> Option<usize>;

    /// Returns the value of `slot` for the particle at `particle`.
    ///
    /// Returns `None` if either index is out of range.
    fn value(&self, particle: usize, slot: usize) -> Option<f64>;

    /// Returns a mutable reference to the value of `slot` for `particle`.
    ///
    /// Returns `None` if either index is out of range.
    fn value_mut(&mut self, particle: usize, slot: usize) -> Option<&mut f64>;
}

/// A container of particles that diagnostics can read and annotate.
///
/// Implementors own both the coordinates and any attribute sets, and must keep
/// attribute rows aligned with coordinate rows through [`Bunch::compress`].
pub trait Bunch {
    type Attributes: AttributeSet;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Removes gaps left by lost particles so indices are dense `0..size()`.
    fn compress(&mut self);

    /// Returns the number of active particles.
    ///
    /// Lost particles may keep their storage rows until the next
    /// [`Bunch::compress`], so `size()` only indexes rows after compression.
    fn size(&self) -> usize;

    /// Returns the stored coordinate rows, in index order.
    ///
    /// Before [`Bunch::compress`] this may include particles already lost;
    /// afterwards it holds exactly the `size()` active particles.
    fn coordinates(&self) -> &[Coordinates];

    /// Returns the reference particle.
    fn sync_particle(&self) -> &SyncParticle;

    /// Returns `true` if an attribute set called `name` is attached.
    fn has_attribute_set(&self, name: &str) -> bool;

    /// Attaches a new attribute set with one slot per `(name, default)` pair.
    ///
    /// Every existing particle receives the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the set cannot be created.
    fn add_attribute_set(
        &mut self,
        name: &str,
        defaults: &[(&str, f64)],
    ) -> Result<(), Self::Error>;

    /// Returns the attribute set called `name`.
    fn attribute_set(&self, name: &str) -> Option<&Self::Attributes>;

    /// Returns the attribute set called `name` for modification.
    fn attribute_set_mut(&mut self, name: &str) -> Option<&mut Self::Attributes>;
}
