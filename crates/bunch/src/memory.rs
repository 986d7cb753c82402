use std::collections::BTreeMap;

use betatune_core::{Bunch, Coordinates, SyncParticle};
use thiserror::Error;

use crate::MemoryAttributes;

/// A bunch held entirely in memory.
///
/// Particles are appended with [`MemoryBunch::push`] and marked lost with
/// [`MemoryBunch::lose`]. Lost particles keep their index until
/// [`Bunch::compress`] removes them from the coordinates and from every
/// attribute set at once.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryBunch {
    sync: SyncParticle,
    coordinates: Vec<Coordinates>,
    lost: Vec<bool>,
    attributes: BTreeMap<String, MemoryAttributes>,
}

/// Errors returned by [`MemoryBunch`] operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum BunchError {
    #[error("attribute set `{0}` already exists")]
    DuplicateAttributeSet(String),

    #[error("attribute set `{set}` declares slot `{slot}` more than once")]
    DuplicateSlot { set: String, slot: String },

    #[error("particle {index} is out of range for a bunch of {len}")]
    ParticleOutOfRange { index: usize, len: usize },
}

impl MemoryBunch {
    /// Creates an empty bunch around the given reference particle.
    #[must_use]
    pub fn new(sync: SyncParticle) -> Self {
        Self {
            sync,
            coordinates: Vec::new(),
            lost: Vec::new(),
            attributes: BTreeMap::new(),
        }
    }

    /// Appends a particle and returns its index.
    ///
    /// Existing attribute sets receive a row of defaults for it.
    pub fn push(&mut self, coordinates: Coordinates) -> usize {
        self.coordinates.push(coordinates);
        self.lost.push(false);
        for set in self.attributes.values_mut() {
            set.push_default();
        }
        self.coordinates.len() - 1
    }

    /// Marks the particle at `index` as lost.
    ///
    /// # Errors
    ///
    /// Returns [`BunchError::ParticleOutOfRange`] if `index` is not stored.
    pub fn lose(&mut self, index: usize) -> Result<(), BunchError> {
        let len = self.lost.len();
        let flag = self
            .lost
            .get_mut(index)
            .ok_or(BunchError::ParticleOutOfRange { index, len })?;
        *flag = true;
        Ok(())
    }

    /// Returns `true` if the particle at `index` has been marked lost.
    #[must_use]
    pub fn is_lost(&self, index: usize) -> bool {
        self.lost.get(index).copied().unwrap_or(false)
    }

    /// Returns the stored coordinates for modification, lost particles included.
    ///
    /// Tracking code uses this to advance particles between diagnostics.
    pub fn coordinates_mut(&mut self) -> &mut [Coordinates] {
        &mut self.coordinates
    }

    /// Replaces the reference particle.
    pub fn set_sync_particle(&mut self, sync: SyncParticle) {
        self.sync = sync;
    }

    /// Returns the names of the attached attribute sets, sorted.
    pub fn attribute_set_names(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(String::as_str)
    }
}

impl Bunch for MemoryBunch {
    type Attributes = MemoryAttributes;
    type Error = BunchError;

    fn compress(&mut self) {
        if !self.lost.contains(&true) {
            return;
        }

        for set in self.attributes.values_mut() {
            set.retain_rows(&self.lost);
        }

        let mut flags = self.lost.iter();
        self.coordinates
            .retain(|_| flags.next().is_some_and(|is_lost| !is_lost));

        self.lost = vec![false; self.coordinates.len()];
    }

    fn size(&self) -> usize {
        self.lost.iter().filter(|is_lost| !**is_lost).count()
    }

    fn coordinates(&self) -> &[Coordinates] {
        &self.coordinates
    }

    fn sync_particle(&self) -> &SyncParticle {
        &self.sync
    }

    fn has_attribute_set(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    fn add_attribute_set(
        &mut self,
        name: &str,
        defaults: &[(&str, f64)],
    ) -> Result<(), BunchError> {
        if self.attributes.contains_key(name) {
            return Err(BunchError::DuplicateAttributeSet(name.to_owned()));
        }

        for (i, (slot, _)) in defaults.iter().enumerate() {
            if defaults[..i].iter().any(|(other, _)| other == slot) {
                return Err(BunchError::DuplicateSlot {
                    set: name.to_owned(),
                    slot: (*slot).to_owned(),
                });
            }
        }

        self.attributes.insert(
            name.to_owned(),
            MemoryAttributes::new(defaults, self.coordinates.len()),
        );
        Ok(())
    }

    fn attribute_set(&self, name: &str) -> Option<&MemoryAttributes> {
        self.attributes.get(name)
    }

    fn attribute_set_mut(&mut self, name: &str) -> Option<&mut MemoryAttributes> {
        self.attributes.get_mut(name)
    }
}
