use betatune_core::Bunch;

use crate::{
    AnalysisError, ParticleReading,
    schema::{PHASE_ATTRIBUTE_SET, PhaseSlots},
};

/// Reads back the stored phase, tune, and action of one particle.
///
/// `particle` is a storage index. Until the bunch is compressed it may still
/// address a particle that was lost after the last analysis.
///
/// # Errors
///
/// Returns [`AnalysisError`] if the bunch has never been analyzed, the set is
/// missing a slot, or `particle` is out of range.
pub fn read_reading<B: Bunch>(
    bunch: &B,
    particle: usize,
) -> Result<ParticleReading, AnalysisError> {
    let set = bunch
        .attribute_set(PHASE_ATTRIBUTE_SET)
        .ok_or(AnalysisError::MissingAttributeSet(PHASE_ATTRIBUTE_SET))?;
    PhaseSlots::resolve(set)?.read(set, particle)
}

/// Mean of the stored tunes over the active particles of a bunch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeanTune {
    pub x: f64,
    pub y: f64,
}

/// Averages the last measured tunes over the active particles.
///
/// The bunch is compressed first, so particles lost since the last analysis
/// do not contribute. Returns `Ok(None)` for an empty bunch. Tunes near the
/// `0`/`1` wrap point are averaged as plain numbers.
///
/// # Errors
///
/// Same as [`read_reading`].
pub fn mean_tune<B: Bunch>(bunch: &mut B) -> Result<Option<MeanTune>, AnalysisError> {
    bunch.compress();

    let set = bunch
        .attribute_set(PHASE_ATTRIBUTE_SET)
        .ok_or(AnalysisError::MissingAttributeSet(PHASE_ATTRIBUTE_SET))?;
    let slots = PhaseSlots::resolve(set)?;

    let size = bunch.size();
    if size == 0 {
        return Ok(None);
    }

    let (mut x, mut y) = (0.0, 0.0);
    for particle in 0..size {
        let reading = slots.read(set, particle)?;
        x += reading.x.tune;
        y += reading.y.tune;
    }

    #[allow(clippy::cast_precision_loss)]
    let n = size as f64;
    Ok(Some(MeanTune { x: x / n, y: y / n }))
}
