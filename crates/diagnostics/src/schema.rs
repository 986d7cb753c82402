//! The per-particle attribute set that carries phase history between analyses.

use std::fmt;

use betatune_core::{AttributeSet, Bunch};

use crate::{AnalysisError, ParticleReading, PhasePair, PlaneReading};

/// Name of the attribute set holding phase, tune, and action per particle.
pub const PHASE_ATTRIBUTE_SET: &str = "ParticlePhaseAttributes";

/// One slot of the [`PHASE_ATTRIBUTE_SET`] record, in storage order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhaseAttribute {
    XLastPhase,
    YLastPhase,
    XLastTune,
    YLastTune,
    XAction,
    YAction,
}

impl PhaseAttribute {
    pub const ALL: [Self; 6] = [
        Self::XLastPhase,
        Self::YLastPhase,
        Self::XLastTune,
        Self::YLastTune,
        Self::XAction,
        Self::YAction,
    ];

    /// Returns the slot name used in the host attribute set.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::XLastPhase => "xLastPhase",
            Self::YLastPhase => "yLastPhase",
            Self::XLastTune => "xLastTune",
            Self::YLastTune => "yLastTune",
            Self::XAction => "xAction",
            Self::YAction => "yAction",
        }
    }
}

impl fmt::Display for PhaseAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Attaches the phase attribute set to `bunch` unless it is already present.
///
/// All six slots start at zero. Returns `true` if the set was created.
///
/// # Errors
///
/// Returns [`AnalysisError::Bunch`] if the bunch refuses to create the set.
pub fn ensure_phase_attributes<B: Bunch>(bunch: &mut B) -> Result<bool, AnalysisError> {
    if bunch.has_attribute_set(PHASE_ATTRIBUTE_SET) {
        return Ok(false);
    }

    let defaults = PhaseAttribute::ALL.map(|attribute| (attribute.name(), 0.0));
    bunch
        .add_attribute_set(PHASE_ATTRIBUTE_SET, &defaults)
        .map_err(|err| AnalysisError::Bunch(Box::new(err)))?;

    tracing::debug!(
        set = PHASE_ATTRIBUTE_SET,
        particles = bunch.size(),
        "added particle phase attributes"
    );
    Ok(true)
}

/// Slot indices of the phase attributes, resolved once per analysis.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PhaseSlots([usize; 6]);

impl PhaseSlots {
    pub(crate) fn resolve<A: AttributeSet>(set: &A) -> Result<Self, AnalysisError> {
        let mut slots = [0; 6];
        for (slot, attribute) in slots.iter_mut().zip(PhaseAttribute::ALL) {
            *slot = set
                .slot(attribute.name())
                .ok_or(AnalysisError::MissingSlot(attribute))?;
        }
        Ok(Self(slots))
    }

    fn index(self, attribute: PhaseAttribute) -> usize {
        self.0[attribute as usize]
    }

    fn get<A: AttributeSet>(
        self,
        set: &A,
        particle: usize,
        attribute: PhaseAttribute,
    ) -> Result<f64, AnalysisError> {
        set.value(particle, self.index(attribute))
            .ok_or(AnalysisError::MissingParticle { particle })
    }

    fn set<A: AttributeSet>(
        self,
        set: &mut A,
        particle: usize,
        attribute: PhaseAttribute,
        value: f64,
    ) -> Result<(), AnalysisError> {
        let slot = set
            .value_mut(particle, self.index(attribute))
            .ok_or(AnalysisError::MissingParticle { particle })?;
        *slot = value;
        Ok(())
    }

    pub(crate) fn previous<A: AttributeSet>(
        self,
        set: &A,
        particle: usize,
    ) -> Result<PhasePair, AnalysisError> {
        Ok(PhasePair {
            x: self.get(set, particle, PhaseAttribute::XLastPhase)?,
            y: self.get(set, particle, PhaseAttribute::YLastPhase)?,
        })
    }

    pub(crate) fn read<A: AttributeSet>(
        self,
        set: &A,
        particle: usize,
    ) -> Result<ParticleReading, AnalysisError> {
        use PhaseAttribute::{XAction, XLastPhase, XLastTune, YAction, YLastPhase, YLastTune};

        Ok(ParticleReading {
            x: PlaneReading {
                phase: self.get(set, particle, XLastPhase)?,
                tune: self.get(set, particle, XLastTune)?,
                action: self.get(set, particle, XAction)?,
            },
            y: PlaneReading {
                phase: self.get(set, particle, YLastPhase)?,
                tune: self.get(set, particle, YLastTune)?,
                action: self.get(set, particle, YAction)?,
            },
        })
    }

    pub(crate) fn store<A: AttributeSet>(
        self,
        set: &mut A,
        particle: usize,
        reading: &ParticleReading,
    ) -> Result<(), AnalysisError> {
        use PhaseAttribute::{XAction, XLastPhase, XLastTune, YAction, YLastPhase, YLastTune};

        self.set(set, particle, XLastPhase, reading.x.phase)?;
        self.set(set, particle, XLastTune, reading.x.tune)?;
        self.set(set, particle, YLastPhase, reading.y.phase)?;
        self.set(set, particle, YLastTune, reading.y.tune)?;
        self.set(set, particle, XAction, reading.x.action)?;
        self.set(set, particle, YAction, reading.y.action)
    }
}
