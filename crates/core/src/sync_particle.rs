use thiserror::Error;
use uom::si::{energy::gigaelectronvolt, f64::Energy};

use crate::constraint::{ConstraintError, StrictlyPositive};

/// The synchronous (reference) particle of a bunch.
///
/// Energies are in GeV, the convention used by the host coordinate arrays
/// where the sixth coordinate is the energy deviation `dE`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyncParticle {
    beta: f64,
    energy: f64,
    mass: f64,
}

/// Errors returned when constructing a [`SyncParticle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SyncParticleError {
    #[error("rest mass is invalid: {0}")]
    Mass(ConstraintError),

    #[error("kinetic energy is invalid: {0}")]
    KineticEnergy(ConstraintError),
}

impl SyncParticle {
    /// Creates a reference particle from its rest mass and kinetic energy in GeV.
    ///
    /// The relativistic velocity `beta` is derived from `gamma = (T + m) / m`.
    ///
    /// # Errors
    ///
    /// Returns [`SyncParticleError`] if `mass` or `kinetic_energy` is not
    /// strictly positive. A particle at rest has `beta = 0`, which leaves
    /// [`SyncParticle::momentum_offset`] undefined; use
    /// [`SyncParticle::from_parts`] to build one anyway.
    pub fn new(mass: f64, kinetic_energy: f64) -> Result<Self, SyncParticleError> {
        let mass = StrictlyPositive::new(mass)
            .map_err(SyncParticleError::Mass)?
            .into_inner();
        let energy = StrictlyPositive::new(kinetic_energy)
            .map_err(SyncParticleError::KineticEnergy)?
            .into_inner();

        let gamma = (energy + mass) / mass;
        let beta = (1.0 - 1.0 / (gamma * gamma)).sqrt();

        Ok(Self { beta, energy, mass })
    }

    /// Creates a reference particle from unit-aware quantities.
    ///
    /// # Errors
    ///
    /// Same as [`SyncParticle::new`].
    pub fn from_kinetic_energy(
        mass: Energy,
        kinetic_energy: Energy,
    ) -> Result<Self, SyncParticleError> {
        Self::new(
            mass.get::<gigaelectronvolt>(),
            kinetic_energy.get::<gigaelectronvolt>(),
        )
    }

    /// Creates a reference particle with all three values given directly.
    ///
    /// No consistency check is made between `beta` and the energies.
    #[must_use]
    pub fn from_parts(beta: f64, energy: f64, mass: f64) -> Self {
        Self { beta, energy, mass }
    }

    /// Relativistic velocity `v/c`.
    #[must_use]
    pub fn beta(&self) -> f64 {
        self.beta
    }

    /// Kinetic energy in GeV.
    #[must_use]
    pub fn energy(&self) -> f64 {
        self.energy
    }

    /// Rest mass in GeV.
    #[must_use]
    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Total energy `T + m` in GeV.
    #[must_use]
    pub fn total_energy(&self) -> f64 {
        self.energy + self.mass
    }

    /// Relative momentum offset for a particle with energy deviation `de`.
    ///
    /// Uses `dp/p = dE / (beta^2 * E_total)`.
    #[must_use]
    pub fn momentum_offset(&self, de: f64) -> f64 {
        de / (self.beta * self.beta * self.total_energy())
    }
}
