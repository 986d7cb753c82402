//! The per-particle transform from phase-space coordinates to phase, tune, and action.
//!
//! Everything here is pure: an [`Optics`] snapshot plus one particle's
//! coordinates and previous phases fully determine the [`ParticleReading`].
//!
//! # Conventions
//!
//! Coordinates are first corrected for the closed orbit and for dispersion
//! (`u = x - x_co - eta * dp/p`, `pu = xp - xp_co - etap * dp/p`), then
//! normalized to Courant–Snyder form:
//!
//! ```text
//! u_n  = u / sqrt(beta)
//! pu_n = pu * sqrt(beta) + u_n * alpha
//! ```
//!
//! The phase is `atan2(pu_n, u_n)` in `[0, 2π)`. Linear motion rotates the
//! normalized point clockwise, so the phase decreases from one turn to the
//! next and the tune is measured as `(previous - current) / 2π` in `[0, 1)`.
//!
//! The action is `u^2 / beta + (pu + u * alpha / beta)^2 * beta`, which equals
//! the Courant–Snyder invariant `gamma*u^2 + 2*alpha*u*pu + beta*pu^2`.

use std::f64::consts::TAU;

use betatune_core::Coordinates;

use crate::{ClosedOrbit, PlaneTwiss, Twiss};

/// An immutable copy of the analyzer configuration, taken once per analysis.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Optics {
    pub twiss: Twiss,
    pub orbit: ClosedOrbit,
}

/// Phases (rad) stored by the previous analysis of a particle.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PhasePair {
    pub x: f64,
    pub y: f64,
}

/// Phase (rad), tune, and action (m·rad) measured in one plane.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlaneReading {
    pub phase: f64,
    pub tune: f64,
    pub action: f64,
}

/// The readings of one particle in both planes.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ParticleReading {
    pub x: PlaneReading,
    pub y: PlaneReading,
}

impl ParticleReading {
    /// Returns the phases, for use as `previous` in the next measurement.
    #[must_use]
    pub fn phases(&self) -> PhasePair {
        PhasePair {
            x: self.x.phase,
            y: self.y.phase,
        }
    }
}

impl Optics {
    #[must_use]
    pub const fn new(twiss: Twiss, orbit: ClosedOrbit) -> Self {
        Self { twiss, orbit }
    }

    /// Measures one particle.
    ///
    /// `dpp` is the particle's relative momentum offset and `previous` the
    /// phases stored by the last measurement (zero before the first).
    ///
    /// Non-positive betas are not checked here and yield NaN or infinite
    /// readings.
    #[must_use]
    pub fn measure(
        &self,
        coordinates: &Coordinates,
        dpp: f64,
        previous: PhasePair,
    ) -> ParticleReading {
        let [x, xp, y, yp, _z, _de] = *coordinates;
        let orbit = &self.orbit;

        ParticleReading {
            x: measure_plane(&self.twiss.x, x - orbit.x, xp - orbit.xp, dpp, previous.x),
            y: measure_plane(&self.twiss.y, y - orbit.y, yp - orbit.yp, dpp, previous.y),
        }
    }
}

/// Measures one plane from closed-orbit-corrected position and angle.
fn measure_plane(
    twiss: &PlaneTwiss,
    position: f64,
    angle: f64,
    dpp: f64,
    previous_phase: f64,
) -> PlaneReading {
    let u = position - twiss.eta * dpp;
    let pu = angle - twiss.etap * dpp;

    let sqrt_beta = twiss.beta.sqrt();
    let u_n = u / sqrt_beta;
    let pu_n = pu * sqrt_beta + u_n * twiss.alpha;

    let phase = wrap_phase(pu_n.atan2(u_n));
    let tune = tune_between(previous_phase, phase);

    let pu_canonical = pu + u * (twiss.alpha / twiss.beta);
    let action = u * u / twiss.beta + pu_canonical * pu_canonical * twiss.beta;

    PlaneReading {
        phase,
        tune,
        action,
    }
}

/// Maps an `atan2` result from `(-π, π]` into `[0, 2π)`.
///
/// A tiny negative angle can round up to exactly `2π`; that case maps to zero.
#[must_use]
pub fn wrap_phase(angle: f64) -> f64 {
    let wrapped = if angle < 0.0 { angle + TAU } else { angle };
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Returns the fractional tune for a phase step from `previous` to `current`.
///
/// The result is `(previous - current) / 2π`, shifted into `[0, 1)`.
#[must_use]
pub fn tune_between(previous: f64, current: f64) -> f64 {
    let tune = (previous - current) / TAU;
    let tune = if tune < 0.0 { tune + 1.0 } else { tune };
    if tune >= 1.0 { 0.0 } else { tune }
}
