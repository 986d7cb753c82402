use std::f64::consts::TAU;

use betatune_bunch::MemoryBunch;
use betatune_core::Bunch;
use betatune_diagnostics::{ClosedOrbit, PlaneTwiss, Twiss};
use serde::{Deserialize, Serialize};

/// A ring reduced to one linear transfer map per turn.
///
/// Betatron motion is tracked about the dispersive closed orbit
/// `x_co + eta * dp/p`, rotating each plane by `2π * tune` in normalized
/// coordinates. The energy deviation is frozen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearRing {
    pub twiss: Twiss,
    #[serde(default)]
    pub orbit: ClosedOrbit,
    pub tune_x: f64,
    pub tune_y: f64,
}

impl LinearRing {
    /// Advances every stored particle by one turn.
    pub fn track(&self, bunch: &mut MemoryBunch) {
        let sync = *bunch.sync_particle();
        for coords in bunch.coordinates_mut() {
            let dpp = sync.momentum_offset(coords[5]);
            let x = self.horizontal(dpp);
            let y = self.vertical(dpp);
            let (x, xp) = x.turn(self.tune_x, coords[0], coords[1]);
            let (y, yp) = y.turn(self.tune_y, coords[2], coords[3]);
            coords[..4].copy_from_slice(&[x, xp, y, yp]);
        }
    }

    /// Returns the Courant–Snyder invariant of a particle in each plane.
    #[must_use]
    pub fn invariants(&self, coords: &[f64; 6], dpp: f64) -> (f64, f64) {
        (
            self.horizontal(dpp).invariant(coords[0], coords[1]),
            self.vertical(dpp).invariant(coords[2], coords[3]),
        )
    }

    fn horizontal(&self, dpp: f64) -> PlaneMap<'_> {
        PlaneMap {
            twiss: &self.twiss.x,
            co: self.orbit.x + self.twiss.x.eta * dpp,
            cop: self.orbit.xp + self.twiss.x.etap * dpp,
        }
    }

    fn vertical(&self, dpp: f64) -> PlaneMap<'_> {
        PlaneMap {
            twiss: &self.twiss.y,
            co: self.orbit.y + self.twiss.y.eta * dpp,
            cop: self.orbit.yp + self.twiss.y.etap * dpp,
        }
    }
}

/// One plane's optics with the off-momentum closed orbit folded in.
struct PlaneMap<'a> {
    twiss: &'a PlaneTwiss,
    co: f64,
    cop: f64,
}

impl PlaneMap<'_> {
    fn invariant(&self, u: f64, pu: f64) -> f64 {
        let (u, pu) = (u - self.co, pu - self.cop);
        let t = self.twiss;
        t.gamma() * u * u + 2.0 * t.alpha * u * pu + t.beta * pu * pu
    }

    fn turn(&self, tune: f64, u: f64, pu: f64) -> (f64, f64) {
        let (u, pu) = (u - self.co, pu - self.cop);
        let (s, c) = (TAU * tune).sin_cos();
        let t = self.twiss;

        let u_next = (c + t.alpha * s) * u + t.beta * s * pu;
        let pu_next = -t.gamma() * s * u + (c - t.alpha * s) * pu;

        (u_next + self.co, pu_next + self.cop)
    }
}
