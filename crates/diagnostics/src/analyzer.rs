//! Turn-by-turn tune and action analysis of a whole bunch.

use betatune_core::{Bunch, Coordinates, SyncParticle};

use crate::{
    AnalysisError, ClosedOrbit, Optics, OpticsError, ParticleReading, PhasePair, PlaneTwiss,
    Twiss,
    schema::{PHASE_ATTRIBUTE_SET, PhaseSlots, ensure_phase_attributes},
};

/// Measures betatron phase, tune, and action for every particle of a bunch.
///
/// The analyzer holds the optics at its location. Each call to
/// [`TuneAnalyzer::analyze`] compares every particle's phase with the phase
/// stored by the previous call, so calling it once per turn yields the
/// turn-by-turn tune. State between calls lives in the bunch, not here.
///
/// A new analyzer has all optics set to zero, which yields non-finite
/// readings until [`TuneAnalyzer::set_twiss`] is called.
///
/// # Example
///
/// ```
/// use betatune_bunch::MemoryBunch;
/// use betatune_core::SyncParticle;
/// use betatune_diagnostics::{TuneAnalyzer, read_reading};
///
/// let mut bunch = MemoryBunch::new(SyncParticle::new(0.938, 1.0).unwrap());
/// bunch.push([1.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
///
/// let mut analyzer = TuneAnalyzer::new();
/// analyzer.set_twiss(10.0, 0.0, 0.0, 0.0, 10.0, 0.0, 0.0, 0.0);
/// analyzer.analyze(&mut bunch).unwrap();
///
/// let reading = read_reading(&bunch, 0).unwrap();
/// assert!((reading.x.action - 0.1).abs() < 1e-15);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TuneAnalyzer {
    twiss: Twiss,
    orbit: ClosedOrbit,
}

/// What a call to [`TuneAnalyzer::analyze`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisSummary {
    /// Number of particles measured.
    pub particles: usize,
    /// Whether the phase attribute set was created by this call.
    pub attributes_created: bool,
}

impl TuneAnalyzer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an analyzer with the given optics and closed orbit.
    #[must_use]
    pub fn with_optics(twiss: Twiss, orbit: ClosedOrbit) -> Self {
        Self { twiss, orbit }
    }

    /// Replaces all eight optics coefficients.
    ///
    /// Values are not validated; a zero beta produces NaN or infinite readings.
    #[allow(clippy::too_many_arguments)]
    pub fn set_twiss(
        &mut self,
        betax: f64,
        alphax: f64,
        etax: f64,
        etapx: f64,
        betay: f64,
        alphay: f64,
        etay: f64,
        etapy: f64,
    ) {
        self.twiss = Twiss::new(
            PlaneTwiss::new(betax, alphax, etax, etapx),
            PlaneTwiss::new(betay, alphay, etay, etapy),
        );
    }

    /// Replaces the optics of both planes.
    pub fn set_plane_twiss(&mut self, x: PlaneTwiss, y: PlaneTwiss) {
        self.twiss = Twiss::new(x, y);
    }

    /// Replaces the optics after validating them.
    ///
    /// # Errors
    ///
    /// Returns [`OpticsError`] and leaves the current optics unchanged if
    /// either beta is not strictly positive or any value is not finite.
    pub fn set_checked_twiss(&mut self, twiss: Twiss) -> Result<(), OpticsError> {
        twiss.validate()?;
        self.twiss = twiss;
        Ok(())
    }

    /// Replaces the closed-orbit position and angle in both planes.
    pub fn set_closed_orbit(&mut self, x: f64, xp: f64, y: f64, yp: f64) {
        self.orbit = ClosedOrbit::new(x, xp, y, yp);
    }

    #[must_use]
    pub fn twiss(&self) -> Twiss {
        self.twiss
    }

    #[must_use]
    pub fn closed_orbit(&self) -> ClosedOrbit {
        self.orbit
    }

    /// Returns a snapshot of the current configuration.
    #[must_use]
    pub fn optics(&self) -> Optics {
        Optics::new(self.twiss, self.orbit)
    }

    /// Analyzes every particle of `bunch` and stores the readings in its
    /// phase attribute set.
    ///
    /// The bunch is compressed first, and the attribute set is created with
    /// zeroed slots if missing. Particles measured for the first time are
    /// compared against a previous phase of zero.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError`] if the bunch cannot create the attribute set,
    /// an existing set lacks a phase slot, or the bunch's storage is shorter
    /// than its reported size.
    pub fn analyze<B: Bunch>(&self, bunch: &mut B) -> Result<AnalysisSummary, AnalysisError> {
        let optics = self.optics();

        bunch.compress();
        let attributes_created = ensure_phase_attributes(bunch)?;

        let size = bunch.size();
        let sync = *bunch.sync_particle();
        let coordinates = bunch.coordinates();
        let coordinates = coordinates
            .get(..size)
            .ok_or(AnalysisError::MissingCoordinates {
                size,
                available: coordinates.len(),
            })?;

        let set = bunch
            .attribute_set(PHASE_ATTRIBUTE_SET)
            .ok_or(AnalysisError::MissingAttributeSet(PHASE_ATTRIBUTE_SET))?;
        let slots = PhaseSlots::resolve(set)?;
        let previous = (0..size)
            .map(|particle| slots.previous(set, particle))
            .collect::<Result<Vec<_>, _>>()?;

        let readings = measure_all(&optics, &sync, coordinates, &previous);

        let set = bunch
            .attribute_set_mut(PHASE_ATTRIBUTE_SET)
            .ok_or(AnalysisError::MissingAttributeSet(PHASE_ATTRIBUTE_SET))?;
        for (particle, reading) in readings.iter().enumerate() {
            slots.store(set, particle, reading)?;
        }

        tracing::trace!(particles = size, "analyzed bunch tunes");

        Ok(AnalysisSummary {
            particles: size,
            attributes_created,
        })
    }
}

#[cfg(not(feature = "parallel"))]
fn measure_all(
    optics: &Optics,
    sync: &SyncParticle,
    coordinates: &[Coordinates],
    previous: &[PhasePair],
) -> Vec<ParticleReading> {
    coordinates
        .iter()
        .zip(previous)
        .map(|(coords, previous)| {
            optics.measure(coords, sync.momentum_offset(coords[5]), *previous)
        })
        .collect()
}

#[cfg(feature = "parallel")]
fn measure_all(
    optics: &Optics,
    sync: &SyncParticle,
    coordinates: &[Coordinates],
    previous: &[PhasePair],
) -> Vec<ParticleReading> {
    use rayon::prelude::*;

    coordinates
        .par_iter()
        .zip(previous.par_iter())
        .map(|(coords, previous)| {
            optics.measure(coords, sync.momentum_offset(coords[5]), *previous)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::f64::consts::TAU;

    use approx::assert_relative_eq;
    use betatune_bunch::MemoryBunch;
    use betatune_core::{AttributeSet, constraint::UnitIntervalRightOpen};

    use crate::{PhaseAttribute, read_reading};

    fn bunch(particles: &[Coordinates]) -> MemoryBunch {
        let mut bunch = MemoryBunch::new(SyncParticle::from_parts(0.5, 1.0, 1.0));
        for coords in particles {
            bunch.push(*coords);
        }
        bunch
    }

    fn analyzer(beta: f64) -> TuneAnalyzer {
        let mut analyzer = TuneAnalyzer::new();
        analyzer.set_twiss(beta, 0.0, 0.0, 0.0, beta, 0.0, 0.0, 0.0);
        analyzer
    }

    #[test]
    fn two_calls_with_unchanged_coordinates() {
        let mut bunch = bunch(&[[1.0, 0.0, 0.0, 0.0, 0.0, 0.0]]);
        let analyzer = analyzer(10.0);

        let first = analyzer.analyze(&mut bunch).unwrap();
        assert!(first.attributes_created);
        assert_eq!(first.particles, 1);

        let reading = read_reading(&bunch, 0).unwrap();
        assert_relative_eq!(reading.x.phase, 0.0);
        assert_relative_eq!(reading.x.action, 0.1);

        let second = analyzer.analyze(&mut bunch).unwrap();
        assert!(!second.attributes_created);

        let reading = read_reading(&bunch, 0).unwrap();
        assert_relative_eq!(reading.x.phase, 0.0);
        assert_relative_eq!(reading.x.tune, 0.0);
        assert_relative_eq!(reading.x.action, 0.1);
    }

    #[test]
    fn first_call_tune_is_measured_from_zero() {
        let mut bunch = bunch(&[[0.0, 1.0, 0.0, -1.0, 0.0, 0.0]]);
        analyzer(1.0).analyze(&mut bunch).unwrap();

        let reading = read_reading(&bunch, 0).unwrap();
        // x phase is π/2, y phase is 3π/2.
        assert_relative_eq!(reading.x.tune, 0.75, epsilon = 1e-12);
        assert_relative_eq!(reading.y.tune, 0.25, epsilon = 1e-12);
    }

    #[test]
    fn tune_follows_phase_change_between_calls() {
        let mut bunch = bunch(&[[1.0, 0.0, 1.0, 0.0, 0.0, 0.0]]);
        let analyzer = analyzer(1.0);
        analyzer.analyze(&mut bunch).unwrap();

        // Rotate clockwise by a tenth of a turn in x and a third in y.
        let (sx, cx) = (0.1 * TAU).sin_cos();
        let (sy, cy) = (TAU / 3.0).sin_cos();
        bunch.coordinates_mut()[0] = [cx, -sx, cy, -sy, 0.0, 0.0];
        analyzer.analyze(&mut bunch).unwrap();

        let reading = read_reading(&bunch, 0).unwrap();
        assert_relative_eq!(reading.x.tune, 0.1, epsilon = 1e-12);
        assert_relative_eq!(reading.y.tune, 1.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn momentum_offset_uses_sync_particle() {
        // beta^2 * E_total = 0.25 * 2.0, so dE = 0.001 gives dp/p = 0.002.
        let mut bunch = bunch(&[[0.0, 0.0, 0.0, 0.0, 0.0, 0.001]]);
        let mut analyzer = TuneAnalyzer::new();
        analyzer.set_twiss(4.0, 0.0, 1.5, 0.0, 4.0, 0.0, 0.0, 0.0);

        analyzer.analyze(&mut bunch).unwrap();

        // u = -eta * dp/p = -0.003, action = u^2 / beta
        let reading = read_reading(&bunch, 0).unwrap();
        assert_relative_eq!(reading.x.action, 0.003 * 0.003 / 4.0, max_relative = 1e-12);
        assert_relative_eq!(reading.x.phase, 0.5 * TAU);
        assert_relative_eq!(reading.y.action, 0.0);
    }

    #[test]
    fn closed_orbit_is_subtracted() {
        let mut bunch = bunch(&[[2e-3, 1e-4, -1e-3, 3e-5, 0.0, 0.0]]);
        let mut analyzer = analyzer(5.0);
        analyzer.set_closed_orbit(2e-3, 1e-4, -1e-3, 3e-5);

        analyzer.analyze(&mut bunch).unwrap();

        let reading = read_reading(&bunch, 0).unwrap();
        assert_relative_eq!(reading.x.action, 0.0);
        assert_relative_eq!(reading.y.action, 0.0);
    }

    #[test]
    fn existing_readings_are_kept_for_surviving_particles() {
        let mut bunch = bunch(&[
            [1.0, 0.0, 1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 1.0, 0.0, 0.0],
            [-1.0, 0.0, -1.0, 0.0, 0.0, 0.0],
        ]);
        let analyzer = analyzer(1.0);
        analyzer.analyze(&mut bunch).unwrap();

        bunch.lose(0).unwrap();
        let summary = analyzer.analyze(&mut bunch).unwrap();

        assert_eq!(summary.particles, 2);
        // Unchanged coordinates: no phase advance for the survivors.
        for particle in 0..2 {
            let reading = read_reading(&bunch, particle).unwrap();
            assert_relative_eq!(reading.x.tune, 0.0);
            assert_relative_eq!(reading.y.tune, 0.0);
        }
        assert_relative_eq!(read_reading(&bunch, 1).unwrap().x.phase, 0.5 * TAU);
    }

    #[test]
    fn repeated_configuration_gives_identical_results() {
        let coords = [[1e-3, -2e-4, 5e-4, 1e-4, 0.0, 1e-4]];
        let mut a = bunch(&coords);
        let mut b = bunch(&coords);

        let mut once = TuneAnalyzer::new();
        once.set_twiss(12.0, 1.0, 2.0, 0.1, 6.0, -0.4, 0.3, 0.0);
        once.set_closed_orbit(1e-4, 0.0, -1e-4, 0.0);

        let mut twice = once;
        twice.set_twiss(12.0, 1.0, 2.0, 0.1, 6.0, -0.4, 0.3, 0.0);
        twice.set_closed_orbit(1e-4, 0.0, -1e-4, 0.0);

        assert_eq!(once, twice);
        once.analyze(&mut a).unwrap();
        twice.analyze(&mut b).unwrap();
        assert_eq!(read_reading(&a, 0).unwrap(), read_reading(&b, 0).unwrap());
    }

    #[test]
    fn readings_are_in_range_for_many_particles() {
        let particles: Vec<Coordinates> = (0..64_u32)
            .map(|i| {
                let theta = f64::from(i) * 0.37;
                [theta.cos(), theta.sin(), theta.sin(), -theta.cos(), 0.0, 1e-4 * theta.cos()]
            })
            .collect();
        let mut bunch = bunch(&particles);
        let mut analyzer = TuneAnalyzer::new();
        analyzer.set_twiss(3.0, 0.5, 0.8, 0.05, 7.0, -1.5, 0.0, 0.0);

        for turn in 0..3_u32 {
            for coords in bunch.coordinates_mut() {
                coords.swap(0, 1);
                coords[0] *= -1.0 + 0.1 * f64::from(turn);
            }
            analyzer.analyze(&mut bunch).unwrap();

            for particle in 0..particles.len() {
                let reading = read_reading(&bunch, particle).unwrap();
                for plane in [reading.x, reading.y] {
                    assert!((0.0..TAU).contains(&plane.phase));
                    assert!(UnitIntervalRightOpen::new(plane.tune).is_ok());
                }
            }
        }
    }

    #[test]
    fn zero_beta_yields_non_finite_readings() {
        let mut bunch = bunch(&[[1e-3, 0.0, 1e-3, 0.0, 0.0, 0.0]]);

        TuneAnalyzer::new().analyze(&mut bunch).unwrap();

        let reading = read_reading(&bunch, 0).unwrap();
        assert!(!reading.x.action.is_finite());
        assert!(!reading.y.action.is_finite());
    }

    #[test]
    fn checked_twiss_keeps_previous_optics_on_error() {
        let mut analyzer = analyzer(10.0);
        let bad = Twiss::new(
            PlaneTwiss::new(0.0, 0.0, 0.0, 0.0),
            PlaneTwiss::new(1.0, 0.0, 0.0, 0.0),
        );

        assert!(analyzer.set_checked_twiss(bad).is_err());
        assert_relative_eq!(analyzer.twiss().x.beta, 10.0);

        let good = Twiss::new(
            PlaneTwiss::new(2.0, 0.0, 0.0, 0.0),
            PlaneTwiss::new(3.0, 0.0, 0.0, 0.0),
        );
        analyzer.set_checked_twiss(good).unwrap();
        assert_eq!(analyzer.twiss(), good);
    }

    #[test]
    fn missing_attributes_are_created_zeroed_then_filled() {
        let mut bunch = bunch(&[[0.0, 0.0, 0.0, 0.0, 0.0, 0.0], [1.0, 0.0, 1.0, 0.0, 0.0, 0.0]]);
        assert!(!bunch.has_attribute_set(PHASE_ATTRIBUTE_SET));

        analyzer(2.0).analyze(&mut bunch).unwrap();

        let set = bunch.attribute_set(PHASE_ATTRIBUTE_SET).unwrap();
        for attribute in PhaseAttribute::ALL {
            assert!(set.slot(attribute.name()).is_some());
        }
        // Particle at the origin measures zero everywhere.
        assert_eq!(read_reading(&bunch, 0).unwrap(), ParticleReading::default());
        assert_relative_eq!(read_reading(&bunch, 1).unwrap().x.action, 0.5);
    }

    #[test]
    fn existing_set_without_phase_slots_is_an_error() {
        let mut bunch = bunch(&[[0.0; 6]]);
        bunch
            .add_attribute_set(PHASE_ATTRIBUTE_SET, &[("something", 0.0)])
            .unwrap();

        let err = analyzer(1.0).analyze(&mut bunch).unwrap_err();

        assert!(matches!(
            err,
            AnalysisError::MissingSlot(PhaseAttribute::XLastPhase)
        ));
    }
}
