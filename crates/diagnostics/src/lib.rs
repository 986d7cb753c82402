//! Betatron phase, tune, and action diagnostics for particle bunches.
//!
//! The crate measures, for every particle of a [`betatune_core::Bunch`]:
//!
//! - the betatron phase in each transverse plane, from Courant–Snyder
//!   normalized coordinates corrected for closed orbit and dispersion
//! - the fractional tune, as the phase change since the previous analysis
//! - the action, the linear amplitude invariant
//!
//! [`TuneAnalyzer`] holds the optics and runs the analysis; readings are stored
//! in the bunch under [`PHASE_ATTRIBUTE_SET`] so they persist between turns.
//! The per-particle transform itself is [`Optics::measure`], which is pure.
//!
//! With the `parallel` feature, particles are measured with `rayon`.

mod analyzer;
mod error;
mod measure;
mod node;
mod readout;
mod schema;
mod twiss;

pub use analyzer::{AnalysisSummary, TuneAnalyzer};
pub use error::AnalysisError;
pub use measure::{
    Optics, ParticleReading, PhasePair, PlaneReading, tune_between, wrap_phase,
};
pub use node::TuneAnalysisNode;
pub use readout::{MeanTune, mean_tune, read_reading};
pub use schema::{PHASE_ATTRIBUTE_SET, PhaseAttribute, ensure_phase_attributes};
pub use twiss::{ClosedOrbit, OpticsError, Plane, PlaneTwiss, Twiss};
