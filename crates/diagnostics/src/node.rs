use betatune_core::Bunch;

use crate::{AnalysisError, AnalysisSummary, OpticsError, Twiss, TuneAnalyzer};

/// A zero-length lattice node that runs a [`TuneAnalyzer`] whenever a bunch
/// passes through it.
///
/// The node records where it sits in the lattice so that readings collected
/// from several nodes can be told apart.
#[derive(Debug, Clone, PartialEq)]
pub struct TuneAnalysisNode {
    name: String,
    analyzer: TuneAnalyzer,
    position: f64,
    lattice_length: f64,
}

impl Default for TuneAnalysisNode {
    fn default() -> Self {
        Self::new("tuneanalysis no name")
    }
}

impl TuneAnalysisNode {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            analyzer: TuneAnalyzer::new(),
            position: 0.0,
            lattice_length: 0.0,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Position of the node along the lattice, in meters.
    #[must_use]
    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn set_position(&mut self, position: f64) {
        self.position = position;
    }

    /// Total length of the lattice the node belongs to, in meters.
    #[must_use]
    pub fn lattice_length(&self) -> f64 {
        self.lattice_length
    }

    pub fn set_lattice_length(&mut self, lattice_length: f64) {
        self.lattice_length = lattice_length;
    }

    /// Sets the optics at this node with zero vertical dispersion.
    pub fn assign_twiss(
        &mut self,
        betax: f64,
        alphax: f64,
        etax: f64,
        etapx: f64,
        betay: f64,
        alphay: f64,
    ) {
        self.analyzer
            .set_twiss(betax, alphax, etax, etapx, betay, alphay, 0.0, 0.0);
    }

    /// Sets the optics at this node, including vertical dispersion.
    #[allow(clippy::too_many_arguments)]
    pub fn assign_twiss_with_vertical_dispersion(
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
        self.analyzer
            .set_twiss(betax, alphax, etax, etapx, betay, alphay, etay, etapy);
    }

    /// Sets validated optics at this node.
    ///
    /// # Errors
    ///
    /// Returns [`OpticsError`] and keeps the current optics if `twiss` is invalid.
    pub fn assign_checked_twiss(&mut self, twiss: Twiss) -> Result<(), OpticsError> {
        self.analyzer.set_checked_twiss(twiss).inspect_err(|err| {
            tracing::warn!(node = %self.name, %err, "rejected optics");
        })
    }

    pub fn assign_closed_orbit(&mut self, x: f64, xp: f64, y: f64, yp: f64) {
        self.analyzer.set_closed_orbit(x, xp, y, yp);
    }

    #[must_use]
    pub fn analyzer(&self) -> &TuneAnalyzer {
        &self.analyzer
    }

    /// Analyzes `bunch` at this node.
    ///
    /// # Errors
    ///
    /// See [`TuneAnalyzer::analyze`].
    pub fn track<B: Bunch>(&self, bunch: &mut B) -> Result<AnalysisSummary, AnalysisError> {
        let _span = tracing::trace_span!(
            "tune_analysis",
            node = %self.name,
            position = self.position
        )
        .entered();
        self.analyzer.analyze(bunch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use betatune_bunch::MemoryBunch;
    use betatune_core::SyncParticle;

    use crate::{PlaneTwiss, read_reading};

    #[test]
    fn default_node_is_unnamed_and_at_origin() {
        let node = TuneAnalysisNode::default();
        assert_eq!(node.name(), "tuneanalysis no name");
        assert_relative_eq!(node.position(), 0.0);
        assert_relative_eq!(node.lattice_length(), 0.0);
    }

    #[test]
    fn assign_twiss_clears_vertical_dispersion() {
        let mut node = TuneAnalysisNode::new("qtune");
        node.assign_twiss_with_vertical_dispersion(1.0, 0.0, 0.0, 0.0, 2.0, 0.0, 0.5, 0.1);
        node.assign_twiss(3.0, 0.1, 1.2, 0.0, 4.0, -0.2);

        let twiss = node.analyzer().twiss();
        assert_eq!(twiss.x, PlaneTwiss::new(3.0, 0.1, 1.2, 0.0));
        assert_eq!(twiss.y, PlaneTwiss::new(4.0, -0.2, 0.0, 0.0));
    }

    #[test]
    fn checked_twiss_is_rejected_without_change() {
        let mut node = TuneAnalysisNode::new("qtune");
        node.assign_twiss(3.0, 0.0, 0.0, 0.0, 4.0, 0.0);

        let bad = Twiss::new(
            PlaneTwiss::new(3.0, 0.0, 0.0, 0.0),
            PlaneTwiss::new(-4.0, 0.0, 0.0, 0.0),
        );
        assert!(node.assign_checked_twiss(bad).is_err());
        assert_relative_eq!(node.analyzer().twiss().y.beta, 4.0);
    }

    #[test]
    fn track_runs_the_analyzer() {
        let mut bunch = MemoryBunch::new(SyncParticle::from_parts(0.5, 1.0, 1.0));
        bunch.push([2.0, 0.0, 1.0, 0.0, 0.0, 0.0]);

        let mut node = TuneAnalysisNode::new("qtune");
        node.set_position(12.5);
        node.set_lattice_length(248.0);
        node.assign_twiss(4.0, 0.0, 0.0, 0.0, 1.0, 0.0);
        node.assign_closed_orbit(1.0, 0.0, 0.0, 0.0);

        let summary = node.track(&mut bunch).unwrap();

        assert_eq!(summary.particles, 1);
        let reading = read_reading(&bunch, 0).unwrap();
        assert_relative_eq!(reading.x.action, 0.25);
        assert_relative_eq!(reading.y.action, 1.0);
        assert_relative_eq!(node.position(), 12.5);
    }
}
