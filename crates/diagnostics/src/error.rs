use std::error::Error as StdError;

use thiserror::Error;

use crate::PhaseAttribute;

/// Errors that can occur while analyzing a bunch.
///
/// Numeric faults from invalid optics are not errors: they surface as NaN or
/// infinite readings. Use [`crate::Twiss::checked`] to reject such optics up
/// front.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AnalysisError {
    #[error("bunch operation failed")]
    Bunch(#[source] Box<dyn StdError + Send + Sync>),

    #[error("attribute set `{0}` is not attached to the bunch")]
    MissingAttributeSet(&'static str),

    #[error("phase attribute set has no `{0}` slot")]
    MissingSlot(PhaseAttribute),

    #[error("phase attribute set has no row for particle {particle}")]
    MissingParticle { particle: usize },

    #[error("bunch reports {size} particles but holds coordinates for {available}")]
    MissingCoordinates { size: usize, available: usize },
}
