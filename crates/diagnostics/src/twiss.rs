use std::fmt;

use betatune_core::constraint::{ConstraintError, StrictlyPositive};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uom::si::{
    f64::{Length, Ratio},
    length::meter,
    ratio::ratio,
};

/// A transverse plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Plane {
    Horizontal,
    Vertical,
}

impl fmt::Display for Plane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Plane::Horizontal => f.write_str("horizontal"),
            Plane::Vertical => f.write_str("vertical"),
        }
    }
}

/// Linear optics functions of one transverse plane at the analysis location.
///
/// `beta` and `eta` are in meters, `alpha` and `etap` are dimensionless.
/// Dispersion defaults to zero when omitted from a configuration file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaneTwiss {
    pub beta: f64,
    pub alpha: f64,
    #[serde(default)]
    pub eta: f64,
    #[serde(default)]
    pub etap: f64,
}

impl PlaneTwiss {
    #[must_use]
    pub const fn new(beta: f64, alpha: f64, eta: f64, etap: f64) -> Self {
        Self {
            beta,
            alpha,
            eta,
            etap,
        }
    }

    /// Creates plane optics from unit-aware quantities.
    #[must_use]
    pub fn from_quantities(beta: Length, alpha: Ratio, eta: Length, etap: Ratio) -> Self {
        Self::new(
            beta.get::<meter>(),
            alpha.get::<ratio>(),
            eta.get::<meter>(),
            etap.get::<ratio>(),
        )
    }

    /// Returns the Courant–Snyder gamma, `(1 + alpha^2) / beta`.
    #[must_use]
    pub fn gamma(&self) -> f64 {
        (1.0 + self.alpha * self.alpha) / self.beta
    }

    fn validate(&self, plane: Plane) -> Result<(), OpticsError> {
        StrictlyPositive::new(self.beta).map_err(|source| OpticsError::Beta {
            plane,
            value: self.beta,
            source,
        })?;

        let named = [
            ("beta", self.beta),
            ("alpha", self.alpha),
            ("eta", self.eta),
            ("etap", self.etap),
        ];
        match named.into_iter().find(|(_, value)| !value.is_finite()) {
            Some((name, _)) => Err(OpticsError::NotFinite { plane, name }),
            None => Ok(()),
        }
    }
}

/// Optics functions for both transverse planes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Twiss {
    pub x: PlaneTwiss,
    pub y: PlaneTwiss,
}

/// Errors returned when validating [`Twiss`] parameters.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[non_exhaustive]
pub enum OpticsError {
    #[error("{plane} beta must be strictly positive (beta={value})")]
    Beta {
        plane: Plane,
        value: f64,
        #[source]
        source: ConstraintError,
    },

    #[error("{plane} {name} is not finite")]
    NotFinite { plane: Plane, name: &'static str },
}

impl Twiss {
    #[must_use]
    pub const fn new(x: PlaneTwiss, y: PlaneTwiss) -> Self {
        Self { x, y }
    }

    /// Creates optics that are known to be usable for analysis.
    ///
    /// # Errors
    ///
    /// Returns [`OpticsError`] if either beta is not strictly positive or any
    /// parameter is not finite.
    pub fn checked(x: PlaneTwiss, y: PlaneTwiss) -> Result<Self, OpticsError> {
        let twiss = Self::new(x, y);
        twiss.validate()?;
        Ok(twiss)
    }

    /// Checks both planes.
    ///
    /// # Errors
    ///
    /// See [`Twiss::checked`].
    pub fn validate(&self) -> Result<(), OpticsError> {
        self.x.validate(Plane::Horizontal)?;
        self.y.validate(Plane::Vertical)
    }

    /// Returns the optics of `plane`.
    #[must_use]
    pub fn plane(&self, plane: Plane) -> &PlaneTwiss {
        match plane {
            Plane::Horizontal => &self.x,
            Plane::Vertical => &self.y,
        }
    }
}

/// Closed-orbit position (m) and angle (rad) in both planes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ClosedOrbit {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub xp: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub yp: f64,
}

impl ClosedOrbit {
    #[must_use]
    pub const fn new(x: f64, xp: f64, y: f64, yp: f64) -> Self {
        Self { x, xp, y, yp }
    }
}
