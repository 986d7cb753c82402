use std::cmp::Ordering;

use num_traits::Zero;

use crate::constraint::{Constrained, Constraint, ConstraintError};

/// Marker type enforcing that a value is strictly greater than zero.
///
/// Beta functions and rest masses appear in denominators and square roots,
/// so they are carried as `Constrained<f64, StrictlyPositive>` on the
/// validated configuration paths.
///
/// # Examples
///
/// ```
/// use betatune_core::constraint::{ConstraintError, StrictlyPositive};
///
/// let beta = StrictlyPositive::new(8.2).unwrap();
/// assert_eq!(beta.into_inner(), 8.2);
///
/// assert_eq!(StrictlyPositive::new(0.0).unwrap_err(), ConstraintError::Zero);
/// assert_eq!(StrictlyPositive::new(-1.0).unwrap_err(), ConstraintError::Negative);
/// assert_eq!(StrictlyPositive::new(f64::NAN).unwrap_err(), ConstraintError::NotANumber);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct StrictlyPositive;

impl StrictlyPositive {
    /// Constructs `Constrained<T, StrictlyPositive>` if `value > 0`.
    ///
    /// # Errors
    ///
    /// - [`ConstraintError::Zero`] if the value equals zero.
    /// - [`ConstraintError::Negative`] if the value is below zero.
    /// - [`ConstraintError::NotANumber`] if comparison is undefined (e.g., NaN).
    pub fn new<T: PartialOrd + Zero>(
        value: T,
    ) -> Result<Constrained<T, StrictlyPositive>, ConstraintError> {
        Constrained::<T, StrictlyPositive>::new(value)
    }
}

impl<T: PartialOrd + Zero> Constraint<T> for StrictlyPositive {
    fn validate(value: &T) -> Result<(), ConstraintError> {
        match value.partial_cmp(&T::zero()) {
            Some(Ordering::Greater) => Ok(()),
            Some(Ordering::Equal) => Err(ConstraintError::Zero),
            Some(Ordering::Less) => Err(ConstraintError::Negative),
            None => Err(ConstraintError::NotANumber),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use uom::si::{f64::Length, length::meter};

    #[test]
    fn positive_floats_pass() {
        assert!(StrictlyPositive::new(1e-12).is_ok());
        assert!(StrictlyPositive::new(f64::INFINITY).is_ok());
    }

    #[test]
    fn zero_and_negative_are_rejected() {
        assert_eq!(StrictlyPositive::new(0.0).unwrap_err(), ConstraintError::Zero);
        assert_eq!(StrictlyPositive::new(-0.0).unwrap_err(), ConstraintError::Zero);
        assert_eq!(
            StrictlyPositive::new(-3.0).unwrap_err(),
            ConstraintError::Negative
        );
    }

    #[test]
    fn uom_lengths_are_supported() {
        assert!(StrictlyPositive::new(Length::new::<meter>(10.0)).is_ok());
        assert!(StrictlyPositive::new(Length::new::<meter>(0.0)).is_err());
    }
}
