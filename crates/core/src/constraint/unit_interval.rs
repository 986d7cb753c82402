use std::cmp::Ordering;

use num_traits::{One, Zero};

use crate::constraint::{Constrained, Constraint, ConstraintError};

/// Marker type enforcing that a value lies in `[0, 1)`.
///
/// Fractional tunes are reported in this interval: an integer number of
/// oscillations per step is indistinguishable from zero.
///
/// ```
/// use betatune_core::constraint::UnitIntervalRightOpen;
///
/// let tune = UnitIntervalRightOpen::new(0.31).unwrap();
/// assert_eq!(tune.into_inner(), 0.31);
///
/// assert!(UnitIntervalRightOpen::new(1.0).is_err());
/// assert!(UnitIntervalRightOpen::new(f64::NAN).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct UnitIntervalRightOpen;

impl UnitIntervalRightOpen {
    /// Checks that `0 <= value < 1`.
    ///
    /// # Errors
    ///
    /// [`ConstraintError::BelowMinimum`] below zero, [`ConstraintError::AboveMaximum`]
    /// at one or above, and [`ConstraintError::NotANumber`] for NaN.
    pub fn new<T: PartialOrd + Zero + One>(
        value: T,
    ) -> Result<Constrained<T, UnitIntervalRightOpen>, ConstraintError> {
        Constrained::<T, UnitIntervalRightOpen>::new(value)
    }
}

impl<T: PartialOrd + Zero + One> Constraint<T> for UnitIntervalRightOpen {
    fn validate(value: &T) -> Result<(), ConstraintError> {
        let lower = value.partial_cmp(&T::zero());
        let upper = value.partial_cmp(&T::one());
        match lower.zip(upper) {
            None => Err(ConstraintError::NotANumber),
            Some((Ordering::Less, _)) => Err(ConstraintError::BelowMinimum),
            Some((_, Ordering::Less)) => Ok(()),
            Some(_) => Err(ConstraintError::AboveMaximum),
        }
    }
}
