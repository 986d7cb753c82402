//! Numeric constraints checked once at construction.
//!
//! Optics and reference-particle inputs carry physical invariants: beta
//! functions, rest masses and reference kinetic energies must be strictly
//! positive, and a fractional tune lives in `[0, 1)`.
//! Wrapping a value in [`Constrained<T, C>`] records that the check has passed,
//! so downstream code can rely on it without re-validating.
//!
//! # Provided Constraints
//!
//! - [`StrictlyPositive`]: Greater than zero
//! - [`UnitIntervalRightOpen`]: In `[0, 1)`
//!
//! Custom invariants are added by implementing [`Constraint<T>`] for a
//! zero-sized marker type.

mod strictly_positive;
mod unit_interval;

use std::marker::PhantomData;

use thiserror::Error;

pub use strictly_positive::StrictlyPositive;
pub use unit_interval::UnitIntervalRightOpen;

/// A predicate a value must satisfy before it is wrapped in [`Constrained`].
///
/// Implementors are zero-sized markers; the check runs once, at construction.
pub trait Constraint<T> {
    /// Validates `value` against this constraint.
    ///
    /// # Errors
    ///
    /// Returns the [`ConstraintError`] describing the first violation found.
    fn validate(value: &T) -> Result<(), ConstraintError>;
}

/// Why a value was refused by a [`Constraint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ConstraintError {
    #[error("expected a non-negative value")]
    Negative,
    #[error("expected a nonzero value")]
    Zero,
    #[error("value cannot be ordered (NaN)")]
    NotANumber,
    #[error("value lies below the lower bound")]
    BelowMinimum,
    #[error("value lies at or above the upper bound")]
    AboveMaximum,
}

/// A value known to satisfy `C`.
///
/// ```
/// use betatune_core::constraint::{Constrained, StrictlyPositive};
///
/// let beta = Constrained::<f64, StrictlyPositive>::new(12.5).unwrap();
/// assert_eq!(beta.into_inner(), 12.5);
///
/// assert!(Constrained::<f64, StrictlyPositive>::new(0.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Constrained<T, C: Constraint<T>> {
    value: T,
    constraint: PhantomData<C>,
}

impl<T, C: Constraint<T>> Constrained<T, C> {
    /// Wraps `value` once it passes `C`.
    ///
    /// # Errors
    ///
    /// Returns the violation reported by `C`.
    pub fn new(value: T) -> Result<Self, ConstraintError> {
        C::validate(&value).map(|()| Self {
            value,
            constraint: PhantomData,
        })
    }

    /// Unwraps the checked value.
    #[must_use]
    pub fn into_inner(self) -> T {
        self.value
    }
}
