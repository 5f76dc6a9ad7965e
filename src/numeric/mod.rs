//! Scalar arithmetic the curve solvers are written against.
//!
//! The curve equation, the root finder and every evaluator only ever see a
//! `Scalar`, so plain `f64` and the uncertainty-propagating [`Uncertain`]
//! value run through identical solver logic. Convergence and range checks are
//! made on the nominal value; no total order on the scalar itself is assumed.

pub mod uncertain;

pub use uncertain::Uncertain;

use std::fmt::Debug;
use std::ops::{Add, Div, Mul, Neg, Sub};

pub trait Scalar:
    Clone
    + Debug
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + Add<f64, Output = Self>
    + Sub<f64, Output = Self>
    + Mul<f64, Output = Self>
    + Div<f64, Output = Self>
{
    fn from_f64(value: f64) -> Self;

    /// Best estimate of the value, without any attached uncertainty.
    fn nominal(&self) -> f64;

    fn ln(&self) -> Self;
    fn exp(&self) -> Self;
    fn tanh(&self) -> Self;
    fn log10(&self) -> Self;
    fn abs(&self) -> Self;
    fn powi(&self, n: i32) -> Self;

    /// `|self| < tolerance`, judged on the nominal value.
    fn within(&self, tolerance: f64) -> bool {
        self.abs().nominal() < tolerance
    }

    fn is_finite(&self) -> bool {
        self.nominal().is_finite()
    }
}

impl Scalar for f64 {
    #[inline]
    fn from_f64(value: f64) -> Self {
        value
    }

    #[inline]
    fn nominal(&self) -> f64 {
        *self
    }

    #[inline]
    fn ln(&self) -> Self {
        f64::ln(*self)
    }

    #[inline]
    fn exp(&self) -> Self {
        f64::exp(*self)
    }

    #[inline]
    fn tanh(&self) -> Self {
        f64::tanh(*self)
    }

    #[inline]
    fn log10(&self) -> Self {
        f64::log10(*self)
    }

    #[inline]
    fn abs(&self) -> Self {
        f64::abs(*self)
    }

    #[inline]
    fn powi(&self, n: i32) -> Self {
        f64::powi(*self, n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn logit<S: Scalar>(s: S) -> S {
        (s.clone() / (S::from_f64(1.0) - s)).ln()
    }

    #[test]
    fn test_f64_scalar_matches_std() {
        assert_relative_eq!(Scalar::ln(&2.0_f64), 2.0_f64.ln());
        assert_relative_eq!(Scalar::tanh(&0.3_f64), 0.3_f64.tanh());
        assert_relative_eq!(Scalar::log10(&1000.0_f64), 3.0);
        assert_relative_eq!(Scalar::powi(&-1.5_f64, 2), 2.25);
        assert_eq!(Scalar::nominal(&-4.0_f64), -4.0);
    }

    #[test]
    fn test_generic_code_runs_on_f64() {
        assert_relative_eq!(logit(0.5_f64), 0.0);
        assert_relative_eq!(logit(0.867_f64), (0.867_f64 / 0.133).ln(), epsilon = 1e-12);
    }

    #[test]
    fn test_within_uses_magnitude() {
        assert!(Scalar::within(&-5e-5_f64, 1e-4));
        assert!(!Scalar::within(&-2e-4_f64, 1e-4));
        assert!(!Scalar::within(&f64::NAN, 1e-4));
    }
}
