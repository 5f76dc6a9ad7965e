//! Measured values with first-order propagated uncertainty. Contributions are
//! tracked per error source, so `x - x` is exact.
//!
//! ```
//! use oxygen_status::numeric::Uncertain;
//!
//! let ph = Uncertain::new(7.40, 0.001);
//! let shift = (ph.clone() - 7.40) * -0.88;
//! assert!((shift.std_dev() - 0.00088).abs() < 1e-12);
//! assert_eq!((ph.clone() - ph).std_dev(), 0.0);
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};
use std::sync::atomic::{AtomicU64, Ordering};

use super::Scalar;

static NEXT_SOURCE: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, PartialEq)]
pub struct Uncertain {
    nominal: f64,
    components: BTreeMap<u64, f64>,
}

impl Uncertain {
    pub fn new(nominal: f64, std_dev: f64) -> Self {
        let mut components = BTreeMap::new();
        if std_dev != 0.0 {
            let source = NEXT_SOURCE.fetch_add(1, Ordering::Relaxed);
            components.insert(source, std_dev.abs());
        }
        Self { nominal, components }
    }

    pub fn exact(value: f64) -> Self {
        Self {
            nominal: value,
            components: BTreeMap::new(),
        }
    }

    pub fn nominal(&self) -> f64 {
        self.nominal
    }

    pub fn std_dev(&self) -> f64 {
        self.components.values().fold(0.0, |acc, c| acc + c * c).sqrt()
    }

    pub fn std_score(&self, value: f64) -> f64 {
        (value - self.nominal) / self.std_dev()
    }

    /// True when the nominal values differ by no more than the sum of both
    /// standard deviations.
    pub fn agrees_with(&self, other: &Uncertain) -> bool {
        (self.nominal - other.nominal).abs() <= self.std_dev() + other.std_dev()
    }

    /// Chain rule: d/dx[f(u)] = f'(u) · u'
    fn map(&self, nominal: f64, derivative: f64) -> Self {
        Self {
            nominal,
            components: self
                .components
                .iter()
                .map(|(&source, &c)| (source, c * derivative))
                .collect(),
        }
    }

    /// Linear combination of sensitivities: d[f(u, v)] = ∂f/∂u · du + ∂f/∂v · dv
    fn combine(&self, other: &Uncertain, nominal: f64, du: f64, dv: f64) -> Self {
        let mut components = self.map(nominal, du).components;
        for (&source, &c) in &other.components {
            *components.entry(source).or_insert(0.0) += c * dv;
        }
        Self { nominal, components }
    }
}

impl From<f64> for Uncertain {
    fn from(value: f64) -> Self {
        Self::exact(value)
    }
}

impl fmt::Display for Uncertain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+/-{}", self.nominal, self.std_dev())
    }
}

impl Add for Uncertain {
    type Output = Uncertain;

    fn add(self, rhs: Uncertain) -> Uncertain {
        self.combine(&rhs, self.nominal + rhs.nominal, 1.0, 1.0)
    }
}

impl Sub for Uncertain {
    type Output = Uncertain;

    fn sub(self, rhs: Uncertain) -> Uncertain {
        self.combine(&rhs, self.nominal - rhs.nominal, 1.0, -1.0)
    }
}

impl Mul for Uncertain {
    type Output = Uncertain;

    fn mul(self, rhs: Uncertain) -> Uncertain {
        self.combine(&rhs, self.nominal * rhs.nominal, rhs.nominal, self.nominal)
    }
}

impl Div for Uncertain {
    type Output = Uncertain;

    fn div(self, rhs: Uncertain) -> Uncertain {
        let quotient = self.nominal / rhs.nominal;
        self.combine(&rhs, quotient, 1.0 / rhs.nominal, -quotient / rhs.nominal)
    }
}

impl Neg for Uncertain {
    type Output = Uncertain;

    fn neg(self) -> Uncertain {
        self.map(-self.nominal, -1.0)
    }
}

impl Add<f64> for Uncertain {
    type Output = Uncertain;

    fn add(self, rhs: f64) -> Uncertain {
        self.map(self.nominal + rhs, 1.0)
    }
}

impl Sub<f64> for Uncertain {
    type Output = Uncertain;

    fn sub(self, rhs: f64) -> Uncertain {
        self.map(self.nominal - rhs, 1.0)
    }
}

impl Mul<f64> for Uncertain {
    type Output = Uncertain;

    fn mul(self, rhs: f64) -> Uncertain {
        self.map(self.nominal * rhs, rhs)
    }
}

impl Div<f64> for Uncertain {
    type Output = Uncertain;

    fn div(self, rhs: f64) -> Uncertain {
        self.map(self.nominal / rhs, 1.0 / rhs)
    }
}

impl Scalar for Uncertain {
    fn from_f64(value: f64) -> Self {
        Self::exact(value)
    }

    fn nominal(&self) -> f64 {
        self.nominal
    }

    fn ln(&self) -> Self {
        self.map(self.nominal.ln(), 1.0 / self.nominal)
    }

    fn exp(&self) -> Self {
        let e = self.nominal.exp();
        self.map(e, e)
    }

    fn tanh(&self) -> Self {
        let t = self.nominal.tanh();
        self.map(t, 1.0 - t * t)
    }

    fn log10(&self) -> Self {
        self.map(self.nominal.log10(), 1.0 / (self.nominal * std::f64::consts::LN_10))
    }

    fn abs(&self) -> Self {
        self.map(self.nominal.abs(), self.nominal.signum())
    }

    fn powi(&self, n: i32) -> Self {
        let derivative = f64::from(n) * self.nominal.powi(n - 1);
        self.map(self.nominal.powi(n), derivative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_independent_sources_add_in_quadrature() {
        let a = Uncertain::new(3.0, 0.3);
        let b = Uncertain::new(4.0, 0.4);
        let sum = a + b;
        assert_relative_eq!(sum.nominal(), 7.0);
        assert_relative_eq!(sum.std_dev(), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_correlated_sources_cancel() {
        let x = Uncertain::new(2.0, 0.1);
        let zero = x.clone() - x.clone();
        assert_eq!(zero.std_dev(), 0.0);

        let ratio = x.clone() / x;
        assert_relative_eq!(ratio.nominal(), 1.0);
        assert!(ratio.std_dev() < 1e-15);
    }

    #[test]
    fn test_product_and_quotient_propagation() {
        let a = Uncertain::new(10.0, 0.1);
        let b = Uncertain::new(5.0, 0.05);
        // Relative errors add in quadrature: 1% and 1%
        let product = a.clone() * b.clone();
        assert_relative_eq!(product.std_dev() / product.nominal(), 2.0_f64.sqrt() * 0.01, epsilon = 1e-12);
        let quotient = a / b;
        assert_relative_eq!(quotient.std_dev() / quotient.nominal(), 2.0_f64.sqrt() * 0.01, epsilon = 1e-12);
    }

    #[test]
    fn test_transcendental_derivatives() {
        let x = Uncertain::new(2.0, 0.01);
        assert_relative_eq!(Scalar::ln(&x).std_dev(), 0.005, epsilon = 1e-12);
        assert_relative_eq!(Scalar::exp(&x).std_dev(), 2.0_f64.exp() * 0.01, epsilon = 1e-12);
        let t = 2.0_f64.tanh();
        assert_relative_eq!(Scalar::tanh(&x).std_dev(), (1.0 - t * t) * 0.01, epsilon = 1e-12);
        assert_relative_eq!(Scalar::log10(&x).std_dev(), 0.01 / (2.0 * std::f64::consts::LN_10), epsilon = 1e-12);
        assert_relative_eq!(Scalar::powi(&x, 3).std_dev(), 12.0 * 0.01, epsilon = 1e-12);
        assert_relative_eq!(Scalar::abs(&-x).std_dev(), 0.01, epsilon = 1e-12);
    }

    #[test]
    fn test_mixed_f64_arithmetic() {
        let x = Uncertain::new(1.5, 0.2);
        let y = (x.clone() * 2.0 + 1.0 - 0.5) / 4.0;
        assert_relative_eq!(y.nominal(), 0.875);
        assert_relative_eq!(y.std_dev(), 0.1, epsilon = 1e-12);
    }

    #[test]
    fn test_agreement_and_std_score() {
        let expected = Uncertain::new(26.4, 0.1);
        let calculated = Uncertain::new(26.3, 0.05);
        assert!(expected.agrees_with(&calculated));
        assert!(!expected.agrees_with(&Uncertain::new(26.0, 0.1)));
        assert_relative_eq!(expected.std_score(26.6), 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_display() {
        assert_eq!(Uncertain::new(1.5, 0.25).to_string(), "1.5+/-0.25");
        assert_eq!(Uncertain::exact(2.0).to_string(), "2+/-0");
    }

    #[test]
    fn test_exact_value_has_positive_zero_std_dev() {
        let exact = Uncertain::exact(7.4);
        assert_eq!(exact.std_dev(), 0.0);
        assert!(exact.std_dev().is_sign_positive());
        assert!((exact.clone() * 2.0).std_dev().is_sign_positive());
    }
}
