//! Reference curve in `x = ln(pO2)`, `y = ln(s / (1 - s))` coordinates:
//!
//! ```text
//! y = y0 + (x - x0) + h·tanh(k0·(x - x0)),   h = h0 + a
//! x0 = ln(p00) + a + 0.055·(T - T0)
//! ```

use crate::numeric::Scalar;

// Reference curve at standard conditions (pressures in kPa, temperatures in °C)
pub const K0: f64 = 0.5343;
pub const H0: f64 = 3.5;
pub const T0: f64 = 37.0;
pub const S0: f64 = 0.867;
pub const P00: f64 = 7.0;
pub const FHBF: f64 = 0.0;
pub const CDPG: f64 = 5.0;
pub const TEMPERATURE_SHIFT: f64 = 0.055;

pub fn reference_y0<S: Scalar>() -> S {
    logit(&S::from_f64(S0))
}

pub fn x_0<S: Scalar>(a: &S, temperature: &S) -> S {
    (temperature.clone() - T0) * TEMPERATURE_SHIFT + a.clone() + P00.ln()
}

pub fn haldane<S: Scalar>(x: &S, x0: &S, y0: &S, a: &S) -> S {
    let h = a.clone() + H0;
    let dx = x.clone() - x0.clone();
    y0.clone() + dx.clone() + h * (dx * K0).tanh()
}

/// Exact `dy/dx` of [`haldane`]. `y0` only shifts the curve, so it is not needed.
pub fn haldane_diff<S: Scalar>(x: &S, x0: &S, a: &S) -> S {
    let h = a.clone() + H0;
    let t = ((x.clone() - x0.clone()) * K0).tanh();
    h * K0 * (S::from_f64(1.0) - t.clone() * t) + 1.0
}

pub fn logit<S: Scalar>(s: &S) -> S {
    (s.clone() / (S::from_f64(1.0) - s.clone())).ln()
}

pub fn logistic<S: Scalar>(y: &S) -> S {
    S::from_f64(1.0) / ((-y.clone()).exp() + 1.0)
}

/// Carboxy- and methemoglobin fractions. Measured points are moved onto the
/// reference curve before fitting and moved back after evaluating.
#[derive(Debug, Clone, PartialEq)]
pub struct HbFractions<S> {
    pub fcohb: S,
    pub fmethb: S,
}

impl<S: Scalar> HbFractions<S> {
    pub fn new(fcohb: S, fmethb: S) -> Self {
        Self { fcohb, fmethb }
    }

    pub fn effective(&self) -> S {
        S::from_f64(1.0) - self.fcohb.clone() - self.fmethb.clone()
    }

    /// `S = (s·(1 - FCOHb - FMetHb) + FCOHb) / (1 - FMetHb)`
    pub fn correct_saturation(&self, s: &S) -> S {
        (s.clone() * self.effective() + self.fcohb.clone())
            / (S::from_f64(1.0) - self.fmethb.clone())
    }

    pub fn uncorrect_saturation(&self, corrected: &S) -> S {
        (corrected.clone() * (S::from_f64(1.0) - self.fmethb.clone()) - self.fcohb.clone())
            / self.effective()
    }

    /// `P = p + (p/s)·FCOHb / (1 - FCOHb - FMetHb)`
    pub fn correct_pressure(&self, p: &S, s: &S) -> S {
        p.clone() + p.clone() / s.clone() * self.fcohb.clone() / self.effective()
    }

    pub fn uncorrect_pressure(&self, corrected: &S, s: &S) -> S {
        corrected.clone() / (self.fcohb.clone() / (s.clone() * self.effective()) + 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn test_x0_reference_position() {
        assert_relative_eq!(x_0(&0.0, &37.0), 7.0_f64.ln());
        assert_relative_eq!(x_0(&0.2, &39.0), 7.0_f64.ln() + 0.2 + 0.11, epsilon = 1e-12);
    }

    #[test]
    fn test_haldane_passes_through_anchor() {
        let y0: f64 = reference_y0();
        let x0 = x_0(&0.0, &37.0);
        assert_relative_eq!(haldane(&x0, &x0, &y0, &0.0), y0);
        assert_relative_eq!(logistic(&haldane(&x0, &x0, &y0, &0.0)), S0, epsilon = 1e-12);
    }

    #[test]
    fn test_haldane_diff_matches_finite_difference() {
        let y0: f64 = reference_y0();
        let x0 = x_0(&0.1, &37.0);
        let a = 0.1;
        for &x in &[0.5, 1.2, 1.9, 2.6, 4.0] {
            let h = 1e-6;
            let numeric = (haldane(&(x + h), &x0, &y0, &a) - haldane(&(x - h), &x0, &y0, &a)) / (2.0 * h);
            assert_relative_eq!(haldane_diff(&x, &x0, &a), numeric, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_slope_bounds() {
        // Far from x0 the tanh saturates and the slope tends to 1
        assert_abs_diff_eq!(haldane_diff(&50.0, &0.0, &0.0), 1.0, epsilon = 1e-12);
        // At x0 the slope peaks at 1 + h0·k0, the reference Hill coefficient
        assert_relative_eq!(haldane_diff(&1.0, &1.0, &0.0), 1.0 + H0 * K0);
    }

    #[test]
    fn test_logit_logistic_inverse() {
        for &s in &[0.01, 0.25, 0.5, 0.867, 0.99] {
            assert_relative_eq!(logistic(&logit(&s)), s, epsilon = 1e-12);
        }
        assert_eq!(logit(&0.5), 0.0);
    }

    #[test]
    fn test_fraction_corrections_invert() {
        let fractions = HbFractions::new(0.016, 0.007);
        let s = 0.453;
        let p = 4.494;

        let corrected_s = fractions.correct_saturation(&s);
        assert!(corrected_s > s);
        assert_relative_eq!(fractions.uncorrect_saturation(&corrected_s), s, epsilon = 1e-12);

        let corrected_p = fractions.correct_pressure(&p, &s);
        assert!(corrected_p > p);
        assert_relative_eq!(fractions.uncorrect_pressure(&corrected_p, &s), p, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_fractions_are_identity() {
        let fractions = HbFractions::new(0.0, 0.0);
        assert_eq!(fractions.correct_saturation(&0.7), 0.7);
        assert_eq!(fractions.correct_pressure(&5.0, &0.7), 5.0);
    }
}
