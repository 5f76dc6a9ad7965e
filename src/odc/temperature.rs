//! pO2 at body temperature: the pressure whose oxygen content on the
//! temperature-shifted curve equals the content measured at 37 °C.

use log::debug;

use crate::error::{OdcError, OdcResult};
use crate::numeric::Scalar;
use super::curve::{haldane, haldane_diff, logistic, x_0, HbFractions, T0};
use super::fit::CurveModel;
use super::measurement::{validate_range, TEMPERATURE_RANGE};
use super::solver::{newton_raphson, Solution};

/// Initial pressure guess for the content solve (kPa)
const START_PRESSURE: f64 = 3.0;
/// Largest change of ln(pO2) per iteration
const MAX_LOG_STEP: f64 = 1.0;
const PH_DISPLACEMENT: f64 = 1.04;

/// Oxygen solubility coefficient α(T) in mmol/L/kPa.
pub fn oxygen_solubility<S: Scalar>(temperature: &S) -> S {
    let dt = temperature.clone() - T0;
    (dt.clone() * -0.0115 + dt.powi(2) * 2.1e-4).exp() * 9.83e-3
}

/// `dpH/dT` of blood at the given pH (per °C).
pub fn ph_temperature_coefficient<S: Scalar>(ph: &S) -> S {
    (ph.clone() - 7.40) * -0.0065 - 0.0146
}

/// Oxygen content state of one curve point.
struct ContentPoint<S> {
    content: S,
    /// Saturation on the reference curve, before hemoglobin fraction correction
    curve_saturation: S,
    /// Pressure in the measured hemoglobin space
    po2: S,
}

impl<S: Scalar> CurveModel<S> {
    /// pO2 (kPa) of the sample at body temperature `temperature`, given the
    /// hemoglobin concentration `cthb` (mmol/L).
    ///
    /// The result is in the measured hemoglobin space; an unconverged solve
    /// reports the best iterate with `Convergence::Unconverged`.
    pub fn po2_at_temperature(&self, cthb: &S, temperature: &S) -> OdcResult<Solution<S>> {
        validate_range("Temperature", temperature, TEMPERATURE_RANGE)?;
        if !cthb.is_finite() || cthb.nominal() <= 0.0 {
            return Err(OdcError::InvalidInput(
                format!("ctHb must be positive, got {} mmol/L", cthb.nominal())
            ));
        }

        let measurement = self.measurement();
        let fractions = measurement.fractions();
        let config = self.config();

        let dph_dt = ph_temperature_coefficient(&measurement.ph);
        let displacement = self.a().clone() - dph_dt * PH_DISPLACEMENT * (temperature.clone() - T0);

        let reference_temperature = S::from_f64(T0);
        let p37 = fractions.correct_pressure(&measurement.po2, &measurement.so2);
        let t37 = self.content_at(cthb, &fractions, &p37, self.a(), &reference_temperature).content;

        // Iterate on ln(P) with bounded steps so the pressure stays positive
        let alpha = oxygen_solubility(temperature);
        let x0 = x_0(&displacement, temperature);
        let solution = newton_raphson(
            S::from_f64(START_PRESSURE.ln()),
            &t37,
            config.tolerance,
            config.temperature_max_iterations,
            Some(MAX_LOG_STEP),
            |x: &S| {
                let p = x.exp();
                let point = self.content_at(cthb, &fractions, &p, &displacement, temperature);
                let n = haldane_diff(x, &x0, &displacement);
                let s = point.curve_saturation;
                // d(content)/d(ln P) = α·P + ctHb(1 - FMetHb)·S(1 - S)·n
                let slope = alpha.clone() * p
                    + cthb.clone() * (S::from_f64(1.0) - fractions.fmethb.clone()) * s.clone()
                        * (S::from_f64(1.0) - s) * n;
                (point.content, slope)
            },
        )
        .check("pO2 temperature extrapolation", config.strict_convergence)?;

        let po2 = self
            .content_at(cthb, &fractions, &solution.value.exp(), &displacement, temperature)
            .po2;

        debug!(
            "pO2({:.1} °C) = {:.4} kPa after {} iterations",
            temperature.nominal(),
            po2.nominal(),
            solution.convergence.iterations()
        );

        Ok(solution.map(|_| po2))
    }

    /// Total oxygen content (mmol/L) at corrected pressure `p` on the curve
    /// displaced by `a` at `temperature`.
    fn content_at(
        &self,
        cthb: &S,
        fractions: &HbFractions<S>,
        p: &S,
        a: &S,
        temperature: &S,
    ) -> ContentPoint<S> {
        let x0 = x_0(a, temperature);
        let y = haldane(&p.ln(), &x0, self.y0(), a);
        let curve_saturation = logistic(&y);

        let so2 = fractions.uncorrect_saturation(&curve_saturation);
        let po2 = fractions.uncorrect_pressure(p, &so2);
        let content = cthb.clone() * fractions.effective() * so2 + oxygen_solubility(temperature) * po2.clone();

        ContentPoint {
            content,
            curve_saturation,
            po2,
        }
    }
}
