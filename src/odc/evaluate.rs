use log::debug;

use crate::error::OdcResult;
use crate::numeric::Scalar;
use super::curve::{haldane, haldane_diff, logistic, logit, x_0, T0};
use super::fit::CurveModel;
use super::measurement::{validate_pressure, validate_saturation};
use super::solver::{newton_raphson, Solution};

impl<S: Scalar> CurveModel<S> {
    /// Oxygen pressure (kPa) at saturation `so2` on the curve displaced by `a`
    /// at `temperature`. No hemoglobin fraction correction is applied.
    pub fn pressure_from_saturation(&self, so2: &S, a: &S, temperature: &S) -> OdcResult<Solution<S>> {
        validate_saturation("Saturation", so2)?;

        let y = logit(so2);
        let x0 = x_0(a, temperature);
        let config = self.config();

        let solution = newton_raphson(x0.clone(), &y, config.tolerance, config.max_iterations, None, |x: &S| {
            (haldane(x, &x0, self.y0(), a), haldane_diff(x, &x0, a))
        })
        .check("pressure from saturation", config.strict_convergence)?;

        Ok(solution.map(|x| x.exp()))
    }

    /// Saturation at pressure `po2` (kPa), closed form. No hemoglobin fraction
    /// correction is applied.
    pub fn saturation_from_pressure(&self, po2: &S, a: &S, temperature: &S) -> OdcResult<S> {
        validate_pressure("Pressure", po2)?;

        let x0 = x_0(a, temperature);
        let y = haldane(&po2.ln(), &x0, self.y0(), a);
        Ok(logistic(&y))
    }

    /// p50 of the patient curve at 37 °C, in the measured hemoglobin space.
    pub fn p50(&self) -> OdcResult<Solution<S>> {
        let fractions = self.measurement().fractions();
        let half = S::from_f64(0.5);
        let s = fractions.correct_saturation(&half);

        let solution = self.pressure_from_saturation(&s, self.a(), &S::from_f64(T0))?;
        let p50 = solution.map(|p| fractions.uncorrect_pressure(&p, &half));

        debug!("p50 = {:.4} kPa", p50.value.nominal());
        Ok(p50)
    }

    /// p50 at standard conditions, where `ac` vanishes and only `a6` remains.
    pub fn p50_standard(&self) -> OdcResult<Solution<S>> {
        let solution = self.pressure_from_saturation(&S::from_f64(0.5), self.a6(), &S::from_f64(T0))?;

        debug!("p50(st) = {:.4} kPa", solution.value.nominal());
        Ok(solution)
    }
}
