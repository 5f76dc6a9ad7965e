use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::config::SolverConfig;
use crate::error::OdcResult;
use crate::numeric::Scalar;
use super::curve::{haldane, haldane_diff, logit, reference_y0, x_0, CDPG, FHBF, K0, T0};
use super::measurement::Measurement;
use super::solver::{newton_raphson, Convergence, Solution};

/// Above this measured saturation the curve is not fitted through the point.
pub const SATURATION_FIT_LIMIT: f64 = 0.97;
/// Most likely adult p50 at standard conditions (kPa), the reference position.
pub const DEFAULT_P50_STANDARD: f64 = 3.578;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitRegime {
    /// sO2 ≤ 0.97 without p50(st): the curve passes through the measured point
    MeasuredPoint,
    /// p50(st) keyed in: the standard curve passes through (p50(st), 0.5)
    StandardP50,
    /// sO2 > 0.97 without p50(st): reference curve shifted by `ac` only
    NearSaturation,
}

/// Oxyhemoglobin dissociation curve fitted to one blood sample; `a = ac + a6`.
#[derive(Debug, Clone)]
pub struct CurveModel<S> {
    measurement: Measurement<S>,
    y0: S,
    ac: S,
    a6: S,
    a: S,
    regime: FitRegime,
    convergence: Convergence,
    config: SolverConfig,
}

impl<S: Scalar> CurveModel<S> {
    pub fn fit(measurement: Measurement<S>, config: &SolverConfig) -> OdcResult<Self> {
        config.validate()?;
        measurement.validate()?;

        let y0: S = reference_y0();
        let ac = physiological_shift(&measurement.ph, &measurement.pco2, &measurement.fmethb);
        let fractions = measurement.fractions();

        let (regime, a6, a, convergence) = match &measurement.p50_standard {
            Some(p50_standard) => {
                let half = S::from_f64(0.5);
                let p = fractions.correct_pressure(p50_standard, &half);
                let s = fractions.correct_saturation(&half);
                // Standard conditions zero out ac, so this solves for a6 directly
                let solution = solve_displacement(&p, &s, &S::from_f64(T0), &y0, config)
                    .check("p50(st) curve fit", config.strict_convergence)?;
                let a = solution.value.clone() + ac.clone();
                (FitRegime::StandardP50, solution.value, a, solution.convergence)
            }
            None if measurement.so2.nominal() <= SATURATION_FIT_LIMIT => {
                let p = fractions.correct_pressure(&measurement.po2, &measurement.so2);
                let s = fractions.correct_saturation(&measurement.so2);
                let solution = solve_displacement(&p, &s, &measurement.temperature, &y0, config)
                    .check("curve fit", config.strict_convergence)?;
                let a6 = solution.value.clone() - ac.clone();
                (FitRegime::MeasuredPoint, a6, solution.value, solution.convergence)
            }
            None => {
                warn!(
                    "sO2 {} above {} without p50(st); curve position approximated from pH, pCO2 and FMetHb",
                    measurement.so2.nominal(),
                    SATURATION_FIT_LIMIT
                );
                (
                    FitRegime::NearSaturation,
                    S::from_f64(0.0),
                    ac.clone(),
                    Convergence::Converged { iterations: 0 },
                )
            }
        };

        debug!(
            "ODC fitted ({:?}, {} iterations): ac = {:.5}, a6 = {:.5}, a = {:.5}",
            regime,
            convergence.iterations(),
            ac.nominal(),
            a6.nominal(),
            a.nominal()
        );

        Ok(Self {
            measurement,
            y0,
            ac,
            a6,
            a,
            regime,
            convergence,
            config: *config,
        })
    }

    /// Fit the standard curve, using [`DEFAULT_P50_STANDARD`] when no p50(st)
    /// was keyed in.
    pub fn fit_standard(measurement: Measurement<S>, config: &SolverConfig) -> OdcResult<Self> {
        let measurement = if measurement.p50_standard.is_some() {
            measurement
        } else {
            measurement.with_p50_standard(S::from_f64(DEFAULT_P50_STANDARD))
        };
        Self::fit(measurement, config)
    }

    pub fn measurement(&self) -> &Measurement<S> {
        &self.measurement
    }

    pub fn y0(&self) -> &S {
        &self.y0
    }

    pub fn ac(&self) -> &S {
        &self.ac
    }

    pub fn a6(&self) -> &S {
        &self.a6
    }

    pub fn a(&self) -> &S {
        &self.a
    }

    pub fn regime(&self) -> FitRegime {
        self.regime
    }

    pub fn convergence(&self) -> Convergence {
        self.convergence
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// No empirical `a6` was determined, or the fit did not converge.
    pub fn is_approximate(&self) -> bool {
        self.regime == FitRegime::NearSaturation || !self.convergence.is_converged()
    }
}

pub fn fit<S: Scalar>(measurement: Measurement<S>, config: &SolverConfig) -> OdcResult<CurveModel<S>> {
    CurveModel::fit(measurement, config)
}

/// `ac`: shift of the curve along `x` caused by pH, pCO2, FMetHb, FHbF and
/// 2,3-DPG, zero at standard conditions.
pub fn physiological_shift<S: Scalar>(ph: &S, pco2: &S, fmethb: &S) -> S {
    let bohr = (ph.clone() - 7.40) * -0.88;
    let co2 = (pco2.clone() / 5.33).ln() * 0.048;
    let met = fmethb.clone() * -0.70;
    let dpg = (0.06 - 0.02 * FHBF) * (CDPG - 5.0);
    let fetal = -0.25 * FHBF;
    bohr + co2 + met + (dpg + fetal)
}

/// Displacement `a` putting `(p, s)` on the curve. `a` moves both `x0` and the
/// tanh amplitude, hence `dy/da = tanh(k0·(x - x0)) - dy/dx`.
fn solve_displacement<S: Scalar>(
    p: &S,
    s: &S,
    temperature: &S,
    y0: &S,
    config: &SolverConfig,
) -> Solution<S> {
    let x_target = p.ln();
    let y_target = logit(s);

    newton_raphson(
        S::from_f64(0.0),
        &y_target,
        config.tolerance,
        config.max_iterations,
        None,
        |a: &S| {
            let x0 = x_0(a, temperature);
            let y = haldane(&x_target, &x0, y0, a);
            let slope = ((x_target.clone() - x0.clone()) * K0).tanh() - haldane_diff(&x_target, &x0, a);
            (y, slope)
        },
    )
}
