use serde::{Deserialize, Serialize};

use crate::error::{OdcError, OdcResult};
use crate::numeric::Scalar;
use super::curve::HbFractions;

pub const DEFAULT_TEMPERATURE: f64 = 37.0;
pub const DEFAULT_FCOHB: f64 = 0.004;
pub const DEFAULT_FMETHB: f64 = 0.004;

/// Plausible pH range for the correction terms
pub const PH_RANGE: (f64, f64) = (6.0, 8.0);
/// Body temperature range the temperature coefficients were derived for (°C)
pub const TEMPERATURE_RANGE: (f64, f64) = (10.0, 45.0);

/// Blood gas values a curve is fitted to.
///
/// Pressures in kPa, temperature in °C, saturation and hemoglobin fractions
/// as 0-1 ratios.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement<S> {
    pub so2: S,
    pub po2: S,
    pub pco2: S,
    pub ph: S,
    pub temperature: S,
    pub fcohb: S,
    pub fmethb: S,
    /// Keyed-in p50 at standard conditions
    pub p50_standard: Option<S>,
}

impl<S: Scalar> Measurement<S> {
    pub fn new(so2: S, po2: S, pco2: S, ph: S) -> Self {
        Self {
            so2,
            po2,
            pco2,
            ph,
            temperature: S::from_f64(DEFAULT_TEMPERATURE),
            fcohb: S::from_f64(DEFAULT_FCOHB),
            fmethb: S::from_f64(DEFAULT_FMETHB),
            p50_standard: None,
        }
    }

    pub fn with_temperature(mut self, temperature: S) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_fractions(mut self, fcohb: S, fmethb: S) -> Self {
        self.fcohb = fcohb;
        self.fmethb = fmethb;
        self
    }

    pub fn with_p50_standard(mut self, p50_standard: S) -> Self {
        self.p50_standard = Some(p50_standard);
        self
    }

    pub fn fractions(&self) -> HbFractions<S> {
        HbFractions::new(self.fcohb.clone(), self.fmethb.clone())
    }

    pub fn validate(&self) -> OdcResult<()> {
        validate_saturation("sO2", &self.so2)?;
        validate_pressure("pO2", &self.po2)?;
        validate_pressure("pCO2", &self.pco2)?;
        validate_range("pH", &self.ph, PH_RANGE)?;
        validate_range("Temperature", &self.temperature, TEMPERATURE_RANGE)?;
        validate_fractions(&self.fcohb, &self.fmethb)?;

        if let Some(p50) = &self.p50_standard {
            validate_pressure("p50(st)", p50)?;
        }

        Ok(())
    }
}

fn finite(name: &str, value: f64) -> OdcResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(OdcError::InvalidInput(format!("{} must be finite, got {}", name, value)))
    }
}

pub(crate) fn validate_saturation<S: Scalar>(name: &str, s: &S) -> OdcResult<()> {
    let value = finite(name, s.nominal())?;
    if value <= 0.0 || value >= 1.0 {
        return Err(OdcError::InvalidInput(
            format!("{} must lie strictly between 0 and 1, got {}", name, value)
        ));
    }
    Ok(())
}

pub(crate) fn validate_pressure<S: Scalar>(name: &str, p: &S) -> OdcResult<()> {
    let value = finite(name, p.nominal())?;
    if value <= 0.0 {
        return Err(OdcError::InvalidInput(
            format!("{} must be positive, got {} kPa", name, value)
        ));
    }
    Ok(())
}

pub(crate) fn validate_range<S: Scalar>(name: &str, v: &S, (lower, upper): (f64, f64)) -> OdcResult<()> {
    let value = finite(name, v.nominal())?;
    if value < lower || value > upper {
        return Err(OdcError::InvalidInput(
            format!("{} {} outside plausible range {}..={}", name, value, lower, upper)
        ));
    }
    Ok(())
}

/// Analyzers report slightly negative fractions for absent species, so small
/// negatives are accepted.
pub(crate) fn validate_fractions<S: Scalar>(fcohb: &S, fmethb: &S) -> OdcResult<()> {
    let co = finite("FCOHb", fcohb.nominal())?;
    let met = finite("FMetHb", fmethb.nominal())?;

    for (name, value) in [("FCOHb", co), ("FMetHb", met)] {
        if value <= -0.1 || value >= 1.0 {
            return Err(OdcError::InvalidInput(
                format!("{} fraction {} outside (-0.1, 1)", name, value)
            ));
        }
    }

    if co + met >= 1.0 {
        return Err(OdcError::InvalidInput(
            format!("FCOHb + FMetHb must be below 1, got {}", co + met)
        ));
    }

    Ok(())
}
