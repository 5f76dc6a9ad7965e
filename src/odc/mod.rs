//! Oxyhemoglobin dissociation curve: fitting a patient-specific displacement
//! of the reference curve and evaluating the fitted curve.

pub mod curve;
pub mod evaluate;
pub mod fit;
pub mod measurement;
pub mod solver;
pub mod temperature;

pub use curve::HbFractions;
pub use fit::{fit, physiological_shift, CurveModel, FitRegime, DEFAULT_P50_STANDARD, SATURATION_FIT_LIMIT};
pub use measurement::Measurement;
pub use solver::{newton_raphson, Convergence, Solution};
pub use temperature::{oxygen_solubility, ph_temperature_coefficient};
