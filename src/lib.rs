//! Oxygen status calculations for arterial blood gas analysis.
//!
//! Fits the oxyhemoglobin dissociation curve (ODC) of a blood sample from
//! measured sO2, pO2, pCO2, pH and dyshemoglobin fractions, then evaluates
//! pressures, saturations, p50 and the pO2 at body temperature on the fitted
//! curve. All computations are generic over [`numeric::Scalar`], so measured
//! uncertainty can be propagated with [`numeric::Uncertain`].
//!
//! ```
//! use oxygen_status::{CurveModel, Measurement, SolverConfig};
//!
//! let measurement = Measurement::new(0.453, 4.494, 9.150, 6.919)
//!     .with_temperature(39.6)
//!     .with_fractions(0.016, 0.007);
//! let model = CurveModel::fit(measurement, &SolverConfig::default())?;
//! let po2 = model.po2_at_temperature(&7.632, &39.6)?;
//! assert!(po2.is_converged());
//! # Ok::<(), oxygen_status::OdcError>(())
//! ```

pub mod config;
pub mod error;
pub mod numeric;
pub mod odc;
pub mod units;

pub use config::SolverConfig;
pub use error::{OdcError, OdcResult};
pub use numeric::{Scalar, Uncertain};
pub use odc::{fit, Convergence, CurveModel, FitRegime, Measurement, Solution};
