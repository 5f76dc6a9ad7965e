use serde::{Deserialize, Serialize};
use std::path::Path;
use crate::error::{OdcError, OdcResult};

/// Residual bound used by every Newton-Raphson solve.
pub const DEFAULT_TOLERANCE: f64 = 1e-4;
pub const DEFAULT_MAX_ITERATIONS: usize = 100;
pub const DEFAULT_TEMPERATURE_MAX_ITERATIONS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub tolerance: f64,
    pub max_iterations: usize,               // Curve fit and pressure-from-saturation
    pub temperature_max_iterations: usize,   // pO2(T) content solve
    pub strict_convergence: bool,            // Unconverged solves become errors
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            temperature_max_iterations: DEFAULT_TEMPERATURE_MAX_ITERATIONS,
            strict_convergence: false,
        }
    }
}

impl SolverConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> OdcResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> OdcResult<Self> {
        let config: SolverConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn strict() -> Self {
        Self {
            strict_convergence: true,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> OdcResult<()> {
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(OdcError::Validation(
                format!("Tolerance must be positive and finite, got {}", self.tolerance)
            ));
        }

        if self.max_iterations == 0 {
            return Err(OdcError::Validation(
                "max_iterations must be at least 1".to_string()
            ));
        }

        if self.temperature_max_iterations == 0 {
            return Err(OdcError::Validation(
                "temperature_max_iterations must be at least 1".to_string()
            ));
        }

        Ok(())
    }
}
