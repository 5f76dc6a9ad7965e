use thiserror::Error;

#[derive(Error, Debug)]
pub enum OdcError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{operation} did not converge after {iterations} iterations (residual {residual:e})")]
    NonConvergence {
        operation: &'static str,
        iterations: usize,
        residual: f64,
    },

    #[error("Solver configuration error: {0}")]
    Validation(String),
}

pub type OdcResult<T> = Result<T, OdcError>;
