use log::{trace, warn};
use serde::{Deserialize, Serialize};

use crate::error::{OdcError, OdcResult};
use crate::numeric::Scalar;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Convergence {
    Converged { iterations: usize },
    /// Iteration cap reached or the iterate left the domain; the value is the
    /// last usable iterate.
    Unconverged { iterations: usize },
}

impl Convergence {
    pub fn is_converged(&self) -> bool {
        matches!(self, Convergence::Converged { .. })
    }

    pub fn iterations(&self) -> usize {
        match *self {
            Convergence::Converged { iterations } | Convergence::Unconverged { iterations } => iterations,
        }
    }
}

/// Result of a bounded iterative solve.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution<S> {
    pub value: S,
    /// `|target - f(value)|` at the returned value
    pub residual: f64,
    pub convergence: Convergence,
}

impl<S> Solution<S> {
    pub fn is_converged(&self) -> bool {
        self.convergence.is_converged()
    }

    pub fn map<T, F: FnOnce(S) -> T>(self, f: F) -> Solution<T> {
        Solution {
            value: f(self.value),
            residual: self.residual,
            convergence: self.convergence,
        }
    }

    /// Under a strict policy an unconverged solve becomes an error.
    pub fn check(self, operation: &'static str, strict: bool) -> OdcResult<Self> {
        match self.convergence {
            Convergence::Unconverged { iterations } if strict => Err(OdcError::NonConvergence {
                operation,
                iterations,
                residual: self.residual,
            }),
            _ => Ok(self),
        }
    }
}

/// Newton-Raphson iteration for `f(x) = target`.
///
/// `evaluate` returns `(f(x), f'(x))`; the update is
/// `x ← x + (target - f(x)) / f'(x)`, clamped to `|Δx| ≤ max_step` when a step
/// limit is given. Stops once `|target - f(x)| < tolerance` or after
/// `max_iterations` updates, and never returns a non-finite iterate: if an
/// update leaves the domain the previous iterate is reported unconverged.
pub fn newton_raphson<S, F>(
    start: S,
    target: &S,
    tolerance: f64,
    max_iterations: usize,
    max_step: Option<f64>,
    mut evaluate: F,
) -> Solution<S>
where
    S: Scalar,
    F: FnMut(&S) -> (S, S),
{
    let mut x = start;
    let mut iterations = 0;

    loop {
        let (fx, slope) = evaluate(&x);
        let step = target.clone() - fx;
        let residual = step.abs().nominal();

        trace!("newton iteration {}: x = {:?}, residual = {:e}", iterations, x.nominal(), residual);

        if step.within(tolerance) {
            return Solution {
                value: x,
                residual,
                convergence: Convergence::Converged { iterations },
            };
        }

        if iterations >= max_iterations || !residual.is_finite() {
            warn!(
                "Newton-Raphson stopped after {} iterations with residual {:e}",
                iterations, residual
            );
            return Solution {
                value: x,
                residual,
                convergence: Convergence::Unconverged { iterations },
            };
        }

        let mut delta = step / slope;
        if let Some(limit) = max_step {
            let size = delta.abs().nominal();
            if size > limit {
                delta = delta * (limit / size);
            }
        }

        let next = x.clone() + delta;
        if !next.is_finite() {
            warn!("Newton-Raphson step left the domain at iteration {}", iterations);
            return Solution {
                value: x,
                residual,
                convergence: Convergence::Unconverged { iterations },
            };
        }

        x = next;
        iterations += 1;
    }
}
