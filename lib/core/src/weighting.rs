//! Distance-to-weight conversion for neighbour aggregation
//!
//! Every scheme maps a non-negative distance to a non-negative weight that
//! never increases with distance. Exact matches (distance `0.0`) are handled
//! by the estimator before any of these are consulted.

use serde::{Deserialize, Serialize};

pub const DEFAULT_EPSILON: f64 = 1e-9;
pub const DEFAULT_SIGMA: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Weighting {
    /// `1 / (d + epsilon)`
    Inverse { epsilon: f64 },
    /// `exp(-d² / (2σ²))`
    Gaussian { sigma: f64 },
    /// Plain average of the neighbours
    Uniform,
}

impl Default for Weighting {
    fn default() -> Self {
        Weighting::Inverse {
            epsilon: DEFAULT_EPSILON,
        }
    }
}

impl Weighting {
    #[inline]
    pub fn weight(&self, distance: f64) -> f64 {
        match *self {
            Weighting::Inverse { epsilon } => 1.0 / (distance + epsilon),
            Weighting::Gaussian { sigma } => {
                (-(distance * distance) / (2.0 * sigma * sigma)).exp()
            }
            Weighting::Uniform => 1.0,
        }
    }

    /// Reject parameters that would produce negative, infinite or NaN weights
    pub fn validate(&self) -> Result<(), String> {
        match *self {
            Weighting::Inverse { epsilon } if !(epsilon > 0.0 && epsilon.is_finite()) => {
                Err(format!("epsilon must be positive and finite, got {}", epsilon))
            }
            Weighting::Gaussian { sigma } if !(sigma > 0.0 && sigma.is_finite()) => {
                Err(format!("sigma must be positive and finite, got {}", sigma))
            }
            _ => Ok(()),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Weighting::Inverse { .. } => "inverse",
            Weighting::Gaussian { .. } => "gaussian",
            Weighting::Uniform => "uniform",
        }
    }
}
