//! Distance-weighted k-nearest-neighbour regression
//!
//! For a query vector the estimator ranks every reference item by distance,
//! keeps the `k` closest and returns the weighted mean of their outcomes.
//!
//! Ranking uses a stable sort, so items at equal distance are taken in
//! dataset order and repeated calls always select the same neighbours.
//!
//! Exact matches (distance `0.0`) dominate: when any of the selected
//! neighbours is an exact match, only exact matches contribute and each of
//! them gets the same weight. A single exact match therefore returns its
//! outcome unchanged.

use serde::{Deserialize, Serialize};
use crate::{Error, FeatureVector, Metric, ReferenceDataset, Result, Weighting};

pub const DEFAULT_K: usize = 5;

/// Estimator parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EstimatorConfig {
    pub k: usize,
    #[serde(default)]
    pub metric: Metric,
    #[serde(default)]
    pub weighting: Weighting,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            k: DEFAULT_K,
            metric: Metric::default(),
            weighting: Weighting::default(),
        }
    }
}

impl EstimatorConfig {
    pub fn with_k(k: usize) -> Self {
        Self {
            k,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.k == 0 {
            return Err(Error::InvalidConfig("k must be at least 1".to_string()));
        }
        self.weighting.validate().map_err(Error::InvalidConfig)
    }
}

/// One selected neighbour
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Position of the item in the reference dataset
    pub index: usize,
    pub distance: f64,
    /// Effective weight used for aggregation
    pub weight: f64,
    pub outcome: f64,
}

/// Result of one estimation call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimate {
    pub value: f64,
    /// Number of neighbours that were considered
    pub neighbors: usize,
}

impl std::fmt::Display for Estimate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match f.precision() {
            Some(p) => write!(f, "{:.*}", p, self.value),
            None => write!(f, "{}", self.value),
        }
    }
}

/// kNN estimator over an owned, immutable reference dataset
#[derive(Debug, Clone)]
pub struct KnnEstimator {
    dataset: ReferenceDataset,
    config: EstimatorConfig,
}

impl KnnEstimator {
    pub fn new(dataset: ReferenceDataset, config: EstimatorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { dataset, config })
    }

    pub fn dataset(&self) -> &ReferenceDataset {
        &self.dataset
    }

    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    /// The `min(k, len)` closest items, nearest first, with their weights
    pub fn neighbors(&self, query: &FeatureVector) -> Result<Vec<Neighbor>> {
        find_neighbors(&self.dataset, query, &self.config)
    }

    /// Weighted mean of the neighbour outcomes
    pub fn estimate(&self, query: &FeatureVector) -> Result<Estimate> {
        let neighbors = self.neighbors(query)?;
        Ok(Estimate {
            value: aggregate(&neighbors),
            neighbors: neighbors.len(),
        })
    }
}

fn check_query(dataset: &ReferenceDataset, query: &FeatureVector) -> Result<()> {
    if dataset.is_empty() {
        return Err(Error::EmptyDataset);
    }
    if query.dim() != dataset.vector_dim() {
        return Err(Error::DimensionMismatch {
            expected: dataset.vector_dim(),
            actual: query.dim(),
        });
    }
    if query.iter().any(|v| !v.is_finite()) {
        return Err(Error::InvalidQuery(format!(
            "query {} contains a non-finite value",
            query
        )));
    }
    Ok(())
}

fn find_neighbors(
    dataset: &ReferenceDataset,
    query: &FeatureVector,
    config: &EstimatorConfig,
) -> Result<Vec<Neighbor>> {
    check_query(dataset, query)?;

    let metric = config.metric;
    let mut ranked: Vec<(usize, f64)> = dataset
        .iter()
        .enumerate()
        .map(|(i, item)| (i, metric.distance(query.as_slice(), item.vector.as_slice())))
        .collect();

    // sort_by is stable: ties keep dataset order
    ranked.sort_by(|a, b| a.1.total_cmp(&b.1));
    ranked.truncate(config.k);

    let has_exact = ranked.iter().any(|&(_, d)| d == 0.0);

    let neighbors = ranked
        .into_iter()
        .map(|(index, distance)| {
            let weight = if has_exact {
                if distance == 0.0 { 1.0 } else { 0.0 }
            } else {
                config.weighting.weight(distance)
            };
            Neighbor {
                index,
                distance,
                weight,
                outcome: dataset.items()[index].outcome,
            }
        })
        .collect();

    Ok(neighbors)
}

/// Weighted mean, clamped to the neighbour outcome range.
/// Falls back to the plain mean when the weights underflow to zero.
fn aggregate(neighbors: &[Neighbor]) -> f64 {
    let (lo, hi) = neighbors
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), n| {
            (lo.min(n.outcome), hi.max(n.outcome))
        });

    let total_weight: f64 = neighbors.iter().map(|n| n.weight).sum();
    let value = if total_weight > 0.0 && total_weight.is_finite() {
        neighbors.iter().map(|n| n.weight * n.outcome).sum::<f64>() / total_weight
    } else {
        neighbors.iter().map(|n| n.outcome).sum::<f64>() / neighbors.len() as f64
    };

    value.clamp(lo, hi)
}

/// Estimate with the default metric and weighting, borrowing the dataset
pub fn knn_estimate(dataset: &ReferenceDataset, query: &FeatureVector, k: usize) -> Result<f64> {
    let config = EstimatorConfig::with_k(k);
    config.validate()?;
    let neighbors = find_neighbors(dataset, query, &config)?;
    Ok(aggregate(&neighbors))
}
