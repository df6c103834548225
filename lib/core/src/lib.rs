//! # sensorknn Core
//!
//! Core library for sensorknn.
//!
//! This crate provides the data model and the estimation algorithm:
//!
//! - [`FeatureVector`] - Fixed-length numeric reading
//! - [`ReferenceItem`] - A vector with a known outcome
//! - [`ReferenceDataset`] - Ordered, dimension-checked set of reference items
//! - [`KnnEstimator`] - Distance-weighted k-nearest-neighbour regression
//!
//! ## Example
//!
//! ```rust
//! use sensorknn_core::{EstimatorConfig, FeatureVector, KnnEstimator, ReferenceDataset};
//!
//! let mut dataset = ReferenceDataset::with_dimension(6);
//! dataset.insert(FeatureVector::new(vec![0.0; 6]), 10.0).unwrap();
//! dataset.insert(FeatureVector::new(vec![10.0; 6]), 20.0).unwrap();
//!
//! let estimator = KnnEstimator::new(dataset, EstimatorConfig::with_k(2)).unwrap();
//! let estimate = estimator.estimate(&FeatureVector::new(vec![1.0; 6])).unwrap();
//! assert!(estimate.value < 15.0);
//! ```

pub mod vector;
pub mod error;
pub mod item;
pub mod dataset;
pub mod weighting;
pub mod estimator;

/// Distance kernels and the [`Metric`] selector
pub mod distance;

pub use vector::FeatureVector;
pub use error::{Error, Result};
pub use item::ReferenceItem;
pub use dataset::{DatasetConfig, ReferenceDataset};
pub use distance::Metric;
pub use weighting::Weighting;
pub use estimator::{knn_estimate, Estimate, EstimatorConfig, KnnEstimator, Neighbor, DEFAULT_K};
