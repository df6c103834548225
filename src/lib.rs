//! # sensorknn
//!
//! Streaming k-nearest-neighbour estimation for line-oriented sensor readings.
//!
//! Each incoming line such as `"AGS,0012,10,20,30,40,50,60\r\n"` is reduced to
//! its trailing six readings, compared against a static labeled reference
//! dataset, and turned into a distance-weighted estimate of the outcome.
//!
//! ## Quick Start
//!
//! ### As a CLI
//!
//! ```bash
//! sensorknn --reference directions.csv --input readings.log -k 5
//! some-device | sensorknn --reference directions.json --timeout-secs 10
//! ```
//!
//! ### As a Library
//!
//! ```rust
//! use sensorknn::prelude::*;
//!
//! let mut dataset = ReferenceDataset::with_dimension(6);
//! dataset.insert(FeatureVector::new(vec![0.0; 6]), 10.0).unwrap();
//! dataset.insert(FeatureVector::new(vec![10.0; 6]), 20.0).unwrap();
//!
//! let estimator = KnnEstimator::new(dataset, EstimatorConfig::with_k(2)).unwrap();
//! let mut pipeline = Pipeline::new(VectorParser::default(), estimator).unwrap();
//!
//! let mut sink = VecSink::new();
//! let lines = vec![Ok("1,1,1,1,1,1,1\r\n".to_string()), Ok("1,2\r\n".to_string())];
//! let stats = pipeline.run(lines, &mut sink).unwrap();
//!
//! assert_eq!(stats.estimates, 1);
//! assert_eq!(stats.skipped, 1);
//! ```
//!
//! ## Crate Structure
//!
//! - `sensorknn-core` - Feature vectors, reference datasets, distance metrics, kNN estimator
//! - `sensorknn-stream` - Line parser, line sources, sinks, dataset loader, pipeline

// Re-export core types
pub use sensorknn_core::{
    knn_estimate, DatasetConfig, Error, Estimate, EstimatorConfig, FeatureVector, KnnEstimator,
    Metric, Neighbor, ReferenceDataset, ReferenceItem, Result, Weighting,
};

// Re-export stream types
pub use sensorknn_stream::{
    load_dataset, EstimateSink, LineEvent, LineSource, Lines, ParseError, ParserConfig, Pipeline,
    PipelineStats, ReaderSource, TimedSource, VecSink, VectorParser, WriterSink,
};

/// Stream-level error type (I/O, CSV, dataset format)
pub use sensorknn_stream::Error as StreamError;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        EstimateSink, EstimatorConfig, FeatureVector, KnnEstimator, LineSource, Lines, Metric,
        Pipeline, ReferenceDataset, ReferenceItem, VecSink, VectorParser, Weighting, WriterSink,
    };
}

/// Distance kernels
pub mod distance {
    pub use sensorknn_core::distance::{chebyshev, euclidean, manhattan, squared_euclidean};
}
