//! # sensorknn Stream
//!
//! Everything between a raw sensor stream and the estimator:
//!
//! - [`VectorParser`] - delimited line to [`FeatureVector`](sensorknn_core::FeatureVector)
//! - [`LineSource`] / [`Lines`] - blocking line sources with timeouts
//! - [`EstimateSink`] - where estimates go
//! - [`load_dataset`] - reference datasets from JSON or CSV
//! - [`Pipeline`] - parse, estimate and forward, one line at a time
//!
//! ```text
//! LineSource ──> Lines ──> VectorParser ──> KnnEstimator ──> EstimateSink
//!                               │
//!                          (skip malformed)
//! ```

pub mod error;
pub mod parser;
pub mod source;
pub mod sink;
pub mod loader;
pub mod pipeline;

pub use error::{Error, Result};
pub use parser::{ParseError, ParserConfig, VectorParser};
pub use source::{LineEvent, LineSource, Lines, ReaderSource, ScriptedSource, TimedSource};
pub use sink::{EstimateSink, VecSink, WriterSink};
pub use loader::{load_csv, load_dataset};
pub use pipeline::{Estimates, LineOutcome, Pipeline, PipelineStats};
