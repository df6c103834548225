//! Parse → estimate → sink, one line at a time
//!
//! [`Pipeline::process_line`] is the per-item transformation: it never
//! touches the source or the sink. [`Pipeline::estimates`] and
//! [`Pipeline::run`] drive it over a stream of lines.
//!
//! Malformed lines are counted and skipped. Estimator failures end the run
//! and are returned to the caller.

use crate::parser::{ParseError, VectorParser};
use crate::sink::EstimateSink;
use crate::{Error, Result};
use sensorknn_core::{Estimate, KnnEstimator};
use std::io;
use tracing::{debug, info};

/// Counters for one pipeline
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PipelineStats {
    pub lines: u64,
    pub skipped: u64,
    pub estimates: u64,
}

/// What became of a single line
#[derive(Debug, Clone, PartialEq)]
pub enum LineOutcome {
    Estimated(Estimate),
    Skipped(ParseError),
}

pub struct Pipeline {
    parser: VectorParser,
    estimator: KnnEstimator,
    stats: PipelineStats,
}

impl Pipeline {
    /// Parser output and dataset must agree on the vector dimension
    pub fn new(parser: VectorParser, estimator: KnnEstimator) -> Result<Self> {
        let expected = estimator.dataset().vector_dim();
        if parser.dimension() != expected {
            return Err(sensorknn_core::Error::DimensionMismatch {
                expected,
                actual: parser.dimension(),
            }
            .into());
        }

        Ok(Self {
            parser,
            estimator,
            stats: PipelineStats::default(),
        })
    }

    pub fn parser(&self) -> &VectorParser {
        &self.parser
    }

    pub fn estimator(&self) -> &KnnEstimator {
        &self.estimator
    }

    pub fn stats(&self) -> PipelineStats {
        self.stats
    }

    /// Turn one raw line into an estimate, or a skip
    pub fn process_line(&mut self, line: &str) -> Result<LineOutcome> {
        self.stats.lines += 1;

        let vector = match self.parser.parse(line) {
            Ok(vector) => vector,
            Err(e) => {
                self.stats.skipped += 1;
                debug!(line = line.trim_end(), "skipping malformed line: {}", e);
                return Ok(LineOutcome::Skipped(e));
            }
        };

        let estimate = self.estimator.estimate(&vector)?;
        self.stats.estimates += 1;
        debug!(query = %vector, estimate = estimate.value, "estimated");
        Ok(LineOutcome::Estimated(estimate))
    }

    /// Lazily map a stream of lines to estimates, dropping malformed lines
    pub fn estimates<'a, I>(&'a mut self, lines: I) -> Estimates<'a, I::IntoIter>
    where
        I: IntoIterator<Item = io::Result<String>>,
    {
        Estimates {
            pipeline: self,
            lines: lines.into_iter(),
        }
    }

    /// Feed every estimate to `sink` until the lines run out
    pub fn run<I, K>(&mut self, lines: I, sink: &mut K) -> Result<PipelineStats>
    where
        I: IntoIterator<Item = io::Result<String>>,
        K: EstimateSink + ?Sized,
    {
        for estimate in self.estimates(lines) {
            sink.accept(&estimate?)?;
        }
        sink.flush()?;

        info!(
            lines = self.stats.lines,
            skipped = self.stats.skipped,
            estimates = self.stats.estimates,
            "stream finished"
        );
        Ok(self.stats)
    }
}

/// Iterator returned by [`Pipeline::estimates`]
pub struct Estimates<'a, I> {
    pipeline: &'a mut Pipeline,
    lines: I,
}

impl<I> Iterator for Estimates<'_, I>
where
    I: Iterator<Item = io::Result<String>>,
{
    type Item = Result<Estimate>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(Error::Io(e))),
            };

            match self.pipeline.process_line(&line) {
                Ok(LineOutcome::Estimated(estimate)) => return Some(Ok(estimate)),
                Ok(LineOutcome::Skipped(_)) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
    }
}
