use sensorknn_core::Estimate;
use std::io::{self, Write};

/// Receives one estimate per successfully parsed line
pub trait EstimateSink {
    fn accept(&mut self, estimate: &Estimate) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<F> EstimateSink for F
where
    F: FnMut(&Estimate) -> io::Result<()>,
{
    fn accept(&mut self, estimate: &Estimate) -> io::Result<()> {
        self(estimate)
    }
}

/// Writes each estimate on its own line with a fixed number of decimals
pub struct WriterSink<W: Write> {
    writer: W,
    precision: usize,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W, precision: usize) -> Self {
        Self { writer, precision }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> EstimateSink for WriterSink<W> {
    fn accept(&mut self, estimate: &Estimate) -> io::Result<()> {
        writeln!(self.writer, "{:.*}", self.precision, estimate)?;
        // readings arrive slowly; make every estimate visible immediately
        self.writer.flush()
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// Collects estimates in memory
#[derive(Debug, Default, Clone)]
pub struct VecSink {
    pub estimates: Vec<Estimate>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn values(&self) -> Vec<f64> {
        self.estimates.iter().map(|e| e.value).collect()
    }
}

impl EstimateSink for VecSink {
    fn accept(&mut self, estimate: &Estimate) -> io::Result<()> {
        self.estimates.push(*estimate);
        Ok(())
    }
}
