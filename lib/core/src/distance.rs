// Scalar distance kernels over f64 feature vectors.
// Two accumulators per loop for better pipelining; remainder handled separately.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Distance metric used to rank reference items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    #[default]
    Euclidean,
    Manhattan,
    Chebyshev,
}

impl Metric {
    /// Distance between two slices of equal length
    #[inline]
    pub fn distance(self, a: &[f64], b: &[f64]) -> f64 {
        if a.len() != b.len() {
            return f64::INFINITY;
        }

        match self {
            Metric::Euclidean => euclidean(a, b),
            Metric::Manhattan => manhattan(a, b),
            Metric::Chebyshev => chebyshev(a, b),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Metric::Euclidean => "euclidean",
            Metric::Manhattan => "manhattan",
            Metric::Chebyshev => "chebyshev",
        }
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "euclidean" | "l2" => Ok(Metric::Euclidean),
            "manhattan" | "l1" => Ok(Metric::Manhattan),
            "chebyshev" | "linf" => Ok(Metric::Chebyshev),
            other => Err(format!("unknown distance metric: {}", other)),
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// L2 distance
#[inline]
pub fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    squared_euclidean(a, b).sqrt()
}

/// Squared L2 distance
#[inline]
pub fn squared_euclidean(a: &[f64], b: &[f64]) -> f64 {
    let mut sum0 = 0.0f64;
    let mut sum1 = 0.0f64;

    let chunks = a.chunks_exact(4);
    let remainder = chunks.remainder();
    let b_chunks = b.chunks_exact(4);

    for (a_chunk, b_chunk) in chunks.zip(b_chunks) {
        let d0 = a_chunk[0] - b_chunk[0];
        let d1 = a_chunk[1] - b_chunk[1];
        let d2 = a_chunk[2] - b_chunk[2];
        let d3 = a_chunk[3] - b_chunk[3];

        sum0 += d0 * d0 + d1 * d1;
        sum1 += d2 * d2 + d3 * d3;
    }

    for i in (a.len() - remainder.len())..a.len() {
        let diff = a[i] - b[i];
        sum0 += diff * diff;
    }

    sum0 + sum1
}

/// L1 distance
#[inline]
pub fn manhattan(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).abs()).sum()
}

/// L-infinity distance
#[inline]
pub fn chebyshev(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_euclidean_with_remainder() {
        // six dimensions: one chunk of four plus a remainder of two
        let a = [0.0; 6];
        let b = [1.0, 1.0, 1.0, 1.0, 2.0, 2.0];
        assert!((squared_euclidean(&a, &b) - 12.0).abs() < 1e-12);
        assert!((euclidean(&a, &b) - 12.0f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_manhattan_and_chebyshev() {
        let a = [1.0, -2.0, 3.0];
        let b = [4.0, 2.0, 3.0];
        assert_eq!(manhattan(&a, &b), 7.0);
        assert_eq!(chebyshev(&a, &b), 4.0);
    }

    #[test]
    fn test_metric_length_mismatch() {
        assert!(Metric::Euclidean.distance(&[1.0], &[1.0, 2.0]).is_infinite());
    }

    #[test]
    fn test_metric_from_str() {
        assert_eq!("Euclidean".parse::<Metric>().unwrap(), Metric::Euclidean);
        assert_eq!("l1".parse::<Metric>().unwrap(), Metric::Manhattan);
        assert!("cosine".parse::<Metric>().is_err());
    }

    #[test]
    fn test_zero_distance() {
        let a = [5.0, 6.0, 7.0, 8.0, 9.0, 10.0];
        for metric in [Metric::Euclidean, Metric::Manhattan, Metric::Chebyshev] {
            assert_eq!(metric.distance(&a, &a), 0.0);
        }
    }
}
