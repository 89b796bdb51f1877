//! Weighted binned accumulator.
//!
//! Tracks sum-of-weights and sum-of-squared-weights per bin so statistical
//! errors survive arbitrary reweighting; the per-bin error is
//! `sqrt(sum w^2)`. Fills outside the edge range land in the underflow or
//! overflow sums instead of disappearing.

use jetspec_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Binned running sums of weights and squared weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinnedAccumulator {
    /// Strictly increasing bin edges (length = bins + 1).
    edges: Vec<f64>,
    /// Per-bin sum of weights.
    sumw: Vec<f64>,
    /// Per-bin sum of squared weights.
    sumw2: Vec<f64>,
    /// Sum of weights below the first edge.
    underflow: f64,
    /// Sum of squared weights below the first edge.
    underflow_sumw2: f64,
    /// Sum of weights at or above the last edge.
    overflow: f64,
    /// Sum of squared weights at or above the last edge.
    overflow_sumw2: f64,
    /// Number of fills, including under/overflow.
    entries: u64,
}

impl BinnedAccumulator {
    /// Create an empty accumulator over the given edges.
    ///
    /// Edges must be strictly increasing with at least two entries; callers
    /// obtain them from the binning catalog, which guarantees both.
    pub fn new(edges: Vec<f64>) -> Self {
        debug_assert!(edges.len() >= 2);
        debug_assert!(edges.windows(2).all(|pair| pair[0] < pair[1]));

        let bins = edges.len() - 1;
        Self {
            edges,
            sumw: vec![0.0; bins],
            sumw2: vec![0.0; bins],
            underflow: 0.0,
            underflow_sumw2: 0.0,
            overflow: 0.0,
            overflow_sumw2: 0.0,
            entries: 0,
        }
    }

    /// Add `weight` at `value`.
    ///
    /// Bins are half-open `[lo, hi)`; a fill exactly on an interior edge
    /// goes to the upper bin.
    pub fn fill(&mut self, value: f64, weight: f64) {
        self.entries += 1;

        if value < self.edges[0] {
            self.underflow += weight;
            self.underflow_sumw2 += weight * weight;
            return;
        }
        if value >= self.edges[self.edges.len() - 1] {
            self.overflow += weight;
            self.overflow_sumw2 += weight * weight;
            return;
        }

        let bin = self.edges.partition_point(|&edge| edge <= value) - 1;
        self.sumw[bin] += weight;
        self.sumw2[bin] += weight * weight;
    }

    /// Overwrite every bin content with `value`, clearing variance.
    ///
    /// Used to broadcast a scalar (the final luminosity sum) across the
    /// binning so downstream division is bin-by-bin.
    pub fn set_all(&mut self, value: f64) {
        for content in &mut self.sumw {
            *content = value;
        }
        for var in &mut self.sumw2 {
            *var = 0.0;
        }
    }

    /// Merge another accumulator with identical edges into this one.
    pub fn merge(&mut self, other: &BinnedAccumulator) -> Result<()> {
        if self.edges != other.edges {
            return Err(Error::config(
                "cannot merge accumulators with different binnings",
            ));
        }
        for (a, b) in self.sumw.iter_mut().zip(&other.sumw) {
            *a += b;
        }
        for (a, b) in self.sumw2.iter_mut().zip(&other.sumw2) {
            *a += b;
        }
        self.underflow += other.underflow;
        self.underflow_sumw2 += other.underflow_sumw2;
        self.overflow += other.overflow;
        self.overflow_sumw2 += other.overflow_sumw2;
        self.entries += other.entries;
        Ok(())
    }

    /// Bin edges.
    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    /// Number of bins.
    pub fn bin_count(&self) -> usize {
        self.sumw.len()
    }

    /// Sum of weights in one bin.
    pub fn content(&self, bin: usize) -> f64 {
        self.sumw[bin]
    }

    /// Sum of squared weights in one bin.
    pub fn variance(&self, bin: usize) -> f64 {
        self.sumw2[bin]
    }

    /// Statistical error of one bin.
    pub fn error(&self, bin: usize) -> f64 {
        self.sumw2[bin].sqrt()
    }

    /// Underflow sum of weights.
    pub fn underflow(&self) -> f64 {
        self.underflow
    }

    /// Overflow sum of weights.
    pub fn overflow(&self) -> f64 {
        self.overflow
    }

    /// Number of fills.
    pub fn entries(&self) -> u64 {
        self.entries
    }

    /// Sum of weights over all bins, excluding under/overflow.
    pub fn integral(&self) -> f64 {
        self.sumw.iter().sum()
    }

    /// Index of the bin containing `value`, if inside the edge range.
    pub fn find_bin(&self, value: f64) -> Option<usize> {
        if value < self.edges[0] || value >= self.edges[self.edges.len() - 1] {
            return None;
        }
        Some(self.edges.partition_point(|&edge| edge <= value) - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_acc() -> BinnedAccumulator {
        BinnedAccumulator::new(vec![10.0, 20.0, 50.0, 100.0])
    }

    #[test]
    fn test_fill_routes_to_containing_bin() {
        let mut acc = make_acc();
        acc.fill(15.0, 1.0);
        acc.fill(30.0, 2.0);
        acc.fill(99.9, 3.0);

        assert_eq!(acc.content(0), 1.0);
        assert_eq!(acc.content(1), 2.0);
        assert_eq!(acc.content(2), 3.0);
        assert_eq!(acc.entries(), 3);
    }

    #[test]
    fn test_edge_value_goes_to_upper_bin() {
        let mut acc = make_acc();
        acc.fill(20.0, 1.0);
        assert_eq!(acc.content(0), 0.0);
        assert_eq!(acc.content(1), 1.0);

        // First edge is inclusive
        acc.fill(10.0, 1.0);
        assert_eq!(acc.content(0), 1.0);
    }

    #[test]
    fn test_variance_tracks_squared_weights() {
        let mut acc = make_acc();
        acc.fill(15.0, 2.0);
        acc.fill(15.0, 3.0);

        assert_eq!(acc.content(0), 5.0);
        assert_eq!(acc.variance(0), 13.0);
        assert!((acc.error(0) - 13.0f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_under_and_overflow() {
        let mut acc = make_acc();
        acc.fill(5.0, 1.0);
        acc.fill(100.0, 2.0); // upper edge is exclusive
        acc.fill(500.0, 3.0);

        assert_eq!(acc.underflow(), 1.0);
        assert_eq!(acc.overflow(), 5.0);
        assert_eq!(acc.integral(), 0.0);
        assert_eq!(acc.entries(), 3);
    }

    #[test]
    fn test_set_all_broadcast() {
        let mut acc = make_acc();
        acc.fill(15.0, 1.0);
        acc.set_all(2.5);

        for bin in 0..acc.bin_count() {
            assert_eq!(acc.content(bin), 2.5);
            assert_eq!(acc.variance(bin), 0.0);
        }
    }

    #[test]
    fn test_merge_pairwise() {
        let mut a = make_acc();
        let mut b = make_acc();
        a.fill(15.0, 1.0);
        b.fill(15.0, 2.0);
        b.fill(5.0, 1.0);

        a.merge(&b).unwrap();
        assert_eq!(a.content(0), 3.0);
        assert_eq!(a.variance(0), 5.0);
        assert_eq!(a.underflow(), 1.0);
        assert_eq!(a.entries(), 3);
    }

    #[test]
    fn test_merge_rejects_different_edges() {
        let mut a = make_acc();
        let b = BinnedAccumulator::new(vec![0.0, 1.0]);
        assert!(a.merge(&b).is_err());
    }

    #[test]
    fn test_find_bin() {
        let acc = make_acc();
        assert_eq!(acc.find_bin(15.0), Some(0));
        assert_eq!(acc.find_bin(50.0), Some(2));
        assert_eq!(acc.find_bin(5.0), None);
        assert_eq!(acc.find_bin(100.0), None);
    }
}
