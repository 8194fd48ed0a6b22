//! Quantile binning

use crate::error::{PipelineError, Result};

/// Equal-population bins over a fitted distribution. Bins are closed on the
/// right, and the lowest edge belongs to the first bin.
pub struct QuantileBinner {
    n_bins: usize,
    edges: Option<Vec<f64>>,
}

impl QuantileBinner {
    pub fn new(n_bins: usize) -> Self {
        Self { n_bins, edges: None }
    }

    pub fn fit(&mut self, values: &[f64]) -> Result<()> {
        if values.is_empty() {
            return Err(PipelineError::DegenerateBins(Vec::new()));
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        let edges: Vec<f64> = (0..=self.n_bins)
            .map(|k| quantile(&sorted, k as f64 / self.n_bins as f64))
            .collect();

        if edges.windows(2).any(|w| w[0] >= w[1]) {
            return Err(PipelineError::DegenerateBins(edges));
        }
        self.edges = Some(edges);
        Ok(())
    }

    pub fn edges(&self) -> Option<&[f64]> {
        self.edges.as_deref()
    }

    /// Bin index of a value, or `None` outside the fitted range.
    pub fn bin(&self, value: f64) -> Option<usize> {
        let edges = self.edges.as_ref()?;
        let (first, last) = (*edges.first()?, *edges.last()?);
        if value < first || value > last {
            return None;
        }
        edges[1..].iter().position(|&upper| value <= upper)
    }

    pub fn transform(&self, values: &[f64]) -> Result<Vec<usize>> {
        let edges = self.edges.clone().unwrap_or_default();
        values
            .iter()
            .map(|&v| self.bin(v).ok_or_else(|| PipelineError::DegenerateBins(edges.clone())))
            .collect()
    }

    pub fn fit_transform(&mut self, values: &[f64]) -> Result<Vec<usize>> {
        self.fit(values)?;
        self.transform(values)
    }
}

/// Linearly interpolated quantile of sorted, non-empty values.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}
