//! Row and column sampling for each tree.

use crate::core::types::FeatureIndex;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Per-tree sampler seeded once per booster.
///
/// Rows are kept independently with probability `subsample`; columns are
/// drawn without replacement, `max(1, floor(colsample_bytree * n))` of them,
/// and returned in ascending order.
#[derive(Debug, Clone)]
pub struct TreeSampler {
    rng: StdRng,
    subsample: f64,
    colsample_bytree: f64,
}

impl TreeSampler {
    pub fn new(seed: u64, subsample: f64, colsample_bytree: f64) -> Self {
        TreeSampler {
            rng: StdRng::seed_from_u64(seed),
            subsample,
            colsample_bytree,
        }
    }

    /// Row indices used to grow the next tree.
    pub fn sample_rows(&mut self, num_rows: usize) -> Vec<usize> {
        if self.subsample >= 1.0 {
            return (0..num_rows).collect();
        }
        let fraction = self.subsample;
        (0..num_rows)
            .filter(|_| self.rng.gen::<f64>() < fraction)
            .collect()
    }

    /// Feature indices available to the next tree.
    pub fn sample_columns(&mut self, num_features: usize) -> Vec<FeatureIndex> {
        let mut features: Vec<FeatureIndex> = (0..num_features).collect();
        if self.colsample_bytree >= 1.0 || num_features == 0 {
            return features;
        }

        let count = ((self.colsample_bytree * num_features as f64).floor() as usize).max(1);
        features.shuffle(&mut self.rng);
        features.truncate(count);
        features.sort_unstable();
        features
    }
}
