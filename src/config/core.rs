//! Booster parameters and their builder.
//!
//! [`BoosterParams`] holds one field per tree-booster hyperparameter, using
//! the XGBoost names and defaults. Grid combinations are turned into
//! `BoosterParams` before each cross-validation run.

use crate::core::constants::*;
use crate::core::error::{BoostGridError, Result};
use crate::core::types::*;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Tree booster configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoosterParams {
    /// Learning objective
    pub objective: ObjectiveType,
    /// Maximum depth of each tree (at least 1)
    pub max_depth: u32,
    /// Shrinkage applied to every leaf value
    pub eta: f64,
    /// Fraction of rows sampled for each tree
    pub subsample: f64,
    /// Fraction of columns sampled for each tree
    pub colsample_bytree: f64,
    /// Minimum loss reduction required to make a split
    pub gamma: f64,
    /// Minimum hessian sum required in each child
    pub min_child_weight: f64,
    /// L1 penalty on leaf weights
    pub alpha: f64,
    /// L2 penalty on leaf weights
    pub lambda: f64,
    /// Threads used for split finding (0 means all cores)
    pub nthread: usize,
    /// Seed for row and column sampling
    pub seed: u64,
}

impl Default for BoosterParams {
    fn default() -> Self {
        BoosterParams {
            objective: ObjectiveType::BinaryLogistic,
            max_depth: 6,
            eta: 0.3,
            subsample: 1.0,
            colsample_bytree: 1.0,
            gamma: 0.0,
            min_child_weight: 1.0,
            alpha: 0.0,
            lambda: DEFAULT_LAMBDA,
            nthread: DEFAULT_NTHREAD,
            seed: DEFAULT_SEED,
        }
    }
}

impl BoosterParams {
    /// Create parameters with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the parameters
    pub fn validate(&self) -> Result<()> {
        if self.max_depth == 0 {
            return Err(BoostGridError::invalid_parameter(
                "max_depth",
                "0",
                "must be at least 1",
            ));
        }

        if !(self.eta > 0.0 && self.eta <= 1.0) {
            return Err(BoostGridError::invalid_parameter(
                "eta",
                self.eta.to_string(),
                "must be in range (0.0, 1.0]",
            ));
        }

        if !(self.subsample > 0.0 && self.subsample <= 1.0) {
            return Err(BoostGridError::invalid_parameter(
                "subsample",
                self.subsample.to_string(),
                "must be in range (0.0, 1.0]",
            ));
        }

        if !(self.colsample_bytree > 0.0 && self.colsample_bytree <= 1.0) {
            return Err(BoostGridError::invalid_parameter(
                "colsample_bytree",
                self.colsample_bytree.to_string(),
                "must be in range (0.0, 1.0]",
            ));
        }

        for (name, value) in [
            ("gamma", self.gamma),
            ("min_child_weight", self.min_child_weight),
            ("alpha", self.alpha),
            ("lambda", self.lambda),
        ] {
            if !(value >= 0.0) || !value.is_finite() {
                return Err(BoostGridError::invalid_parameter(
                    name,
                    value.to_string(),
                    "must be a non-negative finite number",
                ));
            }
        }

        if self.nthread > num_cpus::get() * 2 {
            log::warn!(
                "nthread ({}) is much larger than available cores ({})",
                self.nthread,
                num_cpus::get()
            );
        }

        Ok(())
    }

    /// Get the effective number of threads (0 means use all available cores)
    pub fn effective_num_threads(&self) -> usize {
        if self.nthread == 0 {
            num_cpus::get()
        } else {
            self.nthread
        }
    }

    /// Parameters as name/value strings, in XGBoost naming.
    pub fn as_parameter_map(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        map.insert("objective".to_string(), self.objective.to_string());
        map.insert("max_depth".to_string(), self.max_depth.to_string());
        map.insert("eta".to_string(), self.eta.to_string());
        map.insert("subsample".to_string(), self.subsample.to_string());
        map.insert("colsample_bytree".to_string(), self.colsample_bytree.to_string());
        map.insert("gamma".to_string(), self.gamma.to_string());
        map.insert("min_child_weight".to_string(), self.min_child_weight.to_string());
        map.insert("alpha".to_string(), self.alpha.to_string());
        map.insert("lambda".to_string(), self.lambda.to_string());
        map.insert("nthread".to_string(), self.nthread.to_string());
        map.insert("seed".to_string(), self.seed.to_string());
        map
    }
}

/// Builder for [`BoosterParams`]
#[derive(Debug, Clone)]
pub struct BoosterParamsBuilder {
    params: BoosterParams,
    validation_errors: Vec<String>,
}

impl BoosterParamsBuilder {
    /// Create a new builder starting from the defaults
    pub fn new() -> Self {
        BoosterParamsBuilder {
            params: BoosterParams::default(),
            validation_errors: Vec::new(),
        }
    }

    /// Start from existing parameters
    pub fn from_params(params: BoosterParams) -> Self {
        BoosterParamsBuilder {
            params,
            validation_errors: Vec::new(),
        }
    }

    /// Set the objective
    pub fn objective(mut self, objective: ObjectiveType) -> Self {
        self.params.objective = objective;
        self
    }

    /// Set the maximum tree depth
    pub fn max_depth(mut self, depth: u32) -> Self {
        if depth == 0 {
            self.validation_errors
                .push("max_depth must be at least 1".to_string());
        }
        self.params.max_depth = depth;
        self
    }

    /// Set the learning rate
    pub fn eta(mut self, eta: f64) -> Self {
        if eta <= 0.0 || eta > 1.0 {
            self.validation_errors
                .push(format!("eta must be in (0.0, 1.0], got {}", eta));
        }
        self.params.eta = eta;
        self
    }

    /// Set the row subsample fraction
    pub fn subsample(mut self, fraction: f64) -> Self {
        if fraction <= 0.0 || fraction > 1.0 {
            self.validation_errors
                .push(format!("subsample must be in (0.0, 1.0], got {}", fraction));
        }
        self.params.subsample = fraction;
        self
    }

    /// Set the per-tree column subsample fraction
    pub fn colsample_bytree(mut self, fraction: f64) -> Self {
        if fraction <= 0.0 || fraction > 1.0 {
            self.validation_errors.push(format!(
                "colsample_bytree must be in (0.0, 1.0], got {}",
                fraction
            ));
        }
        self.params.colsample_bytree = fraction;
        self
    }

    /// Set the minimum split loss reduction
    pub fn gamma(mut self, gamma: f64) -> Self {
        self.params.gamma = gamma;
        self
    }

    /// Set the minimum child hessian sum
    pub fn min_child_weight(mut self, weight: f64) -> Self {
        self.params.min_child_weight = weight;
        self
    }

    /// Set the L1 penalty
    pub fn alpha(mut self, alpha: f64) -> Self {
        self.params.alpha = alpha;
        self
    }

    /// Set the L2 penalty
    pub fn lambda(mut self, lambda: f64) -> Self {
        self.params.lambda = lambda;
        self
    }

    /// Set the number of threads
    pub fn nthread(mut self, threads: usize) -> Self {
        self.params.nthread = threads;
        self
    }

    /// Set the random seed
    pub fn seed(mut self, seed: u64) -> Self {
        self.params.seed = seed;
        self
    }

    /// Build the parameters
    pub fn build(self) -> Result<BoosterParams> {
        if !self.validation_errors.is_empty() {
            return Err(BoostGridError::config(format!(
                "Parameter validation failed: {}",
                self.validation_errors.join(", ")
            )));
        }

        self.params.validate()?;
        Ok(self.params)
    }
}

impl Default for BoosterParamsBuilder {
    fn default() -> Self {
        Self::new()
    }
}
