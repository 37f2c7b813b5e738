//! Hyperparameter grid.
//!
//! The grid holds one value list per tuned hyperparameter. Combinations are
//! enumerated as nested loops with `max_depth` outermost and `alpha`
//! innermost; a combination's position in that order is its
//! [`CombinationId`].

use crate::config::BoosterParams;
use crate::core::constants::*;
use crate::core::error::{BoostGridError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of a combination in canonical grid order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CombinationId(pub usize);

impl CombinationId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for CombinationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One point of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParamCombination {
    pub max_depth: u32,
    pub eta: f64,
    pub subsample: f64,
    pub colsample_bytree: f64,
    pub gamma: f64,
    pub min_child_weight: f64,
    pub alpha: f64,
}

impl ParamCombination {
    /// Booster parameters with this combination's values over `base`.
    pub fn apply(&self, base: &BoosterParams) -> BoosterParams {
        BoosterParams {
            max_depth: self.max_depth,
            eta: self.eta,
            subsample: self.subsample,
            colsample_bytree: self.colsample_bytree,
            gamma: self.gamma,
            min_child_weight: self.min_child_weight,
            alpha: self.alpha,
            ..base.clone()
        }
    }
}

impl fmt::Display for ParamCombination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "max_depth={} eta={} subsample={} colsample_bytree={} gamma={} min_child_weight={} alpha={}",
            self.max_depth,
            self.eta,
            self.subsample,
            self.colsample_bytree,
            self.gamma,
            self.min_child_weight,
            self.alpha
        )
    }
}

/// Value lists for every tuned hyperparameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HyperparameterGrid {
    pub max_depth: Vec<u32>,
    pub eta: Vec<f64>,
    pub subsample: Vec<f64>,
    pub colsample_bytree: Vec<f64>,
    pub gamma: Vec<f64>,
    pub min_child_weight: Vec<f64>,
    pub alpha: Vec<f64>,
}

impl Default for HyperparameterGrid {
    fn default() -> Self {
        HyperparameterGrid {
            max_depth: DEFAULT_GRID_MAX_DEPTH.to_vec(),
            eta: DEFAULT_GRID_ETA.to_vec(),
            subsample: DEFAULT_GRID_SUBSAMPLE.to_vec(),
            colsample_bytree: DEFAULT_GRID_COLSAMPLE_BYTREE.to_vec(),
            gamma: DEFAULT_GRID_GAMMA.to_vec(),
            min_child_weight: DEFAULT_GRID_MIN_CHILD_WEIGHT.to_vec(),
            alpha: DEFAULT_GRID_ALPHA.to_vec(),
        }
    }
}

impl HyperparameterGrid {
    /// Grid holding exactly one combination.
    pub fn single(combination: ParamCombination) -> Self {
        HyperparameterGrid {
            max_depth: vec![combination.max_depth],
            eta: vec![combination.eta],
            subsample: vec![combination.subsample],
            colsample_bytree: vec![combination.colsample_bytree],
            gamma: vec![combination.gamma],
            min_child_weight: vec![combination.min_child_weight],
            alpha: vec![combination.alpha],
        }
    }

    /// Number of combinations.
    pub fn len(&self) -> usize {
        self.max_depth.len()
            * self.eta.len()
            * self.subsample.len()
            * self.colsample_bytree.len()
            * self.gamma.len()
            * self.min_child_weight.len()
            * self.alpha.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reject empty axes and values no booster accepts.
    pub fn validate(&self) -> Result<()> {
        for (axis, len) in [
            ("max_depth", self.max_depth.len()),
            ("eta", self.eta.len()),
            ("subsample", self.subsample.len()),
            ("colsample_bytree", self.colsample_bytree.len()),
            ("gamma", self.gamma.len()),
            ("min_child_weight", self.min_child_weight.len()),
            ("alpha", self.alpha.len()),
        ] {
            if len == 0 {
                return Err(BoostGridError::config(format!(
                    "grid axis {} has no values",
                    axis
                )));
            }
        }

        let base = BoosterParams::default();
        for (id, combination) in self.combinations() {
            combination.apply(&base).validate().map_err(|e| {
                BoostGridError::config(format!("grid combination {} ({}): {}", id, combination, e))
            })?;
        }
        Ok(())
    }

    /// Every combination in canonical order.
    pub fn combinations(&self) -> Vec<(CombinationId, ParamCombination)> {
        let mut combinations = Vec::with_capacity(self.len());
        for &max_depth in &self.max_depth {
            for &eta in &self.eta {
                for &subsample in &self.subsample {
                    for &colsample_bytree in &self.colsample_bytree {
                        for &gamma in &self.gamma {
                            for &min_child_weight in &self.min_child_weight {
                                for &alpha in &self.alpha {
                                    let id = CombinationId(combinations.len());
                                    combinations.push((
                                        id,
                                        ParamCombination {
                                            max_depth,
                                            eta,
                                            subsample,
                                            colsample_bytree,
                                            gamma,
                                            min_child_weight,
                                            alpha,
                                        },
                                    ));
                                }
                            }
                        }
                    }
                }
            }
        }
        combinations
    }
}
