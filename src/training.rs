//! Final model training.
//!
//! The final model is trained on the full training matrix for exactly the
//! number of rounds selected by cross-validation. The validation matrix is
//! only watched: its metrics are logged and recorded but never stop training.

use crate::booster::Booster;
use crate::config::{BoosterParams, TrainingConfig};
use crate::core::error::{BoostGridError, Result};
use crate::core::types::{IterationIndex, Score};
use crate::dataset::DMatrix;
use crate::metrics::EvalMetric;
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Watched metric values after one round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalEntry {
    /// 1-based round number
    pub round: IterationIndex,
    pub train: Vec<f64>,
    pub valid: Vec<f64>,
}

/// Per-round metrics of the final training run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvalLog {
    pub metrics: Vec<EvalMetric>,
    pub entries: Vec<EvalEntry>,
}

impl EvalLog {
    pub fn new(metrics: Vec<EvalMetric>) -> Self {
        EvalLog {
            metrics,
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&EvalEntry> {
        self.entries.last()
    }

    fn position(&self, metric: EvalMetric) -> Option<usize> {
        self.metrics.iter().position(|&m| m == metric)
    }

    /// Training values of `metric`, one per round.
    pub fn train_values(&self, metric: EvalMetric) -> Option<Vec<f64>> {
        let i = self.position(metric)?;
        Some(self.entries.iter().map(|e| e.train[i]).collect())
    }

    /// Validation values of `metric`, one per round.
    pub fn valid_values(&self, metric: EvalMetric) -> Option<Vec<f64>> {
        let i = self.position(metric)?;
        Some(self.entries.iter().map(|e| e.valid[i]).collect())
    }

    fn format_entry(&self, entry: &EvalEntry) -> String {
        let mut line = format!("[{}]", entry.round);
        for (i, metric) in self.metrics.iter().enumerate() {
            line.push_str(&format!("\ttrain-{}:{:.6}", metric, entry.train[i]));
        }
        for (i, metric) in self.metrics.iter().enumerate() {
            line.push_str(&format!("\tvalid-{}:{:.6}", metric, entry.valid[i]));
        }
        line
    }
}

/// A trained booster with its training log.
#[derive(Debug)]
pub struct TrainedModel {
    pub booster: Booster,
    pub eval_log: EvalLog,
}

impl TrainedModel {
    pub fn num_rounds(&self) -> usize {
        self.booster.num_rounds()
    }

    /// Positive class probabilities for `dmat`.
    pub fn predict(&self, dmat: &DMatrix) -> Result<Array1<Score>> {
        self.booster.predict(dmat)
    }
}

/// Train for exactly `rounds` rounds on `train`, watching `valid`.
pub fn train_final(
    params: &BoosterParams,
    rounds: usize,
    train: &DMatrix,
    valid: &DMatrix,
    config: &TrainingConfig,
) -> Result<TrainedModel> {
    if rounds == 0 {
        return Err(BoostGridError::training("final training needs at least one round"));
    }
    if config.watch_metrics.is_empty() {
        return Err(BoostGridError::config("training.watch_metrics is empty"));
    }
    valid.require_labels("validation watch")?;

    log::info!("Training final model for {} rounds", rounds);

    let mut booster = Booster::new(params, train)?;
    let mut train_cache = booster.margin_cache(train);
    let mut valid_cache = booster.margin_cache(valid);
    let mut eval_log = EvalLog::new(config.watch_metrics.clone());

    for round in 1..=rounds {
        booster.update(train)?;
        let entry = EvalEntry {
            round,
            train: booster.evaluate(train, &mut train_cache, &config.watch_metrics)?,
            valid: booster.evaluate(valid, &mut valid_cache, &config.watch_metrics)?,
        };

        let line = eval_log.format_entry(&entry);
        let periodic = config.log_every > 0 && round % config.log_every == 0;
        if periodic || round == rounds {
            log::info!("{}", line);
        } else {
            log::debug!("{}", line);
        }
        eval_log.entries.push(entry);
    }

    Ok(TrainedModel { booster, eval_log })
}
