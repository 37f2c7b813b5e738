//! K-fold cross-validation of one booster configuration.
//!
//! One booster is trained per fold, all folds advancing one round at a time.
//! After each round every metric is evaluated on the training and held-out
//! part of each fold and summarised by its mean and standard deviation across
//! folds. Training stops early when the last listed metric has not improved on
//! the held-out folds for `early_stopping_rounds` rounds.

use crate::booster::{build_thread_pool, Booster, MarginCache};
use crate::config::BoosterParams;
use crate::core::constants::*;
use crate::core::error::{BoostGridError, Result};
use crate::core::types::{IterationIndex, Label};
use crate::dataset::DMatrix;
use crate::hyperopt::early_stopping::EarlyStopping;
use crate::metrics::EvalMetric;
use ndarray::ArrayView1;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Cross-validation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrossValidationConfig {
    /// Number of folds
    pub nfold: usize,
    /// Maximum number of boosting rounds
    pub num_boost_round: usize,
    /// Stop after this many rounds without improvement of the last metric
    #[serde(skip_serializing_if = "Option::is_none")]
    pub early_stopping_rounds: Option<usize>,
    /// Metrics tracked every round; the last one drives early stopping
    pub metrics: Vec<EvalMetric>,
    /// Keep the class ratio of every fold close to the full data
    pub stratified: bool,
    /// Shuffle rows before assigning folds
    pub shuffle: bool,
    /// Seed for the fold assignment
    pub seed: u64,
}

impl Default for CrossValidationConfig {
    fn default() -> Self {
        CrossValidationConfig {
            nfold: DEFAULT_NFOLD,
            num_boost_round: DEFAULT_NUM_BOOST_ROUND,
            early_stopping_rounds: Some(DEFAULT_EARLY_STOPPING_ROUNDS),
            metrics: vec![EvalMetric::Auc, EvalMetric::Error],
            stratified: true,
            shuffle: true,
            seed: DEFAULT_SEED,
        }
    }
}

impl CrossValidationConfig {
    /// Create a new cross-validation configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of folds
    pub fn with_nfold(mut self, nfold: usize) -> Self {
        self.nfold = nfold;
        self
    }

    /// Set the maximum number of rounds
    pub fn with_num_boost_round(mut self, rounds: usize) -> Self {
        self.num_boost_round = rounds;
        self
    }

    /// Set or disable early stopping
    pub fn with_early_stopping_rounds(mut self, rounds: Option<usize>) -> Self {
        self.early_stopping_rounds = rounds;
        self
    }

    /// Set whether to use stratified folds
    pub fn with_stratified(mut self, stratified: bool) -> Self {
        self.stratified = stratified;
        self
    }

    /// Set the fold assignment seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.nfold < 2 {
            return Err(BoostGridError::invalid_parameter(
                "nfold",
                self.nfold.to_string(),
                "must be at least 2",
            ));
        }
        if self.num_boost_round == 0 {
            return Err(BoostGridError::invalid_parameter(
                "num_boost_round",
                "0",
                "must be at least 1",
            ));
        }
        if self.early_stopping_rounds == Some(0) {
            return Err(BoostGridError::invalid_parameter(
                "early_stopping_rounds",
                "0",
                "must be at least 1 when set",
            ));
        }
        if !self.metrics.contains(&EvalMetric::Auc) {
            return Err(BoostGridError::config(
                "cv.metrics must include auc, which drives model selection",
            ));
        }
        for (i, metric) in self.metrics.iter().enumerate() {
            if self.metrics[..i].contains(metric) {
                return Err(BoostGridError::config(format!(
                    "metric {} listed twice in cv.metrics",
                    metric
                )));
            }
        }
        Ok(())
    }

    /// Metric monitored for early stopping.
    pub fn stopping_metric(&self) -> Option<EvalMetric> {
        self.metrics.last().copied()
    }
}

/// Mean and population standard deviation of a metric across folds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    pub mean: f64,
    pub std: f64,
}

impl MetricSummary {
    pub fn from_values(values: &[f64]) -> Self {
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
        MetricSummary {
            mean,
            std: variance.sqrt(),
        }
    }
}

/// Metric summaries after one boosting round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CvRound {
    /// 1-based round number
    pub round: IterationIndex,
    pub train: BTreeMap<EvalMetric, MetricSummary>,
    pub test: BTreeMap<EvalMetric, MetricSummary>,
}

impl CvRound {
    /// Mean of `metric` over the held-out folds.
    pub fn test_mean(&self, metric: EvalMetric) -> Option<f64> {
        self.test.get(&metric).map(|s| s.mean)
    }

    /// Mean of `metric` over the training folds.
    pub fn train_mean(&self, metric: EvalMetric) -> Option<f64> {
        self.train.get(&metric).map(|s| s.mean)
    }

    fn log_line(&self) -> String {
        let mut line = format!("[{}]", self.round);
        for (prefix, summaries) in [("train", &self.train), ("test", &self.test)] {
            for (metric, summary) in summaries {
                line.push_str(&format!(
                    "\t{}-{}:{:.6}+{:.6}",
                    prefix, metric, summary.mean, summary.std
                ));
            }
        }
        line
    }
}

/// Outcome of cross-validating one configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CvResult {
    /// Every round that was run, in order
    pub history: Vec<CvRound>,
    /// First round (1-based) with maximal mean held-out AUC
    pub best_round: IterationIndex,
    /// Mean held-out AUC at `best_round`
    pub best_auc: f64,
    /// Mean held-out error at `best_round`, when error is tracked
    pub best_error: Option<f64>,
    /// Mean held-out AUC of the last round
    pub final_auc: f64,
    /// Mean held-out error of the last round, when error is tracked
    pub final_error: Option<f64>,
    /// Number of rounds run
    pub rounds_run: usize,
    /// True when early stopping ended the run
    pub stopped_early: bool,
}

impl CvResult {
    fn from_history(history: Vec<CvRound>, stopped_early: bool) -> Result<Self> {
        let last = history
            .last()
            .ok_or_else(|| BoostGridError::training("cross-validation ran no rounds"))?;

        let mut best: Option<(IterationIndex, f64)> = None;
        for round in &history {
            if let Some(auc) = round.test_mean(EvalMetric::Auc) {
                if !auc.is_nan() && best.map_or(true, |(_, b)| auc > b) {
                    best = Some((round.round, auc));
                }
            }
        }
        let (best_round, best_auc) = best.unwrap_or((1, f64::NAN));
        let best_error = history[best_round - 1].test_mean(EvalMetric::Error);

        Ok(CvResult {
            best_round,
            best_auc,
            best_error,
            final_auc: last.test_mean(EvalMetric::Auc).unwrap_or(f64::NAN),
            final_error: last.test_mean(EvalMetric::Error),
            rounds_run: history.len(),
            stopped_early,
            history,
        })
    }
}

/// Assign row indices to `nfold` held-out folds.
///
/// With `stratified`, each class is dealt round-robin over the folds so every
/// fold holds a share of both classes. Indices within a fold are ascending.
pub fn make_folds(
    labels: &ArrayView1<'_, Label>,
    nfold: usize,
    stratified: bool,
    shuffle: bool,
    seed: u64,
) -> Result<Vec<Vec<usize>>> {
    if nfold < 2 {
        return Err(BoostGridError::invalid_parameter(
            "nfold",
            nfold.to_string(),
            "must be at least 2",
        ));
    }
    if labels.len() < nfold {
        return Err(BoostGridError::dataset(format!(
            "cannot split {} rows into {} folds",
            labels.len(),
            nfold
        )));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let groups: Vec<Vec<usize>> = if stratified {
        let (positive, negative): (Vec<usize>, Vec<usize>) =
            (0..labels.len()).partition(|&i| labels[i] > 0.5);
        vec![positive, negative]
    } else {
        vec![(0..labels.len()).collect()]
    };

    let mut folds = vec![Vec::new(); nfold];
    let mut next_fold = 0;
    for mut group in groups {
        if shuffle {
            group.shuffle(&mut rng);
        }
        for row in group {
            folds[next_fold].push(row);
            next_fold = (next_fold + 1) % nfold;
        }
    }

    for fold in &mut folds {
        fold.sort_unstable();
    }
    Ok(folds)
}

/// Indices of the folds whose held-out rows all share one class.
pub fn single_class_folds(labels: &ArrayView1<'_, Label>, folds: &[Vec<usize>]) -> Vec<usize> {
    folds
        .iter()
        .enumerate()
        .filter(|(_, fold)| {
            let positives = fold.iter().filter(|&&row| labels[row] > 0.5).count();
            positives == 0 || positives == fold.len()
        })
        .map(|(k, _)| k)
        .collect()
}

struct FoldState {
    train: DMatrix,
    test: DMatrix,
    booster: Booster,
    train_cache: MarginCache,
    test_cache: MarginCache,
}

/// Cross-validate `params` on `dtrain`.
pub fn cross_validate(params: &BoosterParams, dtrain: &DMatrix, config: &CrossValidationConfig) -> Result<CvResult> {
    config.validate()?;
    params.validate()?;

    let labels = dtrain.require_labels("cross-validation")?;
    let folds = make_folds(&labels, config.nfold, config.stratified, config.shuffle, config.seed)?;
    let degenerate = single_class_folds(&labels, &folds);
    if !degenerate.is_empty() {
        log::warn!(
            "{} of {} held-out folds contain a single class ({:?}); their auc is scored as 0.5",
            degenerate.len(),
            folds.len(),
            degenerate
        );
    }
    let pool = build_thread_pool(params)?;

    let mut in_fold = vec![0usize; dtrain.num_rows()];
    for (k, fold) in folds.iter().enumerate() {
        for &row in fold {
            in_fold[row] = k;
        }
    }

    let mut states = Vec::with_capacity(folds.len());
    for (k, test_rows) in folds.iter().enumerate() {
        let train_rows: Vec<usize> = (0..dtrain.num_rows()).filter(|&r| in_fold[r] != k).collect();
        let train = dtrain.slice_rows(&train_rows);
        let test = dtrain.slice_rows(test_rows);
        let booster = Booster::with_thread_pool(params, &train, pool.clone())?;
        let train_cache = booster.margin_cache(&train);
        let test_cache = booster.margin_cache(&test);
        states.push(FoldState {
            train,
            test,
            booster,
            train_cache,
            test_cache,
        });
    }

    let stopping_metric = config.stopping_metric();
    let mut stopper = config
        .early_stopping_rounds
        .zip(stopping_metric)
        .map(|(patience, metric)| EarlyStopping::new(patience, metric.direction()));

    let mut history = Vec::new();
    let mut stopped_early = false;

    for round in 1..=config.num_boost_round {
        let mut train_values = vec![Vec::with_capacity(states.len()); config.metrics.len()];
        let mut test_values = vec![Vec::with_capacity(states.len()); config.metrics.len()];

        for state in &mut states {
            state.booster.update(&state.train)?;
            let train_scores = state
                .booster
                .evaluate(&state.train, &mut state.train_cache, &config.metrics)?;
            let test_scores = state
                .booster
                .evaluate(&state.test, &mut state.test_cache, &config.metrics)?;
            for (m, (train_score, test_score)) in train_scores.into_iter().zip(test_scores).enumerate() {
                train_values[m].push(train_score);
                test_values[m].push(test_score);
            }
        }

        let summarise = |values: &[Vec<f64>]| -> BTreeMap<EvalMetric, MetricSummary> {
            config
                .metrics
                .iter()
                .zip(values)
                .map(|(&metric, v)| (metric, MetricSummary::from_values(v)))
                .collect()
        };
        let cv_round = CvRound {
            round,
            train: summarise(&train_values),
            test: summarise(&test_values),
        };
        log::debug!("{}", cv_round.log_line());

        let monitored = stopping_metric.and_then(|m| cv_round.test_mean(m));
        history.push(cv_round);

        if let (Some(stopper), Some(value)) = (stopper.as_mut(), monitored) {
            if stopper.update(value, round) {
                stopped_early = true;
                break;
            }
        }
    }

    CvResult::from_history(history, stopped_early)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array1, Array2};
    use rand::Rng;

    fn noisy_matrix(rows: usize, seed: u64) -> DMatrix {
        let mut rng = StdRng::seed_from_u64(seed);
        let features = Array2::from_shape_fn((rows, 3), |_| rng.gen_range(-1.0..1.0));
        let labels = Array1::from_iter(features.rows().into_iter().map(|r| {
            let score = r[0] + 0.5 * r[1];
            if score > 0.0 {
                1.0
            } else {
                0.0
            }
        }));
        DMatrix::from_f64(&features, vec!["a".into(), "b".into(), "c".into()])
            .unwrap()
            .with_labels(labels)
            .unwrap()
    }

    fn quick_params() -> BoosterParams {
        BoosterParams {
            max_depth: 3,
            eta: 0.3,
            nthread: 2,
            ..BoosterParams::default()
        }
    }

    #[test]
    fn test_single_class_folds_detected() {
        let labels = Array1::from_iter((0..100).map(|i| if i < 4 { 1.0_f32 } else { 0.0 }));
        let folds = make_folds(&labels.view(), 10, true, true, 0).unwrap();

        let degenerate = single_class_folds(&labels.view(), &folds);
        assert_eq!(degenerate.len(), 6);
        for &k in &degenerate {
            assert!(folds[k].iter().all(|&row| labels[row] < 0.5));
        }

        let balanced = array![1.0_f32, 0.0, 1.0, 0.0];
        let folds = make_folds(&balanced.view(), 2, true, false, 0).unwrap();
        assert!(single_class_folds(&balanced.view(), &folds).is_empty());
    }

    #[test]
    fn test_folds_partition_rows() {
        let labels = array![1.0_f32, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0];
        let folds = make_folds(&labels.view(), 3, true, true, 4).unwrap();

        let mut all: Vec<usize> = folds.iter().flatten().copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..10).collect::<Vec<_>>());
        for fold in &folds {
            assert!(fold.len() >= 3 && fold.len() <= 4);
            assert!(fold.iter().any(|&i| labels[i] > 0.5));
            assert!(fold.windows(2).all(|w| w[0] < w[1]));
        }

        assert_eq!(folds, make_folds(&labels.view(), 3, true, true, 4).unwrap());
    }

    #[test]
    fn test_folds_reject_too_few_rows() {
        let labels = array![1.0_f32, 0.0];
        assert!(make_folds(&labels.view(), 3, false, false, 0).is_err());
        assert!(make_folds(&labels.view(), 1, false, false, 0).is_err());
    }

    #[test]
    fn test_cross_validate_records_history() {
        let dtrain = noisy_matrix(120, 1);
        let config = CrossValidationConfig::default()
            .with_nfold(4)
            .with_num_boost_round(15)
            .with_early_stopping_rounds(None);

        let result = cross_validate(&quick_params(), &dtrain, &config).unwrap();
        assert_eq!(result.rounds_run, 15);
        assert_eq!(result.history.len(), 15);
        assert!(!result.stopped_early);
        assert!(result.best_round >= 1 && result.best_round <= 15);
        assert!(result.best_auc > 0.8);
        assert!(result.best_auc >= result.final_auc);
        assert!(result.best_error.is_some());

        let best = result.history[result.best_round - 1].test_mean(EvalMetric::Auc).unwrap();
        assert_eq!(best, result.best_auc);
        for round in &result.history[..result.best_round - 1] {
            assert!(round.test_mean(EvalMetric::Auc).unwrap() < result.best_auc);
        }
        assert!(result.history[0].train.contains_key(&EvalMetric::Error));
    }

    #[test]
    fn test_early_stopping_truncates_run() {
        let dtrain = noisy_matrix(80, 2);
        let config = CrossValidationConfig::default()
            .with_nfold(4)
            .with_num_boost_round(300)
            .with_early_stopping_rounds(Some(5));

        let result = cross_validate(&quick_params(), &dtrain, &config).unwrap();
        assert!(result.stopped_early);
        assert!(result.rounds_run < 300);
        assert_eq!(result.history.len(), result.rounds_run);
    }

    #[test]
    fn test_cross_validation_is_deterministic() {
        let dtrain = noisy_matrix(60, 3);
        let params = BoosterParams {
            subsample: 0.75,
            colsample_bytree: 0.6,
            seed: 5,
            ..quick_params()
        };
        let config = CrossValidationConfig::default()
            .with_nfold(3)
            .with_num_boost_round(10);

        let a = cross_validate(&params, &dtrain, &config).unwrap();
        let b = cross_validate(&params, &dtrain, &config).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_config_validation() {
        assert!(CrossValidationConfig::default().validate().is_ok());
        assert!(CrossValidationConfig::default().with_nfold(1).validate().is_err());
        assert!(CrossValidationConfig::default().with_num_boost_round(0).validate().is_err());

        let mut config = CrossValidationConfig::default();
        config.metrics = vec![EvalMetric::Error];
        assert!(config.validate().is_err());

        config.metrics = vec![EvalMetric::Auc, EvalMetric::Auc];
        assert!(config.validate().is_err());
    }
}
