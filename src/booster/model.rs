//! The gradient boosted tree ensemble.

use crate::booster::learner::{ColumnIndex, TreeLearner, TreeParams};
use crate::booster::objective::{create_objective, GradientPair, Objective};
use crate::booster::sampling::TreeSampler;
use crate::booster::tree::{RegressionTree, TreeNode};
use crate::config::BoosterParams;
use crate::core::error::{BoostGridError, Result};
use crate::core::types::{ImportanceType, Score};
use crate::dataset::DMatrix;
use crate::metrics::EvalMetric;
use ndarray::{Array1, ArrayView1};
use rayon::prelude::*;
use rayon::ThreadPool;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Build the split-finding thread pool described by `params`.
pub fn build_thread_pool(params: &BoosterParams) -> Result<Arc<ThreadPool>> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(params.effective_num_threads())
        .build()?;
    Ok(Arc::new(pool))
}

/// Margins of one matrix under the first `trees_applied` trees.
///
/// Keeping the cache between rounds makes evaluating a watched matrix cost
/// one tree traversal per row and round.
#[derive(Debug, Clone)]
pub struct MarginCache {
    margins: Vec<Score>,
    trees_applied: usize,
}

impl MarginCache {
    pub fn len(&self) -> usize {
        self.margins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.margins.is_empty()
    }

    pub fn trees_applied(&self) -> usize {
        self.trees_applied
    }
}

/// Per-feature importance statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub feature: String,
    /// Share of total split gain
    pub gain: f64,
    /// Share of total split cover
    pub cover: f64,
    /// Share of split count
    pub frequency: f64,
}

impl FeatureImportance {
    pub fn value(&self, kind: ImportanceType) -> f64 {
        match kind {
            ImportanceType::Gain => self.gain,
            ImportanceType::Cover => self.cover,
            ImportanceType::Frequency => self.frequency,
        }
    }
}

#[derive(Debug)]
struct TrainState {
    num_rows: usize,
    index: ColumnIndex,
    margins: Vec<Score>,
    gradients: Vec<GradientPair>,
}

/// Gradient boosted tree ensemble bound to a training matrix.
#[derive(Debug)]
pub struct Booster {
    params: BoosterParams,
    objective: Arc<dyn Objective>,
    trees: Vec<RegressionTree>,
    feature_names: Vec<String>,
    sampler: TreeSampler,
    pool: Arc<ThreadPool>,
    train: TrainState,
}

impl Booster {
    /// Create a booster that will train on `dtrain`.
    pub fn new(params: &BoosterParams, dtrain: &DMatrix) -> Result<Self> {
        params.validate()?;
        let pool = build_thread_pool(params)?;
        Self::with_thread_pool(params, dtrain, pool)
    }

    /// Create a booster sharing an existing thread pool.
    pub fn with_thread_pool(params: &BoosterParams, dtrain: &DMatrix, pool: Arc<ThreadPool>) -> Result<Self> {
        params.validate()?;
        dtrain.require_labels("training")?;
        if dtrain.num_rows() == 0 {
            return Err(BoostGridError::training("training matrix has no rows"));
        }

        let objective: Arc<dyn Objective> = Arc::from(create_objective(params.objective));
        let index = ColumnIndex::build(dtrain.features(), &pool);
        let base = objective.base_margin();

        log::debug!(
            "Booster created: {} rows, {} features, params {:?}",
            dtrain.num_rows(),
            dtrain.num_features(),
            params.as_parameter_map()
        );

        Ok(Booster {
            params: params.clone(),
            objective,
            trees: Vec::new(),
            feature_names: dtrain.feature_names().to_vec(),
            sampler: TreeSampler::new(params.seed, params.subsample, params.colsample_bytree),
            pool,
            train: TrainState {
                num_rows: dtrain.num_rows(),
                index,
                margins: vec![base; dtrain.num_rows()],
                gradients: vec![GradientPair::default(); dtrain.num_rows()],
            },
        })
    }

    pub fn params(&self) -> &BoosterParams {
        &self.params
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn trees(&self) -> &[RegressionTree] {
        &self.trees
    }

    /// Number of boosting rounds performed so far.
    pub fn num_rounds(&self) -> usize {
        self.trees.len()
    }

    /// Run one boosting round on the training matrix.
    pub fn update(&mut self, dtrain: &DMatrix) -> Result<()> {
        self.check_training_matrix(dtrain)?;
        let labels = dtrain.require_labels("training")?.to_vec();

        self.objective
            .gradients(&self.train.margins, &labels, &mut self.train.gradients)?;

        let rows = self.sampler.sample_rows(self.train.num_rows);
        let columns = self.sampler.sample_columns(dtrain.num_features());

        let learner = TreeLearner::new(TreeParams::from_booster(&self.params), &self.pool);
        let tree = learner.grow(
            dtrain.features(),
            &self.train.index,
            &self.train.gradients,
            &rows,
            &columns,
        )?;

        let features = dtrain.features();
        let margins = &mut self.train.margins;
        self.pool.install(|| {
            margins.par_iter_mut().enumerate().for_each(|(row, margin)| {
                *margin += tree.predict_row(&features.row(row));
            });
        });

        log::trace!(
            "Round {}: {} sampled rows, {} columns, {} leaves",
            self.trees.len() + 1,
            rows.len(),
            columns.len(),
            tree.num_leaves()
        );
        self.trees.push(tree);
        Ok(())
    }

    /// Fresh margin cache for `dmat`.
    pub fn margin_cache(&self, dmat: &DMatrix) -> MarginCache {
        MarginCache {
            margins: vec![self.objective.base_margin(); dmat.num_rows()],
            trees_applied: 0,
        }
    }

    /// Bring `cache` up to date with the trees added since its last use.
    pub fn refresh_margins(&self, dmat: &DMatrix, cache: &mut MarginCache) -> Result<()> {
        self.check_features(dmat)?;
        if cache.len() != dmat.num_rows() || cache.trees_applied > self.trees.len() {
            return Err(BoostGridError::prediction(
                "margin cache does not belong to this matrix and booster",
            ));
        }

        let pending = &self.trees[cache.trees_applied..];
        if !pending.is_empty() {
            let features = dmat.features();
            self.pool.install(|| {
                cache.margins.par_iter_mut().enumerate().for_each(|(row, margin)| {
                    let values = features.row(row);
                    for tree in pending {
                        *margin += tree.predict_row(&values);
                    }
                });
            });
            cache.trees_applied = self.trees.len();
        }
        Ok(())
    }

    /// Evaluate `metrics` on `dmat`, reusing and updating `cache`.
    pub fn evaluate(
        &self,
        dmat: &DMatrix,
        cache: &mut MarginCache,
        metrics: &[EvalMetric],
    ) -> Result<Vec<f64>> {
        let labels = dmat.require_labels("evaluation")?;
        self.refresh_margins(dmat, cache)?;

        let probabilities: Array1<Score> = cache
            .margins
            .iter()
            .map(|&m| self.objective.transform(m))
            .collect();

        metrics
            .iter()
            .map(|metric| metric.try_evaluate(&probabilities.view(), &labels))
            .collect()
    }

    /// Raw margins for every row of `dmat`.
    pub fn predict_margin(&self, dmat: &DMatrix) -> Result<Array1<Score>> {
        let mut cache = self.margin_cache(dmat);
        self.refresh_margins(dmat, &mut cache)?;
        Ok(Array1::from(cache.margins))
    }

    /// Positive class probabilities for every row of `dmat`.
    pub fn predict(&self, dmat: &DMatrix) -> Result<Array1<Score>> {
        let margins = self.predict_margin(dmat)?;
        Ok(margins.mapv(|m| self.objective.transform(m)))
    }

    /// Probability for a single feature row.
    pub fn predict_row(&self, row: &ArrayView1<Score>) -> Result<Score> {
        if row.len() != self.feature_names.len() {
            return Err(BoostGridError::dimension_mismatch(
                format!("{} features", self.feature_names.len()),
                row.len().to_string(),
            ));
        }
        let margin = self
            .trees
            .iter()
            .fold(self.objective.base_margin(), |acc, tree| acc + tree.predict_row(row));
        Ok(self.objective.transform(margin))
    }

    /// Text dump of every tree in XGBoost format.
    pub fn dump_model(&self, with_stats: bool) -> String {
        let mut out = String::new();
        for (i, tree) in self.trees.iter().enumerate() {
            out.push_str(&format!("booster[{}]:\n", i));
            tree.dump_into(&mut out, &self.feature_names, with_stats);
        }
        out
    }

    /// Importance of every feature used in at least one split, by gain.
    pub fn feature_importance(&self) -> Vec<FeatureImportance> {
        let mut totals: BTreeMap<usize, (f64, f64, f64)> = BTreeMap::new();
        for tree in &self.trees {
            for node in tree.nodes() {
                if let TreeNode::Split {
                    feature,
                    gain,
                    cover,
                    ..
                } = node
                {
                    let entry = totals.entry(*feature).or_insert((0.0, 0.0, 0.0));
                    entry.0 += gain;
                    entry.1 += cover;
                    entry.2 += 1.0;
                }
            }
        }

        let sum_gain: f64 = totals.values().map(|t| t.0).sum();
        let sum_cover: f64 = totals.values().map(|t| t.1).sum();
        let sum_frequency: f64 = totals.values().map(|t| t.2).sum();
        let share = |value: f64, total: f64| if total > 0.0 { value / total } else { 0.0 };

        let mut importance: Vec<FeatureImportance> = totals
            .into_iter()
            .map(|(feature, (gain, cover, frequency))| FeatureImportance {
                feature: self
                    .feature_names
                    .get(feature)
                    .cloned()
                    .unwrap_or_else(|| format!("f{}", feature)),
                gain: share(gain, sum_gain),
                cover: share(cover, sum_cover),
                frequency: share(frequency, sum_frequency),
            })
            .collect();

        importance.sort_by(|a, b| b.gain.total_cmp(&a.gain));
        importance
    }

    fn check_features(&self, dmat: &DMatrix) -> Result<()> {
        if dmat.num_features() != self.feature_names.len() {
            return Err(BoostGridError::dimension_mismatch(
                format!("{} features", self.feature_names.len()),
                format!("{} features", dmat.num_features()),
            ));
        }
        Ok(())
    }

    fn check_training_matrix(&self, dtrain: &DMatrix) -> Result<()> {
        self.check_features(dtrain)?;
        if dtrain.num_rows() != self.train.num_rows || self.train.index.num_features() != dtrain.num_features() {
            return Err(BoostGridError::training(format!(
                "booster was created for {} training rows, got {}",
                self.train.num_rows,
                dtrain.num_rows()
            )));
        }
        Ok(())
    }
}
