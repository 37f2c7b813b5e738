//! Exact greedy tree learner.
//!
//! Trees are grown level by level. For every level, each sampled feature is
//! scanned once over its presorted values, evaluating every boundary between
//! distinct values for every node of the level at the same time. Features are
//! scanned in parallel and the per-feature winners are reduced in feature
//! order, so the grown tree does not depend on the number of threads.

use crate::booster::objective::GradientPair;
use crate::booster::tree::{RegressionTree, SplitSpec};
use crate::config::BoosterParams;
use crate::core::constants::RT_EPS;
use crate::core::error::Result;
use crate::core::types::{FeatureIndex, NodeIndex, Score};
use ndarray::ArrayView2;
use rayon::prelude::*;
use rayon::ThreadPool;

const UNASSIGNED: usize = usize::MAX;

/// Regularisation and growth limits for a single tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeParams {
    pub max_depth: usize,
    pub eta: f64,
    pub gamma: f64,
    pub min_child_weight: f64,
    pub alpha: f64,
    pub lambda: f64,
}

impl TreeParams {
    pub fn from_booster(params: &BoosterParams) -> Self {
        TreeParams {
            max_depth: params.max_depth as usize,
            eta: params.eta,
            gamma: params.gamma,
            min_child_weight: params.min_child_weight,
            alpha: params.alpha,
            lambda: params.lambda,
        }
    }

    /// L1 soft threshold of a gradient sum.
    #[inline]
    fn threshold_l1(&self, g: f64) -> f64 {
        if g > self.alpha {
            g - self.alpha
        } else if g < -self.alpha {
            g + self.alpha
        } else {
            0.0
        }
    }

    /// Optimal unshrunk weight of a node.
    #[inline]
    pub fn weight(&self, sum: GradientPair) -> f64 {
        let denom = sum.hess + self.lambda;
        if denom <= 0.0 {
            return 0.0;
        }
        -self.threshold_l1(sum.grad) / denom
    }

    /// Structure score of a node; gains are differences of scores.
    #[inline]
    pub fn score(&self, sum: GradientPair) -> f64 {
        let denom = sum.hess + self.lambda;
        if denom <= 0.0 {
            return 0.0;
        }
        let t = self.threshold_l1(sum.grad);
        t * t / denom
    }

    /// Leaf value stored in the tree.
    pub fn leaf_value(&self, sum: GradientPair) -> Score {
        (self.eta * self.weight(sum)) as Score
    }

    fn min_split_gain(&self) -> f64 {
        self.gamma.max(RT_EPS)
    }
}

/// Per-feature row order used for exact split enumeration.
#[derive(Debug, Clone)]
pub struct ColumnIndex {
    present: Vec<Vec<(Score, usize)>>,
    missing: Vec<Vec<usize>>,
}

impl ColumnIndex {
    /// Sort every column of `features`; NaN values are listed separately.
    pub fn build(features: ArrayView2<'_, Score>, pool: &ThreadPool) -> Self {
        let columns: Vec<(Vec<(Score, usize)>, Vec<usize>)> = pool.install(|| {
            (0..features.ncols())
                .into_par_iter()
                .map(|feature| {
                    let column = features.column(feature);
                    let mut present = Vec::with_capacity(column.len());
                    let mut missing = Vec::new();
                    for (row, &value) in column.iter().enumerate() {
                        if value.is_nan() {
                            missing.push(row);
                        } else {
                            present.push((value, row));
                        }
                    }
                    present.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
                    (present, missing)
                })
                .collect()
        });

        let (present, missing) = columns.into_iter().unzip();
        ColumnIndex { present, missing }
    }

    pub fn num_features(&self) -> usize {
        self.present.len()
    }
}

#[derive(Debug, Clone, Copy)]
struct LevelNode {
    node: NodeIndex,
    sum: GradientPair,
}

#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    spec: SplitSpec,
    left: GradientPair,
    right: GradientPair,
}

/// Running state of one node while a feature is scanned.
#[derive(Debug, Clone, Copy, Default)]
struct ScanState {
    left: GradientPair,
    first: Option<Score>,
    last: Option<Score>,
}

/// Grows one regression tree from gradient statistics.
pub struct TreeLearner<'a> {
    params: TreeParams,
    pool: &'a ThreadPool,
}

impl<'a> TreeLearner<'a> {
    pub fn new(params: TreeParams, pool: &'a ThreadPool) -> Self {
        TreeLearner { params, pool }
    }

    /// Grow a tree on the sampled `rows`, splitting only on `columns`.
    pub fn grow(
        &self,
        features: ArrayView2<'_, Score>,
        index: &ColumnIndex,
        gradients: &[GradientPair],
        rows: &[usize],
        columns: &[FeatureIndex],
    ) -> Result<RegressionTree> {
        let mut position = vec![UNASSIGNED; gradients.len()];
        let mut root_sum = GradientPair::default();
        for &row in rows {
            position[row] = 0;
            root_sum += gradients[row];
        }

        let mut tree = RegressionTree::new(root_sum.hess);
        let mut level = vec![LevelNode {
            node: 0,
            sum: root_sum,
        }];

        for _depth in 0..self.params.max_depth {
            if level.is_empty() || columns.is_empty() {
                break;
            }

            let best = self.find_splits(index, gradients, &position, &level, columns, tree.num_nodes());

            let mut next = Vec::with_capacity(level.len() * 2);
            let mut routes: Vec<Option<(SplitSpec, NodeIndex, NodeIndex)>> = vec![None; level.len()];
            for (slot, current) in level.iter().enumerate() {
                match best[slot] {
                    Some(candidate) if candidate.spec.gain > self.params.min_split_gain() => {
                        let (left, right) = tree.split(
                            current.node,
                            candidate.spec,
                            candidate.left.hess,
                            candidate.right.hess,
                        )?;
                        next.push(LevelNode {
                            node: left,
                            sum: candidate.left,
                        });
                        next.push(LevelNode {
                            node: right,
                            sum: candidate.right,
                        });
                        routes[slot] = Some((candidate.spec, left, right));
                    }
                    _ => tree.set_leaf_value(current.node, self.params.leaf_value(current.sum))?,
                }
            }

            if next.is_empty() {
                return Ok(tree);
            }

            let slot_of = slot_lookup(&level, tree.num_nodes());
            for &row in rows {
                let node = position[row];
                if node == UNASSIGNED || slot_of[node] == UNASSIGNED {
                    continue;
                }
                if let Some((spec, left, right)) = routes[slot_of[node]] {
                    let value = features[[row, spec.feature]];
                    let go_left = if value.is_nan() {
                        spec.default_left
                    } else {
                        value < spec.threshold
                    };
                    position[row] = if go_left { left } else { right };
                }
            }

            level = next;
        }

        for remaining in &level {
            tree.set_leaf_value(remaining.node, self.params.leaf_value(remaining.sum))?;
        }
        Ok(tree)
    }

    fn find_splits(
        &self,
        index: &ColumnIndex,
        gradients: &[GradientPair],
        position: &[usize],
        level: &[LevelNode],
        columns: &[FeatureIndex],
        num_nodes: usize,
    ) -> Vec<Option<SplitCandidate>> {
        let slot_of = slot_lookup(level, num_nodes);
        let parent_scores: Vec<f64> = level.iter().map(|n| self.params.score(n.sum)).collect();

        let per_feature: Vec<Vec<Option<SplitCandidate>>> = self.pool.install(|| {
            columns
                .par_iter()
                .map(|&feature| {
                    self.scan_feature(feature, index, gradients, position, &slot_of, level, &parent_scores)
                })
                .collect()
        });

        let mut best: Vec<Option<SplitCandidate>> = vec![None; level.len()];
        for candidates in per_feature {
            for (slot, candidate) in candidates.into_iter().enumerate() {
                if let Some(candidate) = candidate {
                    if best[slot].map_or(true, |b| candidate.spec.gain > b.spec.gain) {
                        best[slot] = Some(candidate);
                    }
                }
            }
        }
        best
    }

    #[allow(clippy::too_many_arguments)]
    fn scan_feature(
        &self,
        feature: FeatureIndex,
        index: &ColumnIndex,
        gradients: &[GradientPair],
        position: &[usize],
        slot_of: &[usize],
        level: &[LevelNode],
        parent_scores: &[f64],
    ) -> Vec<Option<SplitCandidate>> {
        let slot = |row: usize| -> Option<usize> {
            let node = position[row];
            if node == UNASSIGNED || slot_of[node] == UNASSIGNED {
                None
            } else {
                Some(slot_of[node])
            }
        };

        let mut missing = vec![GradientPair::default(); level.len()];
        for &row in &index.missing[feature] {
            if let Some(s) = slot(row) {
                missing[s] += gradients[row];
            }
        }

        let mut state = vec![ScanState::default(); level.len()];
        let mut best: Vec<Option<SplitCandidate>> = vec![None; level.len()];

        for &(value, row) in &index.present[feature] {
            let Some(s) = slot(row) else { continue };
            let scan = &mut state[s];

            if let Some(last) = scan.last {
                if value > last {
                    let threshold = split_threshold(last, value);
                    let has_missing = missing[s].hess > 0.0;
                    let total = level[s].sum;

                    if has_missing {
                        self.consider(&mut best[s], feature, threshold, false, scan.left, total - scan.left, parent_scores[s]);
                    }
                    let left = scan.left + missing[s];
                    self.consider(&mut best[s], feature, threshold, true, left, total - left, parent_scores[s]);
                }
            } else {
                scan.first = Some(value);
            }

            scan.left += gradients[row];
            scan.last = Some(value);
        }

        // Splits separating present from missing values.
        for (s, scan) in state.iter().enumerate() {
            if missing[s].hess <= 0.0 {
                continue;
            }
            let total = level[s].sum;
            if let Some(last) = scan.last {
                let delta = (RT_EPS as Score).max(last.abs() * 1e-6);
                self.consider(&mut best[s], feature, last + delta, false, scan.left, missing[s], parent_scores[s]);
            }
            if let Some(first) = scan.first {
                self.consider(&mut best[s], feature, first, true, missing[s], total - missing[s], parent_scores[s]);
            }
        }

        best
    }

    #[allow(clippy::too_many_arguments)]
    fn consider(
        &self,
        best: &mut Option<SplitCandidate>,
        feature: FeatureIndex,
        threshold: Score,
        default_left: bool,
        left: GradientPair,
        right: GradientPair,
        parent_score: f64,
    ) {
        if left.hess < self.params.min_child_weight || right.hess < self.params.min_child_weight {
            return;
        }

        let gain = self.params.score(left) + self.params.score(right) - parent_score;
        if !gain.is_finite() {
            return;
        }

        if best.map_or(true, |b| gain > b.spec.gain) {
            *best = Some(SplitCandidate {
                spec: SplitSpec {
                    feature,
                    threshold,
                    default_left,
                    gain,
                },
                left,
                right,
            });
        }
    }
}

fn slot_lookup(level: &[LevelNode], num_nodes: usize) -> Vec<usize> {
    let mut slot_of = vec![UNASSIGNED; num_nodes];
    for (slot, node) in level.iter().enumerate() {
        slot_of[node.node] = slot;
    }
    slot_of
}

/// Threshold between two consecutive distinct values.
fn split_threshold(last: Score, value: Score) -> Score {
    let mid = ((last as f64 + value as f64) * 0.5) as Score;
    if mid > last {
        mid
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booster::tree::TreeNode;
    use approx::assert_relative_eq;
    use ndarray::{array, Array2};

    fn pool() -> ThreadPool {
        rayon::ThreadPoolBuilder::new().num_threads(2).build().unwrap()
    }

    fn params(max_depth: usize) -> TreeParams {
        TreeParams {
            max_depth,
            eta: 1.0,
            gamma: 0.0,
            min_child_weight: 0.0,
            alpha: 0.0,
            lambda: 1.0,
        }
    }

    fn logistic_start(labels: &[f32]) -> Vec<GradientPair> {
        labels
            .iter()
            .map(|&y| GradientPair::new(0.5 - y as f64, 0.25))
            .collect()
    }

    #[test]
    fn test_weight_and_score() {
        let p = TreeParams {
            alpha: 1.0,
            ..params(1)
        };
        let sum = GradientPair::new(-3.0, 1.0);
        assert_relative_eq!(p.weight(sum), 1.0);
        assert_relative_eq!(p.score(sum), 2.0);
        assert_eq!(p.weight(GradientPair::new(0.5, 1.0)), 0.0);
    }

    #[test]
    fn test_split_threshold() {
        assert_eq!(split_threshold(1.0, 2.0), 1.5);
        let next = f32::from_bits(1.0_f32.to_bits() + 1);
        assert_eq!(split_threshold(1.0, next), next);
    }

    #[test]
    fn test_stump_separates_classes() {
        let pool = pool();
        let features: Array2<Score> = array![[1.0], [2.0], [3.0], [4.0]];
        let labels = [0.0, 0.0, 1.0, 1.0];
        let gradients = logistic_start(&labels);
        let index = ColumnIndex::build(features.view(), &pool);

        let learner = TreeLearner::new(params(1), &pool);
        let tree = learner
            .grow(features.view(), &index, &gradients, &[0, 1, 2, 3], &[0])
            .unwrap();

        match &tree.nodes()[0] {
            TreeNode::Split { feature, threshold, .. } => {
                assert_eq!(*feature, 0);
                assert_eq!(*threshold, 2.5);
            }
            other => panic!("expected split, got {:?}", other),
        }
        assert!(tree.predict_row(&array![1.0_f32].view()) < 0.0);
        assert!(tree.predict_row(&array![4.0_f32].view()) > 0.0);
    }

    #[test]
    fn test_missing_values_follow_learned_direction() {
        let pool = pool();
        let features: Array2<Score> = array![[1.0], [2.0], [f32::NAN], [f32::NAN]];
        let labels = [0.0, 0.0, 1.0, 1.0];
        let gradients = logistic_start(&labels);
        let index = ColumnIndex::build(features.view(), &pool);

        let tree = TreeLearner::new(params(1), &pool)
            .grow(features.view(), &index, &gradients, &[0, 1, 2, 3], &[0])
            .unwrap();

        assert!(!tree.nodes()[0].is_leaf());
        assert!(tree.predict_row(&array![f32::NAN].view()) > 0.0);
        assert!(tree.predict_row(&array![1.5_f32].view()) < 0.0);
    }

    #[test]
    fn test_min_child_weight_and_gamma_block_splits() {
        let pool = pool();
        let features: Array2<Score> = array![[1.0], [2.0], [3.0], [4.0]];
        let gradients = logistic_start(&[0.0, 0.0, 1.0, 1.0]);
        let index = ColumnIndex::build(features.view(), &pool);
        let rows = [0, 1, 2, 3];

        let heavy = TreeParams {
            min_child_weight: 0.6,
            ..params(3)
        };
        let tree = TreeLearner::new(heavy, &pool)
            .grow(features.view(), &index, &gradients, &rows, &[0])
            .unwrap();
        assert_eq!(tree.num_nodes(), 1);

        let strict = TreeParams {
            gamma: 100.0,
            ..params(3)
        };
        let tree = TreeLearner::new(strict, &pool)
            .grow(features.view(), &index, &gradients, &rows, &[0])
            .unwrap();
        assert_eq!(tree.num_leaves(), 1);
    }

    #[test]
    fn test_depth_limit_and_thread_independence() {
        let features = Array2::from_shape_fn((64, 3), |(r, c)| ((r * (c + 3)) % 17) as Score);
        let labels: Vec<f32> = (0..64).map(|r| ((r * 7) % 5 > 1) as u8 as f32).collect();
        let gradients = logistic_start(&labels);
        let rows: Vec<usize> = (0..64).collect();

        let single = rayon::ThreadPoolBuilder::new().num_threads(1).build().unwrap();
        let multi = rayon::ThreadPoolBuilder::new().num_threads(4).build().unwrap();
        let index = ColumnIndex::build(features.view(), &single);

        let a = TreeLearner::new(params(3), &single)
            .grow(features.view(), &index, &gradients, &rows, &[0, 1, 2])
            .unwrap();
        let b = TreeLearner::new(params(3), &multi)
            .grow(features.view(), &index, &gradients, &rows, &[0, 1, 2])
            .unwrap();

        assert_eq!(a, b);
        assert!(a.depth() <= 3);
    }
}
