//! Regression trees produced by the booster.
//!
//! Nodes live in a flat vector with the root at index 0. Children of a split
//! are always allocated as a consecutive pair, which gives the same node
//! numbering as XGBoost text dumps.

use crate::core::error::{BoostGridError, Result};
use crate::core::types::{FeatureIndex, NodeIndex, Score};
use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// A node of a regression tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TreeNode {
    /// Internal node; rows with `value < threshold` go left
    Split {
        feature: FeatureIndex,
        threshold: Score,
        left: NodeIndex,
        right: NodeIndex,
        /// Direction taken by missing values
        default_left: bool,
        /// Loss reduction achieved by the split
        gain: f64,
        /// Hessian sum of the rows reaching the node
        cover: f64,
    },
    /// Terminal node; `value` already includes the learning rate
    Leaf { value: Score, cover: f64 },
}

impl TreeNode {
    pub fn is_leaf(&self) -> bool {
        matches!(self, TreeNode::Leaf { .. })
    }

    pub fn cover(&self) -> f64 {
        match self {
            TreeNode::Split { cover, .. } | TreeNode::Leaf { cover, .. } => *cover,
        }
    }
}

/// Split description passed to [`RegressionTree::split`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitSpec {
    pub feature: FeatureIndex,
    pub threshold: Score,
    pub default_left: bool,
    pub gain: f64,
}

/// Binary regression tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    nodes: Vec<TreeNode>,
}

impl RegressionTree {
    /// Tree with a single leaf.
    pub fn new(root_cover: f64) -> Self {
        RegressionTree {
            nodes: vec![TreeNode::Leaf {
                value: 0.0,
                cover: root_cover,
            }],
        }
    }

    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn num_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Turn leaf `node` into a split, returning the new (left, right) children.
    pub fn split(
        &mut self,
        node: NodeIndex,
        spec: SplitSpec,
        left_cover: f64,
        right_cover: f64,
    ) -> Result<(NodeIndex, NodeIndex)> {
        let cover = match self.nodes.get(node) {
            Some(TreeNode::Leaf { cover, .. }) => *cover,
            Some(TreeNode::Split { .. }) => {
                return Err(BoostGridError::training(format!(
                    "node {} is already split",
                    node
                )))
            }
            None => {
                return Err(BoostGridError::training(format!(
                    "node {} out of bounds",
                    node
                )))
            }
        };

        let left = self.nodes.len();
        let right = left + 1;
        self.nodes.push(TreeNode::Leaf {
            value: 0.0,
            cover: left_cover,
        });
        self.nodes.push(TreeNode::Leaf {
            value: 0.0,
            cover: right_cover,
        });

        self.nodes[node] = TreeNode::Split {
            feature: spec.feature,
            threshold: spec.threshold,
            left,
            right,
            default_left: spec.default_left,
            gain: spec.gain,
            cover,
        };
        Ok((left, right))
    }

    /// Set the value of leaf `node`.
    pub fn set_leaf_value(&mut self, node: NodeIndex, new_value: Score) -> Result<()> {
        match self.nodes.get_mut(node) {
            Some(TreeNode::Leaf { value, .. }) => {
                *value = new_value;
                Ok(())
            }
            _ => Err(BoostGridError::training(format!(
                "node {} is not a leaf",
                node
            ))),
        }
    }

    /// Index of the leaf reached by `row`.
    pub fn leaf_index(&self, row: &ArrayView1<Score>) -> NodeIndex {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                TreeNode::Leaf { .. } => return index,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    default_left,
                    ..
                } => {
                    let value = row[*feature];
                    let go_left = if value.is_nan() {
                        *default_left
                    } else {
                        value < *threshold
                    };
                    index = if go_left { *left } else { *right };
                }
            }
        }
    }

    /// Output of the tree for one row.
    pub fn predict_row(&self, row: &ArrayView1<Score>) -> Score {
        match &self.nodes[self.leaf_index(row)] {
            TreeNode::Leaf { value, .. } => *value,
            TreeNode::Split { .. } => 0.0,
        }
    }

    /// Depth of the deepest leaf (a single-leaf tree has depth 0).
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack = vec![(0, 0)];
        while let Some((index, depth)) = stack.pop() {
            match &self.nodes[index] {
                TreeNode::Leaf { .. } => max_depth = max_depth.max(depth),
                TreeNode::Split { left, right, .. } => {
                    stack.push((*left, depth + 1));
                    stack.push((*right, depth + 1));
                }
            }
        }
        max_depth
    }

    /// Append this tree in XGBoost text dump format.
    pub fn dump_into(&self, out: &mut String, feature_names: &[String], with_stats: bool) {
        self.dump_node(out, 0, 0, feature_names, with_stats);
    }

    fn dump_node(
        &self,
        out: &mut String,
        index: NodeIndex,
        depth: usize,
        feature_names: &[String],
        with_stats: bool,
    ) {
        for _ in 0..depth {
            out.push('\t');
        }

        match &self.nodes[index] {
            TreeNode::Leaf { value, cover } => {
                let _ = write!(out, "{}:leaf={}", index, value);
                if with_stats {
                    let _ = write!(out, ",cover={}", cover);
                }
                out.push('\n');
            }
            TreeNode::Split {
                feature,
                threshold,
                left,
                right,
                default_left,
                gain,
                cover,
            } => {
                let name = feature_names
                    .get(*feature)
                    .cloned()
                    .unwrap_or_else(|| format!("f{}", feature));
                let missing = if *default_left { left } else { right };
                let _ = write!(
                    out,
                    "{}:[{}<{}] yes={},no={},missing={}",
                    index, name, threshold, left, right, missing
                );
                if with_stats {
                    let _ = write!(out, ",gain={},cover={}", gain, cover);
                }
                out.push('\n');

                self.dump_node(out, *left, depth + 1, feature_names, with_stats);
                self.dump_node(out, *right, depth + 1, feature_names, with_stats);
            }
        }
    }
}
