//! Gradient boosted decision trees.
//!
//! The booster follows the XGBoost tree booster: exact greedy split search on
//! presorted columns, L1/L2 regularised leaf weights, learned default
//! directions for missing values, and per-tree row and column sampling. The
//! rest of the crate drives it only through [`Booster`]:
//!
//! ```rust
//! use boostgrid::booster::Booster;
//! use boostgrid::config::BoosterParams;
//! use boostgrid::dataset::DMatrix;
//! use ndarray::array;
//!
//! let dtrain = DMatrix::from_f64(&array![[1.0], [2.0], [3.0], [4.0]], vec!["x".into()])?
//!     .with_labels(array![0.0, 0.0, 1.0, 1.0])?;
//!
//! let params = BoosterParams { max_depth: 2, min_child_weight: 0.0, ..BoosterParams::default() };
//! let mut booster = Booster::new(&params, &dtrain)?;
//! for _ in 0..10 {
//!     booster.update(&dtrain)?;
//! }
//! let probabilities = booster.predict(&dtrain)?;
//! assert!(probabilities[3] > probabilities[0]);
//! # Ok::<(), boostgrid::BoostGridError>(())
//! ```

pub mod learner;
pub mod model;
pub mod objective;
pub mod sampling;
pub mod tree;

pub use model::{build_thread_pool, Booster, FeatureImportance, MarginCache};
pub use objective::{sigmoid, GradientPair, LogisticObjective, Objective};
pub use tree::{RegressionTree, TreeNode};
