//! Default values for the grid search, cross-validation and output stages.
//!
//! The grid literals are the tuned configuration space of the pipeline;
//! `gamma` and `alpha` are deliberately fixed to a single value.

/// Tree depths tried by the default grid.
pub const DEFAULT_GRID_MAX_DEPTH: [u32; 3] = [6, 8, 10];

/// Learning rates tried by the default grid.
pub const DEFAULT_GRID_ETA: [f64; 2] = [0.01, 0.05];

/// Row subsample fractions tried by the default grid.
pub const DEFAULT_GRID_SUBSAMPLE: [f64; 2] = [0.75, 1.0];

/// Per-tree column subsample fractions tried by the default grid.
pub const DEFAULT_GRID_COLSAMPLE_BYTREE: [f64; 2] = [0.6, 0.8];

/// Minimum split loss reduction (fixed).
pub const DEFAULT_GRID_GAMMA: [f64; 1] = [0.05];

/// Minimum child hessian sums tried by the default grid.
pub const DEFAULT_GRID_MIN_CHILD_WEIGHT: [f64; 2] = [1.36, 2.0];

/// L1 penalty on leaf weights (fixed).
pub const DEFAULT_GRID_ALPHA: [f64; 1] = [0.0];

/// Default number of cross-validation folds.
pub const DEFAULT_NFOLD: usize = 10;

/// Default maximum number of boosting rounds per cross-validation run.
pub const DEFAULT_NUM_BOOST_ROUND: usize = 500;

/// Default number of rounds without improvement before early stopping.
pub const DEFAULT_EARLY_STOPPING_ROUNDS: usize = 50;

/// Default number of threads used for split finding.
pub const DEFAULT_NTHREAD: usize = 4;

/// Default L2 penalty on leaf weights.
pub const DEFAULT_LAMBDA: f64 = 1.0;

/// Default random seed for fold assignment and subsampling.
pub const DEFAULT_SEED: u64 = 0;

/// Threshold above which a probability is read as the positive class.
pub const PROBABILITY_THRESHOLD: f64 = 0.5;

/// Lower bound applied to the logistic hessian.
pub const MIN_HESSIAN: f64 = 1e-16;

/// Gains at or below this value never produce a split.
pub const RT_EPS: f64 = 1e-6;

/// Default directory for prediction files.
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// File name prefix of the prediction file; the date and `.csv` follow.
pub const SUBMISSION_PREFIX: &str = "submission";

/// Date format appended to [`SUBMISSION_PREFIX`].
pub const SUBMISSION_DATE_FORMAT: &str = "%Y%m%d";

/// Identifier column header in the prediction file.
pub const SUBMISSION_ID_COLUMN: &str = "test_id";

/// Probability column header in the prediction file.
pub const SUBMISSION_PREDICTION_COLUMN: &str = "predictions";

/// Crate version string.
pub const BOOSTGRID_VERSION: &str = env!("CARGO_PKG_VERSION");
