//! # boostgrid
//!
//! Grid-searched, cross-validated gradient boosted trees for binary
//! classification.
//!
//! A run takes three tables (train, validation, test) and:
//!
//! 1. checks their feature schemas agree and coerces the labels to 0/1,
//! 2. cross-validates every combination of a hyperparameter grid with early
//!    stopping,
//! 3. keeps the combination with the best mean held-out AUC,
//! 4. trains a final model for exactly that combination's best round count,
//! 5. writes per-row probabilities for the test table to
//!    `output/submission<YYYYMMDD>.csv`.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use boostgrid::{CsvLoader, Pipeline, PipelineConfig, TableSchema};
//!
//! # fn main() -> boostgrid::Result<()> {
//! boostgrid::init();
//!
//! let labeled = CsvLoader::new(TableSchema::labeled("id", "target"));
//! let train = labeled.load("data/train.csv", "train")?;
//! let valid = labeled.load("data/valid.csv", "valid")?;
//! let test = CsvLoader::new(TableSchema::unlabeled("id")).load("data/test.csv", "test")?;
//!
//! let outcome = Pipeline::new(PipelineConfig::default()).run(&train, &valid, &test)?;
//! println!("{} rows written to {}", outcome.submission.len(), outcome.output_path.display());
//! # Ok(())
//! # }
//! ```
//!
//! ## Driving the booster directly
//!
//! ```rust
//! use boostgrid::{Booster, BoosterParamsBuilder, DMatrix, EvalMetric};
//! use ndarray::{array, Array2};
//!
//! # fn main() -> boostgrid::Result<()> {
//! let features: Array2<f64> = array![[1.0], [2.0], [3.0], [4.0]];
//! let dtrain = DMatrix::from_f64(&features, vec!["x".into()])?
//!     .with_labels(array![0.0, 0.0, 1.0, 1.0])?;
//!
//! let params = BoosterParamsBuilder::new().max_depth(2).eta(0.5).min_child_weight(0.0).build()?;
//! let mut booster = Booster::new(&params, &dtrain)?;
//! let mut cache = booster.margin_cache(&dtrain);
//! for _ in 0..5 {
//!     booster.update(&dtrain)?;
//! }
//! let auc = booster.evaluate(&dtrain, &mut cache, &[EvalMetric::Auc])?;
//! assert_eq!(auc[0], 1.0);
//! # Ok(())
//! # }
//! ```

pub mod booster;
pub mod config;
pub mod core;
pub mod dataset;
pub mod hyperopt;
pub mod metrics;
pub mod pipeline;
pub mod prediction;
pub mod training;

pub use crate::core::error::{BoostGridError, Result};
pub use crate::core::types::{ImportanceType, Label, ObjectiveType, Score};

pub use booster::{Booster, FeatureImportance};
pub use config::{BoosterParams, BoosterParamsBuilder, PipelineConfig};
pub use dataset::{prepare, CsvLoader, DMatrix, PreparedData, RawLabel, Table, TableSchema};
pub use hyperopt::{
    cross_validate, grid_search, select_best, CombinationId, CrossValidationConfig, CvResult,
    GridSearchResult, HyperparameterGrid, SelectedConfiguration, TieBreak,
};
pub use metrics::{EvalMetric, MetricDirection};
pub use pipeline::{Pipeline, PipelineOutcome};
pub use prediction::{predict_submission, write_submission, ImportanceReport, Submission};
pub use training::{train_final, EvalLog, TrainedModel};

/// Install the logging backend (`RUST_LOG`, default `info`).
pub fn init() {
    crate::core::initialize_logging();
}
