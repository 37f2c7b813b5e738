//! Hyperparameter search.
//!
//! [`grid_search`] cross-validates every combination of a
//! [`HyperparameterGrid`]; [`select_best`] then picks the combination with
//! the highest mean held-out AUC, together with the round at which that AUC
//! was reached.

pub mod cv;
pub mod early_stopping;
pub mod grid;
pub mod search;
pub mod select;

pub use cv::{cross_validate, make_folds, CrossValidationConfig, CvResult, CvRound, MetricSummary};
pub use early_stopping::EarlyStopping;
pub use grid::{CombinationId, HyperparameterGrid, ParamCombination};
pub use search::{grid_search, GridEntry, GridSearchResult};
pub use select::{select_best, SelectedConfiguration, TieBreak};
