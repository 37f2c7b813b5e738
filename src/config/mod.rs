//! Configuration for boostgrid.
//!
//! [`BoosterParams`] describes a single booster; [`PipelineConfig`] describes a
//! whole run: the input tables, the hyperparameter grid, cross-validation,
//! selection and output settings.

pub mod core;
pub mod pipeline;

pub use self::core::{BoosterParams, BoosterParamsBuilder};
pub use pipeline::{DataConfig, OutputConfig, PipelineConfig, SelectionConfig, TrainingConfig};

/// File name the binary looks for when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "boostgrid.toml";
