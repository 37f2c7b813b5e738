//! Configuration for a complete pipeline run.
//!
//! Every section falls back to its defaults, so an empty file (or no file at
//! all) reproduces the standard 48-combination, 10-fold grid search.

use crate::config::core::BoosterParams;
use crate::core::constants::*;
use crate::core::error::{BoostGridError, Result};
use crate::hyperopt::cv::CrossValidationConfig;
use crate::hyperopt::grid::HyperparameterGrid;
use crate::hyperopt::select::TieBreak;
use crate::metrics::EvalMetric;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Input tables read by the binary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Labeled training table
    pub train_path: PathBuf,
    /// Labeled validation table, watched during final training
    pub valid_path: PathBuf,
    /// Unlabeled test table
    pub test_path: PathBuf,
    /// Identifier column present in every table
    pub id_column: String,
    /// Label column present in the training and validation tables
    pub label_column: String,
    /// CSV field delimiter
    pub delimiter: char,
}

impl Default for DataConfig {
    fn default() -> Self {
        DataConfig {
            train_path: PathBuf::from("data/train.csv"),
            valid_path: PathBuf::from("data/valid.csv"),
            test_path: PathBuf::from("data/test.csv"),
            id_column: "id".to_string(),
            label_column: "target".to_string(),
            delimiter: ',',
        }
    }
}

/// Final training settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Metrics evaluated on the train and validation matrices every round
    pub watch_metrics: Vec<EvalMetric>,
    /// Log at info level every this many rounds (0 logs only the last round)
    pub log_every: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        TrainingConfig {
            watch_metrics: vec![EvalMetric::LogLoss],
            log_every: 50,
        }
    }
}

/// Model selection settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// How ties at the maximal AUC are resolved
    pub tie_break: TieBreak,
}

/// Where results are written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving `submission<YYYYMMDD>.csv`
    pub dir: PathBuf,
    /// Optional file for the text model dump
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dump_path: Option<PathBuf>,
    /// Optional file for the feature importance table
    #[serde(skip_serializing_if = "Option::is_none")]
    pub importance_path: Option<PathBuf>,
    /// Optional JSON report of every grid result
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_path: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            dump_path: None,
            importance_path: None,
            report_path: None,
        }
    }
}

/// Top-level pipeline configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub data: DataConfig,
    pub grid: HyperparameterGrid,
    pub cv: CrossValidationConfig,
    /// Fixed booster settings shared by every combination (lambda, nthread, seed)
    pub booster: BoosterParams,
    pub training: TrainingConfig,
    pub selection: SelectionConfig,
    pub output: OutputConfig,
}

impl PipelineConfig {
    /// Create the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate every section
    pub fn validate(&self) -> Result<()> {
        self.grid.validate()?;
        self.cv.validate()?;
        self.booster.validate()?;

        if self.training.watch_metrics.is_empty() {
            return Err(BoostGridError::config(
                "training.watch_metrics must name at least one metric",
            ));
        }
        if self.data.id_column.is_empty() || self.data.label_column.is_empty() {
            return Err(BoostGridError::config(
                "data.id_column and data.label_column must not be empty",
            ));
        }
        if self.data.id_column == self.data.label_column {
            return Err(BoostGridError::config(format!(
                "identifier and label columns are both {:?}",
                self.data.id_column
            )));
        }
        if !self.data.delimiter.is_ascii() {
            return Err(BoostGridError::invalid_parameter(
                "data.delimiter",
                self.data.delimiter.to_string(),
                "must be a single ASCII character",
            ));
        }

        Ok(())
    }

    /// Load configuration from a `.toml` or `.json` file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            BoostGridError::config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        let config: PipelineConfig = match extension(path) {
            Some("json") => serde_json::from_str(&content)?,
            Some("toml") => toml::from_str(&content)?,
            _ => {
                return Err(BoostGridError::config(
                    "Unsupported config file format. Use .json or .toml",
                ))
            }
        };

        config.validate()?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Save configuration to a `.toml` or `.json` file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = match extension(path) {
            Some("json") => serde_json::to_string_pretty(self)?,
            Some("toml") => toml::to_string_pretty(self)?,
            _ => {
                return Err(BoostGridError::config(
                    "Unsupported config file format. Use .json or .toml",
                ))
            }
        };

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Cross-validation metrics, for logging
    pub fn cv_metric_names(&self) -> Vec<&'static str> {
        self.cv.metrics.iter().map(|m| m.name()).collect()
    }

    /// One-line description for the start-of-run log
    pub fn summary(&self) -> String {
        format!(
            "{} combinations, {}-fold CV, up to {} rounds (early stop {}), metrics {:?}, tie break {:?}, output {}",
            self.grid.len(),
            self.cv.nfold,
            self.cv.num_boost_round,
            self.cv
                .early_stopping_rounds
                .map_or_else(|| "off".to_string(), |n| n.to_string()),
            self.cv_metric_names(),
            self.selection.tie_break,
            self.output.dir.display()
        )
    }
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|s| s.to_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_match_standard_run() {
        let config = PipelineConfig::default();
        assert_eq!(config.grid.len(), 48);
        assert_eq!(config.cv.nfold, DEFAULT_NFOLD);
        assert_eq!(config.cv.num_boost_round, DEFAULT_NUM_BOOST_ROUND);
        assert_eq!(config.cv.early_stopping_rounds, Some(DEFAULT_EARLY_STOPPING_ROUNDS));
        assert_eq!(config.cv.metrics, vec![EvalMetric::Auc, EvalMetric::Error]);
        assert_eq!(config.booster.nthread, DEFAULT_NTHREAD);
        assert_eq!(config.selection.tie_break, TieBreak::First);
        assert_eq!(config.output.dir, PathBuf::from("output"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("boostgrid.toml");

        let mut config = PipelineConfig::default();
        config.cv.nfold = 3;
        config.output.report_path = Some(PathBuf::from("output/grid.json"));
        config.save_to_file(&path).unwrap();

        let loaded = PipelineConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("partial.toml");
        std::fs::write(
            &path,
            "[grid]\nmax_depth = [6]\neta = [0.05]\n\n[cv]\nnfold = 5\n",
        )
        .unwrap();

        let config = PipelineConfig::load_from_file(&path).unwrap();
        assert_eq!(config.grid.max_depth, vec![6]);
        assert_eq!(config.grid.subsample, vec![0.75, 1.0]);
        assert_eq!(config.cv.nfold, 5);
        assert_eq!(config.cv.num_boost_round, DEFAULT_NUM_BOOST_ROUND);
        assert_eq!(config.grid.len(), 8);
    }

    #[test]
    fn test_json_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"selection": {"tie_break": "unique"}}"#).unwrap();

        let config = PipelineConfig::load_from_file(&path).unwrap();
        assert_eq!(config.selection.tie_break, TieBreak::Unique);
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "").unwrap();
        assert!(PipelineConfig::load_from_file(&path).is_err());
        assert!(PipelineConfig::default().save_to_file(&path).is_err());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = PipelineConfig::default();
        config.data.label_column = "id".to_string();
        assert!(config.validate().is_err());

        let mut config = PipelineConfig::default();
        config.training.watch_metrics.clear();
        assert!(config.validate().is_err());

        let mut config = PipelineConfig::default();
        config.grid.eta.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_summary_describes_run() {
        let mut config = PipelineConfig::default();
        assert_eq!(config.cv_metric_names(), vec!["auc", "error"]);

        let summary = config.summary();
        assert!(summary.starts_with("48 combinations, 10-fold CV, up to 500 rounds (early stop 50)"));
        assert!(summary.contains("[\"auc\", \"error\"]"));

        config.cv.early_stopping_rounds = None;
        assert!(config.summary().contains("(early stop off)"));
    }
}
