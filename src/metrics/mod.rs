//! Evaluation metrics for binary classifiers.
//!
//! Metrics are identified by [`EvalMetric`], which carries the XGBoost-style
//! name used in evaluation logs (`auc`, `error`, `logloss`) and the direction
//! in which the metric improves.
//!
//! ```rust
//! use boostgrid::metrics::EvalMetric;
//! use ndarray::array;
//!
//! let probabilities = array![0.9_f32, 0.2, 0.7, 0.4];
//! let labels = array![1.0_f32, 0.0, 1.0, 0.0];
//!
//! let auc = EvalMetric::Auc.evaluate(&probabilities.view(), &labels.view());
//! assert_eq!(auc, 1.0);
//! ```

pub mod classification;

pub use classification::{auc, error_rate, log_loss};

use crate::core::error::{BoostGridError, Result};
use crate::core::types::{Label, Score};
use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Whether larger or smaller metric values are better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetricDirection {
    /// Larger is better (e.g. AUC)
    Maximize,
    /// Smaller is better (e.g. error rate)
    Minimize,
}

impl MetricDirection {
    /// True when `candidate` is strictly better than `incumbent`.
    pub fn is_better(self, candidate: f64, incumbent: f64) -> bool {
        match self {
            MetricDirection::Maximize => candidate > incumbent,
            MetricDirection::Minimize => candidate < incumbent,
        }
    }

    /// The value every real metric value improves upon.
    pub fn worst_value(self) -> f64 {
        match self {
            MetricDirection::Maximize => f64::NEG_INFINITY,
            MetricDirection::Minimize => f64::INFINITY,
        }
    }
}

/// Evaluation metric computed on probabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvalMetric {
    /// Area under the ROC curve
    Auc,
    /// Misclassification rate at threshold 0.5
    Error,
    /// Negative log-likelihood
    #[serde(rename = "logloss")]
    LogLoss,
}

impl EvalMetric {
    /// Name used in evaluation logs.
    pub fn name(self) -> &'static str {
        match self {
            EvalMetric::Auc => "auc",
            EvalMetric::Error => "error",
            EvalMetric::LogLoss => "logloss",
        }
    }

    /// Direction in which the metric improves.
    pub fn direction(self) -> MetricDirection {
        match self {
            EvalMetric::Auc => MetricDirection::Maximize,
            EvalMetric::Error | EvalMetric::LogLoss => MetricDirection::Minimize,
        }
    }

    /// Compute the metric for predicted probabilities against 0/1 labels.
    pub fn evaluate(self, probabilities: &ArrayView1<'_, Score>, labels: &ArrayView1<'_, Label>) -> f64 {
        match self {
            EvalMetric::Auc => auc(probabilities, labels),
            EvalMetric::Error => error_rate(probabilities, labels),
            EvalMetric::LogLoss => log_loss(probabilities, labels),
        }
    }

    /// Like [`EvalMetric::evaluate`] but checks the inputs first.
    pub fn try_evaluate(
        self,
        probabilities: &ArrayView1<'_, Score>,
        labels: &ArrayView1<'_, Label>,
    ) -> Result<f64> {
        if probabilities.len() != labels.len() {
            return Err(BoostGridError::dimension_mismatch(
                format!("{} predictions", labels.len()),
                format!("{} predictions", probabilities.len()),
            ));
        }
        if labels.is_empty() {
            return Err(BoostGridError::dataset(format!(
                "cannot evaluate {} on an empty set",
                self.name()
            )));
        }
        Ok(self.evaluate(probabilities, labels))
    }
}

impl fmt::Display for EvalMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EvalMetric {
    type Err = BoostGridError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auc" => Ok(EvalMetric::Auc),
            "error" => Ok(EvalMetric::Error),
            "logloss" => Ok(EvalMetric::LogLoss),
            other => Err(BoostGridError::invalid_parameter(
                "eval_metric",
                other,
                "expected one of auc, error, logloss",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_metric_names_round_trip() {
        for metric in [EvalMetric::Auc, EvalMetric::Error, EvalMetric::LogLoss] {
            assert_eq!(metric.name().parse::<EvalMetric>().unwrap(), metric);
        }
        assert!("rmse".parse::<EvalMetric>().is_err());
    }

    #[test]
    fn test_metric_directions() {
        assert_eq!(EvalMetric::Auc.direction(), MetricDirection::Maximize);
        assert_eq!(EvalMetric::Error.direction(), MetricDirection::Minimize);
        assert!(MetricDirection::Maximize.is_better(0.8, 0.7));
        assert!(!MetricDirection::Minimize.is_better(0.2, 0.2));
    }

    #[test]
    fn test_try_evaluate_rejects_length_mismatch() {
        let p = array![0.5_f32, 0.5];
        let y = array![1.0_f32];
        assert!(EvalMetric::Auc.try_evaluate(&p.view(), &y.view()).is_err());
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&vec![EvalMetric::Auc, EvalMetric::LogLoss]).unwrap();
        assert_eq!(json, "[\"auc\",\"logloss\"]");
    }
}
