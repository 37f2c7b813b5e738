//! Core data types for boostgrid.
//!
//! Scalar aliases follow the precision split used by gradient boosting
//! libraries: feature values and predictions are stored as 32-bit floats,
//! while gradient statistics are accumulated in 64-bit floats.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Prediction value type (probability or raw margin).
pub type Score = f32;

/// Binary label type, always 0.0 or 1.0 once a dataset is prepared.
pub type Label = f32;

/// Accumulator type for gradient and hessian sums.
pub type Hist = f64;

/// Feature index type for identifying features in a matrix.
pub type FeatureIndex = usize;

/// Tree node identifier type.
pub type NodeIndex = usize;

/// Boosting round number (1-based when reported to users).
pub type IterationIndex = usize;

/// Learning objective supported by the booster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ObjectiveType {
    /// Logistic regression for binary classification, output is a probability
    #[default]
    #[serde(rename = "binary:logistic")]
    BinaryLogistic,
}

impl fmt::Display for ObjectiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectiveType::BinaryLogistic => write!(f, "binary:logistic"),
        }
    }
}

/// Feature importance types reported for a trained model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImportanceType {
    /// Share of total split gain contributed by the feature
    Gain,
    /// Share of total hessian cover of the feature's splits
    Cover,
    /// Share of splits that use the feature
    Frequency,
}

impl fmt::Display for ImportanceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportanceType::Gain => write!(f, "gain"),
            ImportanceType::Cover => write!(f, "cover"),
            ImportanceType::Frequency => write!(f, "frequency"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_objective_display() {
        assert_eq!(ObjectiveType::default().to_string(), "binary:logistic");
    }

    #[test]
    fn test_objective_serde_name() {
        let json = serde_json::to_string(&ObjectiveType::BinaryLogistic).unwrap();
        assert_eq!(json, "\"binary:logistic\"");
    }

    #[test]
    fn test_importance_display() {
        assert_eq!(ImportanceType::Gain.to_string(), "gain");
        assert_eq!(ImportanceType::Frequency.to_string(), "frequency");
    }
}
