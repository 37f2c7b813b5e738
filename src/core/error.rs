//! Error handling and error types for boostgrid.
//!
//! Every stage of the pipeline (data preparation, cross-validation, final
//! training, prediction and output) reports failures through
//! [`BoostGridError`]. None of them are retried: the pipeline is a batch job
//! and the first error aborts the run.

use std::io;
use thiserror::Error;

/// Main error type for the boostgrid library.
#[derive(Error, Debug)]
pub enum BoostGridError {
    /// Configuration and validation errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Generic dataset errors (empty tables, missing label columns, ...)
    #[error("Dataset error: {message}")]
    Dataset { message: String },

    /// Feature columns differ between the training table and another table
    #[error(
        "Schema mismatch in {dataset} dataset: missing {missing:?}, extra {extra:?}, reordered: {reordered}"
    )]
    SchemaMismatch {
        dataset: String,
        missing: Vec<String>,
        extra: Vec<String>,
        reordered: bool,
    },

    /// A label value could not be represented as 0 or 1
    #[error("Label coercion failed in {dataset} dataset at row {row}: {value:?} is not a 0/1 label")]
    LabelCoercion {
        dataset: String,
        row: usize,
        value: String,
    },

    /// Training-related errors
    #[error("Training error: {message}")]
    Training { message: String },

    /// Cross-validation errors for one hyperparameter combination
    #[error("Cross-validation failed for combination {combination}: {message}")]
    CrossValidation { combination: usize, message: String },

    /// Model selection errors (empty result set or tie under a strict policy)
    #[error("Selection error: {message}")]
    Selection { message: String },

    /// Prediction errors
    #[error("Prediction error: {message}")]
    Prediction { message: String },

    /// Serialization of reports or configuration files
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// File I/O errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    /// CSV parsing and writing errors
    #[error("CSV error: {source}")]
    Csv {
        #[from]
        source: csv::Error,
    },

    /// JSON serialization errors
    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    /// DataFrame conversion errors
    #[cfg(feature = "polars")]
    #[error("Polars error: {source}")]
    Polars {
        #[from]
        source: polars::prelude::PolarsError,
    },

    /// Invalid input parameters
    #[error("Invalid parameter: {parameter} = {value}, {reason}")]
    InvalidParameter {
        parameter: String,
        value: String,
        reason: String,
    },

    /// Dimension mismatch errors
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: String, actual: String },
}

/// Type alias for Results using BoostGridError
pub type Result<T> = std::result::Result<T, BoostGridError>;

impl BoostGridError {
    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        BoostGridError::Config {
            message: message.into(),
        }
    }

    /// Create a dataset error
    pub fn dataset<S: Into<String>>(message: S) -> Self {
        BoostGridError::Dataset {
            message: message.into(),
        }
    }

    /// Create a training error
    pub fn training<S: Into<String>>(message: S) -> Self {
        BoostGridError::Training {
            message: message.into(),
        }
    }

    /// Create a selection error
    pub fn selection<S: Into<String>>(message: S) -> Self {
        BoostGridError::Selection {
            message: message.into(),
        }
    }

    /// Create a prediction error
    pub fn prediction<S: Into<String>>(message: S) -> Self {
        BoostGridError::Prediction {
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization<S: Into<String>>(message: S) -> Self {
        BoostGridError::Serialization {
            message: message.into(),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter<P, V, R>(parameter: P, value: V, reason: R) -> Self
    where
        P: Into<String>,
        V: Into<String>,
        R: Into<String>,
    {
        BoostGridError::InvalidParameter {
            parameter: parameter.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a dimension mismatch error
    pub fn dimension_mismatch<E, A>(expected: E, actual: A) -> Self
    where
        E: Into<String>,
        A: Into<String>,
    {
        BoostGridError::DimensionMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Wrap an error raised while cross-validating one grid combination.
    pub fn cross_validation(combination: usize, source: BoostGridError) -> Self {
        BoostGridError::CrossValidation {
            combination,
            message: source.to_string(),
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            BoostGridError::Config { .. } => "config",
            BoostGridError::Dataset { .. } => "dataset",
            BoostGridError::SchemaMismatch { .. } => "schema_mismatch",
            BoostGridError::LabelCoercion { .. } => "label_coercion",
            BoostGridError::Training { .. } => "training",
            BoostGridError::CrossValidation { .. } => "cross_validation",
            BoostGridError::Selection { .. } => "selection",
            BoostGridError::Prediction { .. } => "prediction",
            BoostGridError::Serialization { .. } => "serialization",
            BoostGridError::Io { .. } => "io",
            BoostGridError::Csv { .. } => "csv",
            BoostGridError::Json { .. } => "json",
            #[cfg(feature = "polars")]
            BoostGridError::Polars { .. } => "polars",
            BoostGridError::InvalidParameter { .. } => "invalid_parameter",
            BoostGridError::DimensionMismatch { .. } => "dimension_mismatch",
        }
    }

    /// True for errors caused by the input tables rather than by training.
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            BoostGridError::Dataset { .. }
                | BoostGridError::SchemaMismatch { .. }
                | BoostGridError::LabelCoercion { .. }
                | BoostGridError::DimensionMismatch { .. }
        )
    }
}

impl From<toml::de::Error> for BoostGridError {
    fn from(err: toml::de::Error) -> Self {
        BoostGridError::serialization(format!("TOML parse error: {}", err))
    }
}

impl From<toml::ser::Error> for BoostGridError {
    fn from(err: toml::ser::Error) -> Self {
        BoostGridError::serialization(format!("TOML write error: {}", err))
    }
}

impl From<rayon::ThreadPoolBuildError> for BoostGridError {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        BoostGridError::training(format!("failed to build thread pool: {}", err))
    }
}

impl From<ndarray::ShapeError> for BoostGridError {
    fn from(err: ndarray::ShapeError) -> Self {
        BoostGridError::dimension_mismatch("a consistent matrix shape", err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = BoostGridError::config("test config error");
        assert_eq!(err.category(), "config");
        assert!(err.to_string().contains("test config error"));

        let err = BoostGridError::invalid_parameter("eta", "-0.1", "must be in range (0.0, 1.0]");
        assert_eq!(err.category(), "invalid_parameter");
        assert!(err.to_string().contains("eta"));
    }

    #[test]
    fn test_schema_mismatch_message() {
        let err = BoostGridError::SchemaMismatch {
            dataset: "test".to_string(),
            missing: vec!["x2".to_string()],
            extra: vec![],
            reordered: false,
        };
        let msg = err.to_string();
        assert!(msg.contains("test"));
        assert!(msg.contains("x2"));
        assert!(msg.contains("reordered: false"));
        assert!(err.is_data_error());
    }

    #[test]
    fn test_label_coercion_message() {
        let err = BoostGridError::LabelCoercion {
            dataset: "train".to_string(),
            row: 3,
            value: "yes".to_string(),
        };
        assert!(err.to_string().contains("row 3"));
        assert_eq!(err.category(), "label_coercion");
    }

    #[test]
    fn test_cross_validation_wraps_source() {
        let inner = BoostGridError::training("hessian underflow");
        let err = BoostGridError::cross_validation(7, inner);
        assert_eq!(err.category(), "cross_validation");
        assert!(err.to_string().contains("combination 7"));
        assert!(err.to_string().contains("hessian underflow"));
        assert!(!err.is_data_error());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "missing");
        let err: BoostGridError = io_err.into();
        assert_eq!(err.category(), "io");
    }
}
