//! Conversion of the three input tables into booster matrices.
//!
//! The training table defines the feature schema; validation and test tables
//! must carry exactly the same feature columns in the same order. Labels are
//! coerced to 0/1 and any value that cannot be represented that way aborts
//! preparation.

use crate::core::error::{BoostGridError, Result};
use crate::core::types::Label;
use crate::dataset::matrix::DMatrix;
use crate::dataset::table::Table;
use ndarray::Array1;
use std::collections::HashSet;

/// Matrices and metadata ready for training and prediction.
#[derive(Debug, Clone)]
pub struct PreparedData {
    /// Labeled training matrix
    pub train: DMatrix,
    /// Labeled validation matrix
    pub valid: DMatrix,
    /// Unlabeled test matrix
    pub test: DMatrix,
    /// Test identifiers in input order
    pub test_ids: Vec<String>,
    /// Feature names shared by all three matrices
    pub feature_names: Vec<String>,
}

/// Prepare train, validation and test tables.
pub fn prepare(train: &Table, valid: &Table, test: &Table) -> Result<PreparedData> {
    let feature_names = train.feature_names().to_vec();
    if feature_names.is_empty() {
        return Err(BoostGridError::dataset(format!(
            "{} table has no feature columns",
            train.name()
        )));
    }

    check_schema(&feature_names, valid)?;
    check_schema(&feature_names, test)?;

    for table in [train, valid] {
        if table.num_rows() == 0 {
            return Err(BoostGridError::dataset(format!("{} table is empty", table.name())));
        }
    }
    if test.num_rows() == 0 {
        log::warn!("{} table is empty, the prediction file will only hold a header", test.name());
    }
    if test.has_labels() {
        log::debug!("Ignoring labels carried by the {} table", test.name());
    }

    let train_matrix = labeled_matrix(train)?;
    let valid_matrix = labeled_matrix(valid)?;
    let test_matrix = DMatrix::from_f64(test.features(), feature_names.clone())?;

    log::info!(
        "Prepared data: train {}x{}, valid {}x{}, test {}x{}",
        train_matrix.num_rows(),
        train_matrix.num_features(),
        valid_matrix.num_rows(),
        valid_matrix.num_features(),
        test_matrix.num_rows(),
        test_matrix.num_features()
    );

    Ok(PreparedData {
        train: train_matrix,
        valid: valid_matrix,
        test: test_matrix,
        test_ids: test.ids().to_vec(),
        feature_names,
    })
}

/// Check that `table` has exactly the `reference` feature columns, in order.
pub fn check_schema(reference: &[String], table: &Table) -> Result<()> {
    let actual = table.feature_names();
    if actual == reference {
        return Ok(());
    }

    let expected: HashSet<&str> = reference.iter().map(String::as_str).collect();
    let present: HashSet<&str> = actual.iter().map(String::as_str).collect();

    let missing: Vec<String> = reference
        .iter()
        .filter(|c| !present.contains(c.as_str()))
        .cloned()
        .collect();
    let extra: Vec<String> = actual
        .iter()
        .filter(|c| !expected.contains(c.as_str()))
        .cloned()
        .collect();
    let reordered = missing.is_empty() && extra.is_empty();

    Err(BoostGridError::SchemaMismatch {
        dataset: table.name().to_string(),
        missing,
        extra,
        reordered,
    })
}

/// Coerce the labels of `table` to a 0/1 vector.
pub fn coerce_labels(table: &Table) -> Result<Array1<Label>> {
    let raw = table.labels().ok_or_else(|| {
        BoostGridError::dataset(format!("{} table has no label column", table.name()))
    })?;

    raw.iter()
        .enumerate()
        .map(|(row, value)| {
            value.coerce().ok_or_else(|| BoostGridError::LabelCoercion {
                dataset: table.name().to_string(),
                row,
                value: value.to_string(),
            })
        })
        .collect::<Result<Vec<_>>>()
        .map(Array1::from)
}

fn labeled_matrix(table: &Table) -> Result<DMatrix> {
    let labels = coerce_labels(table)?;
    let positives = labels.iter().filter(|&&y| y > 0.5).count();
    if positives == 0 || positives == labels.len() {
        log::warn!("{} table contains a single class", table.name());
    }
    DMatrix::from_f64(table.features(), table.feature_names().to_vec())?.with_labels(labels)
}
