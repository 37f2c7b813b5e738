//! Submission tables: per-row probabilities keyed by test identifier.

use crate::booster::Booster;
use crate::core::constants::{
    SUBMISSION_DATE_FORMAT, SUBMISSION_ID_COLUMN, SUBMISSION_PREDICTION_COLUMN, SUBMISSION_PREFIX,
};
use crate::core::error::{BoostGridError, Result};
use crate::core::types::Score;
use crate::dataset::DMatrix;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One output row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionRow {
    pub test_id: String,
    pub predictions: Score,
}

/// Predicted probabilities in test-table order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub rows: Vec<SubmissionRow>,
}

impl Submission {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|row| row.test_id.as_str())
    }

    pub fn predictions(&self) -> impl Iterator<Item = Score> + '_ {
        self.rows.iter().map(|row| row.predictions)
    }
}

/// Predict every row of `test`, pairing it with the identifier at the same position.
pub fn predict_submission(booster: &Booster, test: &DMatrix, ids: &[String]) -> Result<Submission> {
    if ids.len() != test.num_rows() {
        return Err(BoostGridError::dimension_mismatch(
            format!("{} test identifiers", test.num_rows()),
            format!("{} identifiers", ids.len()),
        ));
    }

    let probabilities = booster.predict(test)?;
    let rows = ids
        .iter()
        .zip(probabilities.iter())
        .enumerate()
        .map(|(row, (id, &p))| {
            if !(0.0..=1.0).contains(&p) {
                return Err(BoostGridError::prediction(format!(
                    "row {} ({}) has probability {} outside [0, 1]",
                    row, id, p
                )));
            }
            Ok(SubmissionRow {
                test_id: id.clone(),
                predictions: p,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    log::info!("Predicted {} test rows", rows.len());
    Ok(Submission { rows })
}

/// `submission<YYYYMMDD>.csv`
pub fn submission_file_name(date: NaiveDate) -> String {
    format!("{}{}.csv", SUBMISSION_PREFIX, date.format(SUBMISSION_DATE_FORMAT))
}

/// Write `submission` to `dir`, replacing any file of the same date.
pub fn write_submission<P: AsRef<Path>>(submission: &Submission, dir: P, date: NaiveDate) -> Result<PathBuf> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;
    let path = dir.join(submission_file_name(date));

    let mut writer = csv::Writer::from_path(&path)?;
    writer.write_record([SUBMISSION_ID_COLUMN, SUBMISSION_PREDICTION_COLUMN])?;
    for row in &submission.rows {
        writer.write_record([row.test_id.as_str(), row.predictions.to_string().as_str()])?;
    }
    writer.flush()?;

    log::info!("Submission with {} rows written to {}", submission.len(), path.display());
    Ok(path)
}
