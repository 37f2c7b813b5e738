//! Polars DataFrame adapter.
//!
//! Converts an in-memory [`DataFrame`] handed over by an upstream loading
//! stage into a [`Table`]. Identifier values are rendered as strings so that
//! the prediction file reproduces them exactly.

use crate::core::error::{BoostGridError, Result};
use crate::dataset::table::{RawLabel, Table, TableSchema};
use ndarray::Array2;
use polars::prelude::*;

/// Build a [`Table`] from a DataFrame.
pub fn table_from_dataframe(df: &DataFrame, name: &str, schema: &TableSchema) -> Result<Table> {
    log::debug!("Converting {} DataFrame with shape {:?}", name, df.shape());

    let columns: Vec<String> = df
        .get_column_names()
        .into_iter()
        .map(|c| c.as_str().to_string())
        .collect();

    if !columns.iter().any(|c| *c == schema.id_column) {
        return Err(BoostGridError::dataset(format!(
            "identifier column {:?} not found in {} table",
            schema.id_column, name
        )));
    }

    let ids = extract_ids(df, &schema.id_column)?;

    let labels = match &schema.label_column {
        Some(label) => {
            if !columns.iter().any(|c| c == label) {
                return Err(BoostGridError::dataset(format!(
                    "label column {:?} not found in {} table",
                    label, name
                )));
            }
            Some(extract_labels(df, label)?)
        }
        None => None,
    };

    let feature_names: Vec<String> = columns
        .into_iter()
        .filter(|c| !schema.is_reserved(c))
        .collect();

    let mut features = Array2::<f64>::zeros((df.height(), feature_names.len()));
    for (feature_idx, feature) in feature_names.iter().enumerate() {
        let series = df.column(feature)?.as_materialized_series();
        if matches!(series.dtype(), DataType::String) {
            return Err(BoostGridError::dataset(format!(
                "feature column {:?} of {} table is not numeric",
                feature, name
            )));
        }

        let values = series.cast(&DataType::Float64)?;
        for (row_idx, value) in values.f64()?.into_iter().enumerate() {
            features[[row_idx, feature_idx]] = value.unwrap_or(f64::NAN);
        }
    }

    Table::new(name, feature_names, ids, features, labels)
}

fn extract_ids(df: &DataFrame, column: &str) -> Result<Vec<String>> {
    let series = df.column(column)?.as_materialized_series();
    let as_text = series.cast(&DataType::String)?;
    let ids = as_text
        .str()?
        .into_iter()
        .map(|v| v.unwrap_or_default().to_string())
        .collect();
    Ok(ids)
}

fn extract_labels(df: &DataFrame, column: &str) -> Result<Vec<RawLabel>> {
    let series = df.column(column)?.as_materialized_series();

    let labels = match series.dtype() {
        DataType::Boolean => series
            .bool()?
            .into_iter()
            .map(|v| v.map(RawLabel::Bool).unwrap_or(RawLabel::Missing))
            .collect(),
        DataType::String => series
            .str()?
            .into_iter()
            .map(|v| v.map(RawLabel::parse).unwrap_or(RawLabel::Missing))
            .collect(),
        _ => {
            let numeric = series.cast(&DataType::Float64)?;
            numeric
                .f64()?
                .into_iter()
                .map(|v| v.map(RawLabel::from).unwrap_or(RawLabel::Missing))
                .collect()
        }
    };

    Ok(labels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_from_dataframe() {
        let df = df![
            "id" => &[10i64, 11, 12],
            "x1" => &[Some(1.0), None, Some(3.0)],
            "target" => &[1i32, 0, 1],
            "x2" => &[0.5f32, 0.25, 0.125],
        ]
        .unwrap();

        let table = table_from_dataframe(&df, "train", &TableSchema::labeled("id", "target")).unwrap();
        assert_eq!(table.ids(), &["10".to_string(), "11".to_string(), "12".to_string()]);
        assert_eq!(table.feature_names(), &["x1".to_string(), "x2".to_string()]);
        assert!(table.features()[[1, 0]].is_nan());
        assert_eq!(table.features()[[2, 1]], 0.125);
        assert_eq!(table.labels().unwrap()[0], RawLabel::Number(1.0));
    }

    #[test]
    fn test_boolean_and_text_labels() {
        let df = df![
            "id" => &["a", "b"],
            "x1" => &[1.0, 2.0],
            "flag" => &[true, false],
        ]
        .unwrap();
        let table = table_from_dataframe(&df, "valid", &TableSchema::labeled("id", "flag")).unwrap();
        assert_eq!(table.labels().unwrap()[1].coerce(), Some(0.0));

        let df = df![
            "id" => &["a", "b"],
            "x1" => &[1.0, 2.0],
            "flag" => &["1", "no"],
        ]
        .unwrap();
        let table = table_from_dataframe(&df, "valid", &TableSchema::labeled("id", "flag")).unwrap();
        assert_eq!(table.labels().unwrap()[0].coerce(), Some(1.0));
        assert_eq!(table.labels().unwrap()[1].coerce(), None);
    }

    #[test]
    fn test_text_feature_rejected() {
        let df = df![
            "id" => &["a"],
            "color" => &["red"],
        ]
        .unwrap();
        assert!(table_from_dataframe(&df, "test", &TableSchema::unlabeled("id")).is_err());
    }
}
