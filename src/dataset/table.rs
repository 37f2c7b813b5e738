//! Typed tabular records.
//!
//! A [`Table`] is what the external loading stage hands to the pipeline: an
//! identifier per row, a block of numeric features, and for labeled tables
//! the raw label values. Identifier and label columns are separated from the
//! features when the table is built, according to a [`TableSchema`].

use crate::core::error::{BoostGridError, Result};
use crate::core::types::Label;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Names of the non-feature columns of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Column holding the row identifier
    pub id_column: String,
    /// Column holding the binary label, if the table is labeled
    pub label_column: Option<String>,
}

impl TableSchema {
    /// Schema for an unlabeled table.
    pub fn unlabeled<S: Into<String>>(id_column: S) -> Self {
        TableSchema {
            id_column: id_column.into(),
            label_column: None,
        }
    }

    /// Schema for a labeled table.
    pub fn labeled<S: Into<String>, L: Into<String>>(id_column: S, label_column: L) -> Self {
        TableSchema {
            id_column: id_column.into(),
            label_column: Some(label_column.into()),
        }
    }

    /// True when `column` is the identifier or the label column.
    pub fn is_reserved(&self, column: &str) -> bool {
        column == self.id_column || self.label_column.as_deref() == Some(column)
    }
}

/// A label value as it appeared in the source table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RawLabel {
    /// Numeric cell
    Number(f64),
    /// Boolean cell
    Bool(bool),
    /// Text cell that was not parsed
    Text(String),
    /// Empty cell
    Missing,
}

impl RawLabel {
    /// Parse a text cell, keeping unparseable text as [`RawLabel::Text`].
    pub fn parse(cell: &str) -> Self {
        let trimmed = cell.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("na") {
            return RawLabel::Missing;
        }
        if let Ok(value) = trimmed.parse::<f64>() {
            return RawLabel::Number(value);
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "true" => RawLabel::Bool(true),
            "false" => RawLabel::Bool(false),
            _ => RawLabel::Text(trimmed.to_string()),
        }
    }

    /// The 0/1 label this value stands for, if any.
    pub fn coerce(&self) -> Option<Label> {
        match self {
            RawLabel::Number(v) if *v == 0.0 => Some(0.0),
            RawLabel::Number(v) if *v == 1.0 => Some(1.0),
            RawLabel::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            RawLabel::Text(text) => RawLabel::parse(text).coerce_parsed(),
            _ => None,
        }
    }

    // A Text that parses to Text again is not a label.
    fn coerce_parsed(&self) -> Option<Label> {
        match self {
            RawLabel::Text(_) => None,
            other => other.coerce(),
        }
    }
}

impl fmt::Display for RawLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawLabel::Number(v) => write!(f, "{}", v),
            RawLabel::Bool(b) => write!(f, "{}", b),
            RawLabel::Text(s) => write!(f, "{}", s),
            RawLabel::Missing => write!(f, "<missing>"),
        }
    }
}

impl From<f64> for RawLabel {
    fn from(value: f64) -> Self {
        if value.is_nan() {
            RawLabel::Missing
        } else {
            RawLabel::Number(value)
        }
    }
}

impl From<bool> for RawLabel {
    fn from(value: bool) -> Self {
        RawLabel::Bool(value)
    }
}

impl From<&str> for RawLabel {
    fn from(value: &str) -> Self {
        RawLabel::parse(value)
    }
}

/// Parse a feature cell; empty cells and `NA` become NaN.
pub fn parse_feature_cell(cell: &str) -> Option<f64> {
    let trimmed = cell.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("na") || trimmed.eq_ignore_ascii_case("nan") {
        return Some(f64::NAN);
    }
    trimmed.parse::<f64>().ok()
}

/// Tabular dataset with features separated from identifier and label.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    name: String,
    feature_names: Vec<String>,
    ids: Vec<String>,
    features: Array2<f64>,
    labels: Option<Vec<RawLabel>>,
}

impl Table {
    /// Create a table, checking that every part has one entry per row.
    pub fn new<S: Into<String>>(
        name: S,
        feature_names: Vec<String>,
        ids: Vec<String>,
        features: Array2<f64>,
        labels: Option<Vec<RawLabel>>,
    ) -> Result<Self> {
        let name = name.into();
        let (num_rows, num_features) = features.dim();

        if feature_names.len() != num_features {
            return Err(BoostGridError::dimension_mismatch(
                format!("{} feature names", num_features),
                format!("{} in {} table", feature_names.len(), name),
            ));
        }
        if ids.len() != num_rows {
            return Err(BoostGridError::dimension_mismatch(
                format!("{} identifiers", num_rows),
                format!("{} in {} table", ids.len(), name),
            ));
        }
        if let Some(labels) = &labels {
            if labels.len() != num_rows {
                return Err(BoostGridError::dimension_mismatch(
                    format!("{} labels", num_rows),
                    format!("{} in {} table", labels.len(), name),
                ));
            }
        }

        let mut seen = HashSet::with_capacity(feature_names.len());
        for feature in &feature_names {
            if !seen.insert(feature.as_str()) {
                return Err(BoostGridError::dataset(format!(
                    "duplicate feature column {:?} in {} table",
                    feature, name
                )));
            }
        }

        Ok(Table {
            name,
            feature_names,
            ids,
            features,
            labels,
        })
    }

    /// Build a table from a header and text rows.
    ///
    /// Columns named by `schema` become the identifier and label; every other
    /// column is a numeric feature, kept in header order.
    pub fn from_text_rows<S, R>(name: S, schema: &TableSchema, header: &[String], rows: R) -> Result<Self>
    where
        S: Into<String>,
        R: IntoIterator<Item = Vec<String>>,
    {
        let name = name.into();
        let id_index = header
            .iter()
            .position(|h| *h == schema.id_column)
            .ok_or_else(|| {
                BoostGridError::dataset(format!(
                    "identifier column {:?} not found in {} table",
                    schema.id_column, name
                ))
            })?;
        let label_index = match &schema.label_column {
            Some(label) => Some(header.iter().position(|h| h == label).ok_or_else(|| {
                BoostGridError::dataset(format!(
                    "label column {:?} not found in {} table",
                    label, name
                ))
            })?),
            None => None,
        };

        let feature_columns: Vec<usize> = (0..header.len())
            .filter(|&i| !schema.is_reserved(&header[i]))
            .collect();
        let feature_names: Vec<String> = feature_columns.iter().map(|&i| header[i].clone()).collect();

        let mut ids = Vec::new();
        let mut labels = label_index.map(|_| Vec::new());
        let mut values = Vec::new();

        for (row_index, row) in rows.into_iter().enumerate() {
            if row.len() != header.len() {
                return Err(BoostGridError::dimension_mismatch(
                    format!("{} fields", header.len()),
                    format!("{} fields in row {} of {} table", row.len(), row_index, name),
                ));
            }

            ids.push(row[id_index].clone());
            if let (Some(index), Some(labels)) = (label_index, labels.as_mut()) {
                labels.push(RawLabel::parse(&row[index]));
            }
            for &column in &feature_columns {
                let value = parse_feature_cell(&row[column]).ok_or_else(|| {
                    BoostGridError::dataset(format!(
                        "non-numeric value {:?} in column {:?}, row {} of {} table",
                        row[column], header[column], row_index, name
                    ))
                })?;
                values.push(value);
            }
        }

        let features = Array2::from_shape_vec((ids.len(), feature_names.len()), values)?;
        Table::new(name, feature_names, ids, features, labels)
    }

    /// Dataset name used in error messages ("train", "valid", "test").
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the table.
    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = name.into();
        self
    }

    /// Feature column names in order.
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Row identifiers in order.
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Feature values, NaN for missing cells.
    pub fn features(&self) -> &Array2<f64> {
        &self.features
    }

    /// Raw labels, if the table is labeled.
    pub fn labels(&self) -> Option<&[RawLabel]> {
        self.labels.as_deref()
    }

    /// Number of rows.
    pub fn num_rows(&self) -> usize {
        self.features.nrows()
    }

    /// Number of feature columns.
    pub fn num_features(&self) -> usize {
        self.features.ncols()
    }

    /// True when the table carries labels.
    pub fn has_labels(&self) -> bool {
        self.labels.is_some()
    }
}
