//! Dense feature matrix consumed by the booster.

use crate::core::error::{BoostGridError, Result};
use crate::core::types::{Label, Score};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

/// Row-major feature matrix with optional binary labels.
///
/// Missing values are stored as NaN and routed by each split's learned
/// default direction.
#[derive(Debug, Clone, PartialEq)]
pub struct DMatrix {
    features: Array2<Score>,
    labels: Option<Array1<Label>>,
    feature_names: Vec<String>,
}

impl DMatrix {
    /// Create an unlabeled matrix.
    pub fn new(features: Array2<Score>, feature_names: Vec<String>) -> Result<Self> {
        if feature_names.len() != features.ncols() {
            return Err(BoostGridError::dimension_mismatch(
                format!("{} feature names", features.ncols()),
                feature_names.len().to_string(),
            ));
        }
        Ok(DMatrix {
            features,
            labels: None,
            feature_names,
        })
    }

    /// Create a matrix from double precision values.
    pub fn from_f64(features: &Array2<f64>, feature_names: Vec<String>) -> Result<Self> {
        DMatrix::new(features.mapv(|v| v as Score), feature_names)
    }

    /// Attach labels, one per row.
    pub fn with_labels(mut self, labels: Array1<Label>) -> Result<Self> {
        if labels.len() != self.num_rows() {
            return Err(BoostGridError::dimension_mismatch(
                format!("{} labels", self.num_rows()),
                labels.len().to_string(),
            ));
        }
        self.labels = Some(labels);
        Ok(self)
    }

    pub fn num_rows(&self) -> usize {
        self.features.nrows()
    }

    pub fn num_features(&self) -> usize {
        self.features.ncols()
    }

    pub fn features(&self) -> ArrayView2<'_, Score> {
        self.features.view()
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn labels(&self) -> Option<ArrayView1<'_, Label>> {
        self.labels.as_ref().map(|l| l.view())
    }

    /// Labels, or an error naming `context` when the matrix has none.
    pub fn require_labels(&self, context: &str) -> Result<ArrayView1<'_, Label>> {
        self.labels()
            .ok_or_else(|| BoostGridError::dataset(format!("{} requires a labeled matrix", context)))
    }

    /// One row of features.
    pub fn row(&self, index: usize) -> ArrayView1<'_, Score> {
        self.features.row(index)
    }

    /// Feature value at (`row`, `feature`).
    #[inline]
    pub fn value(&self, row: usize, feature: usize) -> Score {
        self.features[[row, feature]]
    }

    /// New matrix holding the given rows, in the given order.
    pub fn slice_rows(&self, indices: &[usize]) -> DMatrix {
        DMatrix {
            features: self.features.select(Axis(0), indices),
            labels: self.labels.as_ref().map(|l| l.select(Axis(0), indices)),
            feature_names: self.feature_names.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("f{}", i)).collect()
    }

    #[test]
    fn test_shapes_are_checked() {
        let features = array![[1.0_f32, 2.0], [3.0, 4.0], [5.0, 6.0]];
        assert!(DMatrix::new(features.clone(), names(3)).is_err());

        let matrix = DMatrix::new(features, names(2)).unwrap();
        assert_eq!(matrix.num_rows(), 3);
        assert_eq!(matrix.num_features(), 2);
        assert!(matrix.labels().is_none());
        assert!(matrix.require_labels("training").is_err());
        assert!(matrix.clone().with_labels(array![1.0, 0.0]).is_err());
    }

    #[test]
    fn test_slice_rows_keeps_labels_aligned() {
        let matrix = DMatrix::from_f64(&array![[1.0, 10.0], [2.0, 20.0], [3.0, 30.0]], names(2))
            .unwrap()
            .with_labels(array![0.0, 1.0, 0.0])
            .unwrap();

        let sliced = matrix.slice_rows(&[2, 1]);
        assert_eq!(sliced.num_rows(), 2);
        assert_eq!(sliced.value(0, 1), 30.0);
        assert_eq!(sliced.labels().unwrap().to_vec(), vec![0.0, 1.0]);
        assert_eq!(sliced.feature_names(), matrix.feature_names());
    }
}
