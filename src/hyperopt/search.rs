//! Exhaustive grid search.

use crate::config::BoosterParams;
use crate::core::error::{BoostGridError, Result};
use crate::dataset::DMatrix;
use crate::hyperopt::cv::{cross_validate, CrossValidationConfig, CvResult};
use crate::hyperopt::grid::{CombinationId, HyperparameterGrid, ParamCombination};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;

/// Cross-validation outcome of one grid combination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridEntry {
    pub combination: ParamCombination,
    /// Full booster parameters the combination was cross-validated with
    pub params: BoosterParams,
    pub cv: CvResult,
}

/// Results of every grid combination, keyed by combination.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GridSearchResult {
    pub entries: BTreeMap<CombinationId, GridEntry>,
}

impl GridSearchResult {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: CombinationId) -> Option<&GridEntry> {
        self.entries.get(&id)
    }

    /// Entries in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (&CombinationId, &GridEntry)> {
        self.entries.iter()
    }

    /// Write every entry, with its full round history, as pretty JSON.
    pub fn write_report<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(std::io::BufWriter::new(file), self)?;
        log::info!("Grid search report written to {}", path.display());
        Ok(())
    }
}

/// Cross-validate every combination of `grid` on `dtrain`.
///
/// `base` supplies the settings the grid does not tune (lambda, threads,
/// seed). The first failing combination aborts the search.
pub fn grid_search(
    grid: &HyperparameterGrid,
    base: &BoosterParams,
    dtrain: &DMatrix,
    config: &CrossValidationConfig,
) -> Result<GridSearchResult> {
    grid.validate()?;
    config.validate()?;

    let combinations = grid.combinations();
    let total = combinations.len();
    log::info!(
        "Grid search: {} combinations, {}-fold CV, up to {} rounds",
        total,
        config.nfold,
        config.num_boost_round
    );

    let mut result = GridSearchResult::default();
    for (id, combination) in combinations {
        let params = combination.apply(base);
        log::info!("[{}/{}] {}", id.index() + 1, total, combination);

        let started = Instant::now();
        let cv = cross_validate(&params, dtrain, config)
            .map_err(|e| BoostGridError::cross_validation(id.index(), e))?;

        log::info!(
            "[{}/{}] best round {}: auc {:.6}, error {}; final auc {:.6} after {} rounds ({:.1?})",
            id.index() + 1,
            total,
            cv.best_round,
            cv.best_auc,
            cv.best_error
                .map_or_else(|| "n/a".to_string(), |e| format!("{:.6}", e)),
            cv.final_auc,
            cv.rounds_run,
            started.elapsed()
        );

        result.entries.insert(
            id,
            GridEntry {
                combination,
                params,
                cv,
            },
        );
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array1, Array2};
    use tempfile::tempdir;

    fn matrix() -> DMatrix {
        let features = Array2::from_shape_fn((60, 2), |(r, c)| ((r * 13 + c * 7) % 23) as f64);
        let labels = Array1::from_iter((0..60).map(|r| if (r * 13) % 23 > 11 { 1.0 } else { 0.0 }));
        DMatrix::from_f64(&features, vec!["u".into(), "v".into()])
            .unwrap()
            .with_labels(labels)
            .unwrap()
    }

    fn small_grid() -> HyperparameterGrid {
        HyperparameterGrid {
            max_depth: vec![2, 3],
            eta: vec![0.3],
            subsample: vec![1.0],
            colsample_bytree: vec![1.0],
            gamma: vec![0.0],
            min_child_weight: vec![1.0],
            alpha: vec![0.0],
        }
    }

    fn quick_cv() -> CrossValidationConfig {
        CrossValidationConfig::default()
            .with_nfold(3)
            .with_num_boost_round(5)
    }

    #[test]
    fn test_every_combination_has_an_entry() {
        let base = BoosterParams {
            nthread: 1,
            ..BoosterParams::default()
        };
        let result = grid_search(&small_grid(), &base, &matrix(), &quick_cv()).unwrap();

        assert_eq!(result.len(), 2);
        let ids: Vec<CombinationId> = result.entries.keys().copied().collect();
        assert_eq!(ids, vec![CombinationId(0), CombinationId(1)]);
        for (_, entry) in result.iter() {
            assert!(entry.cv.best_round >= 1 && entry.cv.best_round <= 5);
            assert_eq!(entry.params.nthread, 1);
            assert_eq!(entry.params.max_depth, entry.combination.max_depth);
        }
    }

    #[test]
    fn test_failure_aborts_search() {
        let dtrain = matrix().slice_rows(&[0, 1]);
        let err = grid_search(&small_grid(), &BoosterParams::default(), &dtrain, &quick_cv()).unwrap_err();
        assert_eq!(err.category(), "cross_validation");
        assert!(err.to_string().contains("combination 0"));
    }

    #[test]
    fn test_report_is_json() {
        let result = grid_search(&small_grid(), &BoosterParams::default(), &matrix(), &quick_cv()).unwrap();
        let dir = tempdir().unwrap();
        let path = dir.path().join("reports/grid.json");
        result.write_report(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let parsed: GridSearchResult = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(
            parsed.get(CombinationId(1)).unwrap().cv.best_round,
            result.get(CombinationId(1)).unwrap().cv.best_round
        );
    }
}
