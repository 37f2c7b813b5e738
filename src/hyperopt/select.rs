//! Selection of the winning grid combination.

use crate::config::BoosterParams;
use crate::core::error::{BoostGridError, Result};
use crate::core::types::IterationIndex;
use crate::hyperopt::grid::{CombinationId, ParamCombination};
use crate::hyperopt::search::GridSearchResult;
use serde::{Deserialize, Serialize};

/// Resolution of ties at the maximal AUC.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TieBreak {
    /// Earliest tied combination in canonical order
    #[default]
    First,
    /// Latest tied combination in canonical order
    Last,
    /// Ties are an error
    Unique,
}

/// The combination final training uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedConfiguration {
    pub id: CombinationId,
    pub combination: ParamCombination,
    pub params: BoosterParams,
    /// Number of rounds final training runs
    pub best_round: IterationIndex,
    /// Mean held-out AUC at `best_round`
    pub auc: f64,
}

/// Pick the combination with the highest cross-validated AUC.
pub fn select_best(results: &GridSearchResult, tie_break: TieBreak) -> Result<SelectedConfiguration> {
    if results.is_empty() {
        return Err(BoostGridError::selection("no grid results to select from"));
    }

    let best_auc = results
        .iter()
        .map(|(_, entry)| entry.cv.best_auc)
        .filter(|auc| !auc.is_nan())
        .fold(f64::NEG_INFINITY, f64::max);
    if best_auc == f64::NEG_INFINITY {
        return Err(BoostGridError::selection("every grid result has an undefined AUC"));
    }

    let tied: Vec<CombinationId> = results
        .iter()
        .filter(|(_, entry)| entry.cv.best_auc == best_auc)
        .map(|(id, _)| *id)
        .collect();

    let chosen = match (tie_break, tied.as_slice()) {
        (_, [only]) => *only,
        (TieBreak::First, [first, ..]) => *first,
        (TieBreak::Last, [.., last]) => *last,
        (TieBreak::Unique, ids) => {
            return Err(BoostGridError::selection(format!(
                "{} combinations tie at auc {}: {:?}",
                ids.len(),
                best_auc,
                ids.iter().map(|id| id.index()).collect::<Vec<_>>()
            )))
        }
        (_, []) => return Err(BoostGridError::selection("no combination reached the maximal AUC")),
    };

    if tied.len() > 1 {
        log::warn!(
            "{} combinations tie at auc {:.6}; keeping combination {} ({:?})",
            tied.len(),
            best_auc,
            chosen,
            tie_break
        );
    }

    let entry = results
        .get(chosen)
        .ok_or_else(|| BoostGridError::selection(format!("combination {} vanished", chosen)))?;

    log::info!(
        "Selected combination {}: {} (auc {:.6} at round {})",
        chosen,
        entry.combination,
        entry.cv.best_auc,
        entry.cv.best_round
    );

    Ok(SelectedConfiguration {
        id: chosen,
        combination: entry.combination,
        params: entry.params.clone(),
        best_round: entry.cv.best_round,
        auc: entry.cv.best_auc,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hyperopt::cv::CvResult;
    use crate::hyperopt::grid::HyperparameterGrid;
    use crate::hyperopt::search::GridEntry;
    use proptest::prelude::*;

    fn results(aucs: &[f64]) -> GridSearchResult {
        let combinations = HyperparameterGrid::default().combinations();
        let mut result = GridSearchResult::default();
        for (i, &auc) in aucs.iter().enumerate() {
            let (id, combination) = combinations[i];
            result.entries.insert(
                id,
                GridEntry {
                    combination,
                    params: combination.apply(&BoosterParams::default()),
                    cv: CvResult {
                        history: Vec::new(),
                        best_round: i + 10,
                        best_auc: auc,
                        best_error: Some(0.1),
                        final_auc: auc,
                        final_error: Some(0.1),
                        rounds_run: i + 60,
                        stopped_early: true,
                    },
                },
            );
        }
        result
    }

    #[test]
    fn test_picks_maximum() {
        let selected = select_best(&results(&[0.71, 0.78, 0.74]), TieBreak::First).unwrap();
        assert_eq!(selected.id, CombinationId(1));
        assert_eq!(selected.best_round, 11);
        assert_eq!(selected.auc, 0.78);
        assert_eq!(selected.params.max_depth, selected.combination.max_depth);
    }

    #[test]
    fn test_tie_policies() {
        let tied = results(&[0.7, 0.8, 0.6, 0.8]);
        assert_eq!(select_best(&tied, TieBreak::First).unwrap().id, CombinationId(1));
        assert_eq!(select_best(&tied, TieBreak::Last).unwrap().id, CombinationId(3));

        let err = select_best(&tied, TieBreak::Unique).unwrap_err();
        assert_eq!(err.category(), "selection");

        let single = results(&[0.7, 0.8, 0.6]);
        assert_eq!(select_best(&single, TieBreak::Unique).unwrap().id, CombinationId(1));
    }

    #[test]
    fn test_nan_never_wins() {
        let selected = select_best(&results(&[f64::NAN, 0.6]), TieBreak::First).unwrap();
        assert_eq!(selected.id, CombinationId(1));

        assert!(select_best(&results(&[f64::NAN, f64::NAN]), TieBreak::First).is_err());
        assert!(select_best(&GridSearchResult::default(), TieBreak::First).is_err());
    }

    proptest! {
        #[test]
        fn selected_auc_dominates(aucs in proptest::collection::vec(0.0f64..1.0, 1..24)) {
            let grid = results(&aucs);
            let selected = select_best(&grid, TieBreak::First).unwrap();
            for (id, entry) in grid.iter() {
                prop_assert!(selected.auc >= entry.cv.best_auc);
                if entry.cv.best_auc == selected.auc {
                    prop_assert!(selected.id <= *id);
                }
            }
        }
    }
}
