//! End-to-end run: prepare, search, select, train, predict.

use crate::config::PipelineConfig;
use crate::core::error::Result;
use crate::dataset::{prepare, Table};
use crate::hyperopt::{grid_search, select_best, GridSearchResult, SelectedConfiguration};
use crate::prediction::{
    predict_submission, render_dump, write_dump, write_submission, ImportanceReport, Submission,
};
use crate::training::{train_final, TrainedModel};
use chrono::NaiveDate;
use std::path::PathBuf;
use std::time::Instant;

/// Everything a pipeline run produced.
#[derive(Debug)]
pub struct PipelineOutcome {
    pub selected: SelectedConfiguration,
    pub grid: GridSearchResult,
    pub model: TrainedModel,
    pub submission: Submission,
    /// Path of the written submission file
    pub output_path: PathBuf,
}

/// Grid search, selection, final training and prediction for one dataset triple.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Pipeline { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run with today's local date in the submission file name.
    pub fn run(&self, train: &Table, valid: &Table, test: &Table) -> Result<PipelineOutcome> {
        self.run_with_date(train, valid, test, chrono::Local::now().date_naive())
    }

    pub fn run_with_date(
        &self,
        train: &Table,
        valid: &Table,
        test: &Table,
        date: NaiveDate,
    ) -> Result<PipelineOutcome> {
        let config = &self.config;
        config.validate()?;
        let started = Instant::now();
        log::info!("{}", config.summary());

        let data = prepare(train, valid, test)?;

        let grid = grid_search(&config.grid, &config.booster, &data.train, &config.cv)?;
        if let Some(path) = &config.output.report_path {
            grid.write_report(path)?;
        }

        let selected = select_best(&grid, config.selection.tie_break)?;

        let model = train_final(
            &selected.params,
            selected.best_round,
            &data.train,
            &data.valid,
            &config.training,
        )?;

        let importance = ImportanceReport::from_booster(&model.booster);
        log::info!("Feature importance:\n{}", importance.render());
        log::debug!("Model dump:\n{}", render_dump(&model.booster, true));
        if let Some(path) = &config.output.importance_path {
            importance.write_to_file(path)?;
        }
        if let Some(path) = &config.output.dump_path {
            write_dump(&model.booster, path)?;
        }

        let submission = predict_submission(&model.booster, &data.test, &data.test_ids)?;
        let output_path = write_submission(&submission, &config.output.dir, date)?;

        log::info!(
            "Pipeline finished in {:.1?}: combination {} with {} rounds, auc {:.6}",
            started.elapsed(),
            selected.id,
            selected.best_round,
            selected.auc
        );

        Ok(PipelineOutcome {
            selected,
            grid,
            model,
            submission,
            output_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::RawLabel;
    use crate::hyperopt::{HyperparameterGrid, ParamCombination};
    use ndarray::Array2;

    fn table(name: &str, rows: usize, offset: usize, labeled: bool) -> Table {
        let features = Array2::from_shape_fn((rows, 2), |(r, c)| ((r + offset) * (c + 3) % 17) as f64);
        let labels = labeled.then(|| {
            (0..rows)
                .map(|r| RawLabel::Number(if (r + offset) * 3 % 17 > 8 { 1.0 } else { 0.0 }))
                .collect()
        });
        Table::new(
            name,
            vec!["a".into(), "b".into()],
            (0..rows).map(|r| format!("{}-{}", name, r)).collect(),
            features,
            labels,
        )
        .unwrap()
    }

    #[test]
    fn test_run_writes_submission() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = PipelineConfig::default();
        config.grid = HyperparameterGrid::single(ParamCombination {
            max_depth: 3,
            eta: 0.3,
            subsample: 1.0,
            colsample_bytree: 1.0,
            gamma: 0.0,
            min_child_weight: 1.0,
            alpha: 0.0,
        });
        config.cv = config.cv.with_nfold(3).with_num_boost_round(8);
        config.output.dir = dir.path().join("out");
        config.output.importance_path = Some(dir.path().join("importance.txt"));

        let date = NaiveDate::from_ymd_opt(2023, 12, 1).unwrap();
        let outcome = Pipeline::new(config)
            .run_with_date(
                &table("train", 60, 0, true),
                &table("valid", 20, 5, true),
                &table("test", 12, 9, false),
                date,
            )
            .unwrap();

        assert_eq!(outcome.output_path, dir.path().join("out/submission20231201.csv"));
        assert_eq!(outcome.submission.len(), 12);
        assert_eq!(outcome.model.num_rounds(), outcome.selected.best_round);
        assert!(dir.path().join("importance.txt").exists());
        assert_eq!(outcome.grid.len(), 1);
    }

    #[test]
    fn test_invalid_config_fails_before_training() {
        let mut config = PipelineConfig::default();
        config.grid.eta.clear();
        let err = Pipeline::new(config)
            .run(
                &table("train", 10, 0, true),
                &table("valid", 5, 0, true),
                &table("test", 5, 0, false),
            )
            .unwrap_err();
        assert!(err.to_string().to_lowercase().contains("eta"));
    }
}
