//! Common test utilities for boostgrid integration tests.

#![allow(dead_code)]

use boostgrid::*;
use boostgrid::hyperopt::ParamCombination;
use ndarray::Array2;
use rand::prelude::*;
use std::fs;
use std::path::Path;

/// Feature names `feature_0..feature_{n-1}`
pub fn feature_names(num_features: usize) -> Vec<String> {
    (0..num_features).map(|i| format!("feature_{}", i)).collect()
}

/// Features uniform in [-3, 3) with a fraction of cells missing
pub fn create_test_features(num_samples: usize, num_features: usize, missing_rate: f64, seed: u64) -> Array2<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut features = Array2::zeros((num_samples, num_features));

    for i in 0..num_samples {
        for j in 0..num_features {
            features[[i, j]] = if rng.gen::<f64>() < missing_rate {
                f64::NAN
            } else {
                rng.gen_range(-3.0..3.0)
            };
        }
    }

    features
}

/// Noisy linear decision boundary over the first two features
pub fn create_test_labels(features: &Array2<f64>, seed: u64) -> Vec<RawLabel> {
    let mut rng = StdRng::seed_from_u64(seed.wrapping_add(1));
    features
        .rows()
        .into_iter()
        .map(|row| {
            let a = if row[0].is_nan() { 0.0 } else { row[0] };
            let b = if row.len() > 1 && !row[1].is_nan() { row[1] } else { 0.0 };
            let noise: f64 = rng.gen_range(-0.5..0.5);
            RawLabel::Number(if a - 0.5 * b + noise > 0.0 { 1.0 } else { 0.0 })
        })
        .collect()
}

/// A synthetic table; ids are `{name}_{row}`
pub fn create_test_table(name: &str, num_samples: usize, num_features: usize, labeled: bool, seed: u64) -> Table {
    let features = create_test_features(num_samples, num_features, 0.05, seed);
    let labels = labeled.then(|| create_test_labels(&features, seed));
    let ids = (0..num_samples).map(|i| format!("{}_{}", name, i)).collect();
    Table::new(name, feature_names(num_features), ids, features, labels).unwrap()
}

/// Write a table as CSV with `id` first and `target` last; NaN is written as an empty cell
pub fn create_test_csv<P: AsRef<Path>>(path: P, table: &Table) -> std::io::Result<()> {
    let mut content = String::from("id,");
    content.push_str(&table.feature_names().join(","));
    if table.has_labels() {
        content.push_str(",target");
    }
    content.push('\n');

    for (i, id) in table.ids().iter().enumerate() {
        content.push_str(id);
        for value in table.features().row(i) {
            content.push(',');
            if !value.is_nan() {
                content.push_str(&value.to_string());
            }
        }
        if let Some(labels) = table.labels() {
            content.push(',');
            content.push_str(&labels[i].to_string());
        }
        content.push('\n');
    }

    fs::write(path, content)
}

/// The single combination of the documented example scenario
pub fn example_combination() -> ParamCombination {
    ParamCombination {
        max_depth: 6,
        eta: 0.05,
        subsample: 1.0,
        colsample_bytree: 0.8,
        gamma: 0.05,
        min_child_weight: 2.0,
        alpha: 0.0,
    }
}

/// A configuration small enough for integration tests, writing under `dir`
pub fn create_test_config(dir: &Path) -> PipelineConfig {
    let mut config = PipelineConfig::default();
    config.grid = HyperparameterGrid::single(example_combination());
    config.cv = CrossValidationConfig::default()
        .with_nfold(5)
        .with_num_boost_round(40)
        .with_early_stopping_rounds(Some(10));
    config.booster.nthread = 2;
    config.output.dir = dir.join("output");
    config
}
