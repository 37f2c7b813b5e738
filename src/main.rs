//! `boostgrid [config.toml]`
//!
//! Reads the train, validation and test CSV files named in the configuration,
//! runs the grid search pipeline and writes the dated submission file.

use anyhow::{Context, Result};
use boostgrid::config::{PipelineConfig, DEFAULT_CONFIG_FILE};
use boostgrid::dataset::{CsvLoader, TableSchema};
use boostgrid::pipeline::Pipeline;
use std::path::PathBuf;

fn load_config() -> Result<PipelineConfig> {
    let explicit = std::env::args_os().nth(1).map(PathBuf::from);
    let path = match explicit {
        Some(path) => path,
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            if !default.exists() {
                log::info!("No {} found, using default configuration", DEFAULT_CONFIG_FILE);
                return Ok(PipelineConfig::default());
            }
            default
        }
    };

    PipelineConfig::load_from_file(&path)
        .with_context(|| format!("failed to load configuration from {}", path.display()))
}

fn main() -> Result<()> {
    boostgrid::init();

    let config = load_config()?;
    let data = &config.data;

    let labeled = CsvLoader::new(TableSchema::labeled(&data.id_column, &data.label_column))
        .with_delimiter(data.delimiter);
    let unlabeled = CsvLoader::new(TableSchema::unlabeled(&data.id_column)).with_delimiter(data.delimiter);

    let train = labeled
        .load(&data.train_path, "train")
        .with_context(|| format!("failed to read {}", data.train_path.display()))?;
    let valid = labeled
        .load(&data.valid_path, "valid")
        .with_context(|| format!("failed to read {}", data.valid_path.display()))?;
    let test = unlabeled
        .load(&data.test_path, "test")
        .with_context(|| format!("failed to read {}", data.test_path.display()))?;

    let outcome = Pipeline::new(config).run(&train, &valid, &test)?;
    log::info!(
        "Wrote {} predictions to {}",
        outcome.submission.len(),
        outcome.output_path.display()
    );
    Ok(())
}
