//! CSV table loader.
//!
//! Reads a headed CSV file into a [`Table`], splitting off the identifier and
//! label columns named by the loader's [`TableSchema`].

use crate::core::error::{BoostGridError, Result};
use crate::dataset::table::{Table, TableSchema};
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// CSV-specific configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsvConfig {
    /// Field delimiter
    pub delimiter: char,
    /// Quote character
    pub quote_char: char,
    /// Lines starting with this character are skipped
    pub comment_char: Option<char>,
    /// Maximum number of data rows to read
    pub max_rows: Option<usize>,
}

impl Default for CsvConfig {
    fn default() -> Self {
        CsvConfig {
            delimiter: ',',
            quote_char: '"',
            comment_char: None,
            max_rows: None,
        }
    }
}

/// CSV table loader
#[derive(Debug, Clone)]
pub struct CsvLoader {
    schema: TableSchema,
    csv_config: CsvConfig,
}

impl CsvLoader {
    /// Create a loader for tables with the given schema
    pub fn new(schema: TableSchema) -> Self {
        CsvLoader {
            schema,
            csv_config: CsvConfig::default(),
        }
    }

    /// Replace the CSV configuration
    pub fn with_csv_config(mut self, csv_config: CsvConfig) -> Self {
        self.csv_config = csv_config;
        self
    }

    /// Set delimiter character
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.csv_config.delimiter = delimiter;
        self
    }

    /// Set maximum rows to read
    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.csv_config.max_rows = Some(max_rows);
        self
    }

    /// Schema applied to loaded tables
    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    /// Load a table from a CSV file.
    pub fn load<P: AsRef<Path>>(&self, path: P, name: &str) -> Result<Table> {
        let path = path.as_ref();
        log::info!("Loading {} table from {}", name, path.display());

        if !path.is_file() {
            return Err(BoostGridError::dataset(format!(
                "{} table file does not exist: {}",
                name,
                path.display()
            )));
        }

        let file = File::open(path)?;
        self.load_from_reader(file, name)
    }

    /// Load a table from any reader producing CSV text.
    pub fn load_from_reader<R: Read>(&self, reader: R, name: &str) -> Result<Table> {
        for (label, c) in [
            ("delimiter", self.csv_config.delimiter),
            ("quote_char", self.csv_config.quote_char),
        ] {
            if !c.is_ascii() {
                return Err(BoostGridError::invalid_parameter(
                    label,
                    c.to_string(),
                    "must be a single ASCII character",
                ));
            }
        }

        let mut reader = ReaderBuilder::new()
            .delimiter(self.csv_config.delimiter as u8)
            .quote(self.csv_config.quote_char as u8)
            .comment(self.csv_config.comment_char.map(|c| c as u8))
            .has_headers(true)
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let header: Vec<String> = reader.headers()?.iter().map(String::from).collect();
        if header.is_empty() {
            return Err(BoostGridError::dataset(format!("{} table has no columns", name)));
        }

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            rows.push(record.iter().map(String::from).collect::<Vec<_>>());

            if let Some(max_rows) = self.csv_config.max_rows {
                if rows.len() >= max_rows {
                    log::info!("Reached max_rows limit of {}, stopping", max_rows);
                    break;
                }
            }
        }

        let table = Table::from_text_rows(name, &self.schema, &header, rows)?;
        log::info!(
            "Loaded {} table: {} rows, {} features",
            name,
            table.num_rows(),
            table.num_features()
        );
        Ok(table)
    }
}
