//! Data preparation.
//!
//! Input tables arrive as [`Table`]s, either loaded from CSV or converted from
//! a polars DataFrame. [`prepare`] checks that their feature schemas agree,
//! coerces the labels and produces the [`DMatrix`] values the booster trains
//! and predicts on.

pub mod loader;
pub mod matrix;
pub mod prepare;
pub mod table;

pub use loader::{CsvConfig, CsvLoader};
#[cfg(feature = "polars")]
pub use loader::table_from_dataframe;
pub use matrix::DMatrix;
pub use prepare::{check_schema, coerce_labels, prepare, PreparedData};
pub use table::{RawLabel, Table, TableSchema};
