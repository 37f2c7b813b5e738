//! Table loaders.
//!
//! CSV files are read with the `csv` crate. With the `polars` feature, an
//! in-memory DataFrame can be converted directly.

pub mod csv;
#[cfg(feature = "polars")]
pub mod polars;

pub use self::csv::{CsvConfig, CsvLoader};
#[cfg(feature = "polars")]
pub use self::polars::table_from_dataframe;
