//! Reporting and prediction for a trained model.
//!
//! - [`ImportanceReport`] ranks the features the model splits on
//! - [`render_dump`] gives the XGBoost-format tree dump
//! - [`predict_submission`] and [`write_submission`] produce the dated
//!   `submission<YYYYMMDD>.csv` table

pub mod importance;
pub mod submission;

pub use importance::{render_dump, write_dump, ImportanceReport};
pub use submission::{predict_submission, submission_file_name, write_submission, Submission, SubmissionRow};
