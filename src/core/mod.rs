//! Core infrastructure module for boostgrid.
//!
//! This module provides the foundational pieces shared by every stage of the
//! pipeline:
//!
//! - [`types`]: scalar aliases and small enumerations
//! - [`constants`]: grid literals and other defaults
//! - [`error`]: the [`BoostGridError`] type and `Result` alias
//!
//! ```rust
//! use boostgrid::core::{
//!     constants::DEFAULT_NFOLD,
//!     error::{BoostGridError, Result},
//!     types::ObjectiveType,
//! };
//!
//! let folds = DEFAULT_NFOLD;
//! let objective = ObjectiveType::BinaryLogistic;
//! # let _ = (folds, objective);
//! # Ok::<(), BoostGridError>(())
//! ```

pub mod constants;
pub mod error;
pub mod types;

pub use constants::*;
pub use error::{BoostGridError, Result};
pub use types::*;

use std::sync::atomic::{AtomicBool, Ordering};

static LOGGING_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Install the `env_logger` backend.
///
/// `RUST_LOG` takes precedence; without it the filter defaults to `info`.
/// Repeated calls, or a logger installed by the host application, are not
/// errors.
pub fn initialize_logging() {
    if LOGGING_INITIALIZED.swap(true, Ordering::SeqCst) {
        return;
    }

    let env = env_logger::Env::default().default_filter_or("info");
    if env_logger::Builder::from_env(env).try_init().is_err() {
        log::debug!("Logger already installed, keeping the existing one");
    }

    log::debug!("boostgrid {} logging initialized", BOOSTGRID_VERSION);
}

/// Check whether [`initialize_logging`] has run.
pub fn is_logging_initialized() -> bool {
    LOGGING_INITIALIZED.load(Ordering::SeqCst)
}
