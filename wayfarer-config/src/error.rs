//! Error type for settings loading.

use std::path::PathBuf;

use thiserror::Error;

use crate::validation::ConfigGuardRailError;

/// Why settings could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    /// A path was named explicitly but does not exist.
    #[error("configuration file missing: {path}")]
    MissingConfig {
        /// Path that was looked up.
        path: PathBuf,
    },
    /// The source exists but is not valid TOML or JSON settings.
    #[error("failed to load carousel settings from {origin}")]
    Parse {
        /// Path or variable the text came from.
        origin: String,
        /// Underlying parse failure.
        #[source]
        source: anyhow::Error,
    },
    /// The autoplay override is neither `off` nor a duration.
    #[error("invalid WAYFARER_AUTOPLAY value `{value}`")]
    InvalidAutoplayOverride {
        /// Value as given.
        value: String,
        /// Duration parse failure.
        #[source]
        source: humantime::DurationError,
    },
    /// A carousel config failed the guard rails.
    #[error(transparent)]
    GuardRail(#[from] ConfigGuardRailError),
}
