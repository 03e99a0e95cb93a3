//! Carousel error type.

use thiserror::Error;

use crate::types::CarouselKey;

/// Errors produced by carousel configuration and registry lookups.
///
/// Navigation itself never fails: empty lists, bad window sizes and
/// out-of-range jumps are clamped or normalised instead.
#[derive(Debug, Error)]
pub enum CarouselError {
    /// No carousel is mounted under this key.
    #[error("carousel {0:?} is not registered")]
    UnknownCarousel(CarouselKey),

    /// A config value is out of range.
    #[error("invalid carousel config: {0}")]
    InvalidConfig(String),

    /// A consumer callback returned an error or panicked.
    #[error("carousel callback failed: {0}")]
    Callback(String),
}

/// Result alias for carousel operations.
pub type Result<T> = std::result::Result<T, CarouselError>;
