//! Carousel settings for Wayfarer.
//!
//! Loads the per-block carousel configuration from files, inline JSON or the
//! built-in presets, checks it against guard rails, and installs the tracing
//! subscriber the binaries share. The `wayfarer-preview` binary uses all of it
//! to run a carousel headless.

pub mod error;
pub mod loader;
pub mod logging;
pub mod models;
pub mod validation;

pub use error::ConfigLoadError;
pub use loader::{
    EnvSettings, SettingsLoad, SettingsLoader, SettingsLoaderOptions,
};
pub use logging::{bootstrap_subscriber, init_tracing};
pub use models::{CarouselSettings, CarouselSettingsSource, LoggingSettings};
pub use validation::{
    ConfigGuardRailError, ConfigWarning, ConfigWarnings, apply_guard_rails,
};
