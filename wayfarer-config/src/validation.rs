//! Guard rails and warnings for loaded settings.

use thiserror::Error;
use wayfarer_carousel::{AddressingMode, CarouselError};

use crate::models::CarouselSettings;

/// Shortest debounce that still spans one 60 Hz frame.
const MIN_SETTLE_DEBOUNCE_MS: u64 = 16;

/// Settings that must not be loaded.
#[derive(Debug, Error)]
pub enum ConfigGuardRailError {
    /// One block's config was rejected.
    #[error("carousel `{carousel}` is misconfigured")]
    InvalidCarousel {
        /// Block name.
        carousel: String,
        /// What the engine rejected.
        #[source]
        source: CarouselError,
    },
}

/// Something worth telling an operator that does not block loading.
#[derive(Debug, Clone)]
pub struct ConfigWarning {
    /// What is off.
    pub message: String,
    /// How to fix it.
    pub hint: Option<String>,
}

/// Warnings collected while loading.
#[derive(Debug, Default, Clone)]
pub struct ConfigWarnings {
    /// In the order they were raised.
    pub items: Vec<ConfigWarning>,
}

impl ConfigWarnings {
    /// Record a warning without a hint.
    pub fn push<S: Into<String>>(&mut self, message: S) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: None,
        });
    }

    /// Record a warning with a remediation hint.
    pub fn push_with_hint<S: Into<String>, H: Into<String>>(
        &mut self,
        message: S,
        hint: H,
    ) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: Some(hint.into()),
        });
    }

    /// No warnings.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of warnings.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Append `other`'s warnings.
    pub fn extend(&mut self, other: ConfigWarnings) {
        self.items.extend(other.items);
    }

    /// Emit every warning through `tracing`.
    pub fn log(&self) {
        for warning in &self.items {
            match &warning.hint {
                Some(hint) => tracing::warn!(target: "wayfarer::config", hint = %hint, "{}", warning.message),
                None => tracing::warn!(target: "wayfarer::config", "{}", warning.message),
            }
        }
    }
}

/// Reject settings the engine cannot run and collect warnings for values it
/// will clamp or that behave poorly.
pub fn apply_guard_rails(
    settings: &CarouselSettings,
) -> Result<ConfigWarnings, ConfigGuardRailError> {
    let mut warnings = ConfigWarnings::default();

    for (name, config) in &settings.carousels {
        config.validate().map_err(|source| {
            ConfigGuardRailError::InvalidCarousel {
                carousel: name.clone(),
                source,
            }
        })?;

        if !(config.window_size.is_finite() && config.window_size > 0.0) {
            warnings.push_with_hint(
                format!(
                    "carousel `{name}` has window_size {}; it will be treated as 1",
                    config.window_size
                ),
                "Set window_size to the number of slides visible at once",
            );
        }

        if let Some(interval) = config.autoplay_interval()
            && interval < config.transition_duration()
        {
            warnings.push_with_hint(
                format!(
                    "carousel `{name}` autoplays every {}ms but transitions take {}ms",
                    interval.as_millis(),
                    config.transition_ms
                ),
                "Advances will be dropped while a transition is still running",
            );
        }

        if config.mode == AddressingMode::NativeScroll
            && config.settle_debounce_ms < MIN_SETTLE_DEBOUNCE_MS
        {
            warnings.push_with_hint(
                format!(
                    "carousel `{name}` settles native scroll after {}ms",
                    config.settle_debounce_ms
                ),
                format!(
                    "Use at least {MIN_SETTLE_DEBOUNCE_MS}ms so one frame of scroll events fits"
                ),
            );
        }
    }

    Ok(warnings)
}
