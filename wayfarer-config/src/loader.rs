//! Settings resolution.
//!
//! Evaluation order:
//! 1) an explicit path handed to the loader (`--config`),
//! 2) `$WAYFARER_CAROUSEL_CONFIG_PATH` (TOML or JSON file),
//! 3) `$WAYFARER_CAROUSEL_CONFIG_JSON` (inline JSON),
//! 4) the first of `carousels.toml`, `carousels.json`,
//!    `config/carousels.toml`, `config/carousels.json`,
//! 5) built-in presets if none of the above is present.
//!
//! `$WAYFARER_AUTOPLAY` then overrides autoplay for every carousel.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;

use crate::error::ConfigLoadError;
use crate::models::{CarouselSettings, CarouselSettingsSource};
use crate::validation::{ConfigWarnings, apply_guard_rails};

/// Path to a settings file.
pub const CONFIG_PATH_VAR: &str = "WAYFARER_CAROUSEL_CONFIG_PATH";
/// Inline JSON settings.
pub const CONFIG_JSON_VAR: &str = "WAYFARER_CAROUSEL_CONFIG_JSON";
/// Autoplay override for every carousel: a duration or `off`.
pub const AUTOPLAY_VAR: &str = "WAYFARER_AUTOPLAY";

/// Settings-related environment, captured once so loading stays testable.
#[derive(Debug, Default, Clone)]
pub struct EnvSettings {
    /// Value of [`CONFIG_PATH_VAR`].
    pub config_path: Option<PathBuf>,
    /// Value of [`CONFIG_JSON_VAR`].
    pub config_json: Option<String>,
    /// Value of [`AUTOPLAY_VAR`].
    pub autoplay: Option<String>,
}

impl EnvSettings {
    /// Read the process environment. Blank values count as unset.
    pub fn gather() -> Self {
        Self {
            config_path: non_empty_var(CONFIG_PATH_VAR).map(PathBuf::from),
            config_json: non_empty_var(CONFIG_JSON_VAR),
            autoplay: non_empty_var(AUTOPLAY_VAR),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

/// Caller-side inputs to [`SettingsLoader`].
#[derive(Debug, Default, Clone)]
pub struct SettingsLoaderOptions {
    /// Explicit settings file; wins over everything else.
    pub config_path: Option<PathBuf>,
    /// Directory searched for the default file names. Defaults to the
    /// working directory.
    pub search_root: Option<PathBuf>,
    /// Takes precedence over `$WAYFARER_AUTOPLAY`.
    pub autoplay: Option<String>,
}

/// Resolves settings from the first source present.
#[derive(Debug, Default)]
pub struct SettingsLoader {
    options: SettingsLoaderOptions,
}

/// Outcome of a successful load.
#[derive(Debug)]
pub struct SettingsLoad {
    /// Effective settings, presets filled in and overrides applied.
    pub settings: CarouselSettings,
    /// Where they came from.
    pub source: CarouselSettingsSource,
    /// Non-fatal findings, for the caller to log.
    pub warnings: ConfigWarnings,
}

impl SettingsLoader {
    /// Loader with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loader with the given options.
    pub fn with_options(options: SettingsLoaderOptions) -> Self {
        Self { options }
    }

    /// Load from `path` and nothing else.
    pub fn with_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.config_path = Some(path.into());
        self
    }

    /// Look for the default file names under `root`.
    pub fn with_search_root<P: Into<PathBuf>>(mut self, root: P) -> Self {
        self.options.search_root = Some(root.into());
        self
    }

    /// Override autoplay everywhere, ahead of `$WAYFARER_AUTOPLAY`.
    pub fn with_autoplay_override<S: Into<String>>(mut self, raw: S) -> Self {
        self.options.autoplay = Some(raw.into());
        self
    }

    /// Load against the process environment.
    pub fn load(&self) -> Result<SettingsLoad, ConfigLoadError> {
        self.load_with_env(EnvSettings::gather())
    }

    /// Load against a captured environment.
    pub fn load_with_env(
        &self,
        env: EnvSettings,
    ) -> Result<SettingsLoad, ConfigLoadError> {
        let (mut settings, source) = self.resolve(&env)?;
        settings.fill_missing_presets();

        let mut warnings = ConfigWarnings::default();
        if source == CarouselSettingsSource::Default {
            warnings.push_with_hint(
                "No carousels.toml detected; using built-in carousel presets",
                format!(
                    "Set {CONFIG_PATH_VAR} or add carousels.toml to tune individual blocks"
                ),
            );
        }

        if let Some(raw) = self.options.autoplay.as_ref().or(env.autoplay.as_ref())
        {
            let interval = parse_autoplay_override(raw)?;
            tracing::debug!(
                target: "wayfarer::config",
                autoplay = raw.as_str(),
                "overriding autoplay for all carousels"
            );
            settings.override_autoplay(interval);
        }

        warnings.extend(apply_guard_rails(&settings)?);

        tracing::debug!(
            target: "wayfarer::config",
            source = %source,
            carousels = settings.carousels.len(),
            "carousel settings loaded"
        );

        Ok(SettingsLoad {
            settings,
            source,
            warnings,
        })
    }

    fn resolve(
        &self,
        env: &EnvSettings,
    ) -> Result<(CarouselSettings, CarouselSettingsSource), ConfigLoadError>
    {
        if let Some(path) = &self.options.config_path {
            let settings = load_required(path)?;
            return Ok((settings, CarouselSettingsSource::Explicit(path.clone())));
        }

        if let Some(path) = &env.config_path {
            let settings = load_required(path)?;
            return Ok((settings, CarouselSettingsSource::EnvPath(path.clone())));
        }

        if let Some(raw) = &env.config_json {
            let settings = CarouselSettings::parse_json(raw)
                .with_context(|| format!("failed to parse {CONFIG_JSON_VAR}"))
                .map_err(|source| ConfigLoadError::Parse {
                    origin: CONFIG_JSON_VAR.to_string(),
                    source,
                })?;
            return Ok((settings, CarouselSettingsSource::EnvInline));
        }

        let root = self
            .options
            .search_root
            .clone()
            .unwrap_or_else(|| PathBuf::from("."));
        if let Some(path) = CarouselSettings::find_default_file(&root) {
            let settings = load_file(&path)?;
            return Ok((settings, CarouselSettingsSource::File(path)));
        }

        Ok((CarouselSettings::default(), CarouselSettingsSource::Default))
    }
}

fn load_required(path: &Path) -> Result<CarouselSettings, ConfigLoadError> {
    if !path.exists() {
        return Err(ConfigLoadError::MissingConfig {
            path: path.to_path_buf(),
        });
    }
    load_file(path)
}

fn load_file(path: &Path) -> Result<CarouselSettings, ConfigLoadError> {
    CarouselSettings::load_from_file(path).map_err(|source| {
        ConfigLoadError::Parse {
            origin: path.display().to_string(),
            source,
        }
    })
}

/// Parse an autoplay override: a humantime duration such as `5s` or
/// `1500ms`, or `off` to disable autoplay.
pub fn parse_autoplay_override(
    raw: &str,
) -> Result<Option<Duration>, ConfigLoadError> {
    let trimmed = raw.trim();
    match trimmed.to_ascii_lowercase().as_str() {
        "off" | "none" | "false" | "0" => return Ok(None),
        _ => {}
    }
    let interval = humantime::parse_duration(trimmed).map_err(|source| {
        ConfigLoadError::InvalidAutoplayOverride {
            value: raw.to_string(),
            source,
        }
    })?;
    Ok(Some(interval).filter(|d| !d.is_zero()))
}
