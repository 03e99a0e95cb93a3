//! Settings file model.

use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use wayfarer_carousel::{CarouselConfig, CarouselKey};

/// Source that produced the carousel settings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CarouselSettingsSource {
    /// Built-in presets; nothing was found.
    #[default]
    Default,
    /// Path handed to the loader directly, e.g. `--config`.
    Explicit(PathBuf),
    /// File named by `$WAYFARER_CAROUSEL_CONFIG_PATH`.
    EnvPath(PathBuf),
    /// Inline JSON from `$WAYFARER_CAROUSEL_CONFIG_JSON`.
    EnvInline,
    /// One of the default file names.
    File(PathBuf),
}

impl fmt::Display for CarouselSettingsSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => f.write_str("built-in presets"),
            Self::Explicit(path) => write!(f, "{}", path.display()),
            Self::EnvPath(path) => {
                write!(f, "WAYFARER_CAROUSEL_CONFIG_PATH={}", path.display())
            }
            Self::EnvInline => f.write_str("WAYFARER_CAROUSEL_CONFIG_JSON"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// `[logging]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `EnvFilter` directives used when `RUST_LOG` is unset, e.g.
    /// `"info,carousel::autoplay=debug"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    /// Emit ANSI colours. Defaults to on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ansi: Option<bool>,
}

/// Carousel settings file. Each entry under `carousels` configures one block
/// by name; the six built-in block names always resolve, falling back to
/// their presets when the file does not mention them.
///
/// ```toml
/// [logging]
/// filter = "info,carousel::position=debug"
///
/// [carousels.destination_hero]
/// window_size = 1.0
/// item_stride = 1120.0
/// autoplay_ms = 6000
/// transition_ms = 700
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CarouselSettings {
    /// Per-block configs keyed by block name.
    pub carousels: BTreeMap<String, CarouselConfig>,
    /// Subscriber settings for the binaries.
    pub logging: LoggingSettings,
}

impl Default for CarouselSettings {
    fn default() -> Self {
        let mut settings = Self {
            carousels: BTreeMap::new(),
            logging: LoggingSettings::default(),
        };
        settings.fill_missing_presets();
        settings
    }
}

impl CarouselSettings {
    /// Config for the carousel identified by `key`. Unknown keys fall back to
    /// the engine defaults.
    pub fn config_for(&self, key: &CarouselKey) -> CarouselConfig {
        let name = match key {
            CarouselKey::Custom(name) => Some((*name).to_string()),
            CarouselKey::Block(id) => Some(id.to_string()),
            builtin => builtin.preset_name().map(str::to_string),
        };
        name.and_then(|name| self.carousels.get(&name).copied())
            .unwrap_or_else(|| CarouselConfig::preset_for(key))
    }

    /// Config stored under `name`, without preset fallback.
    pub fn get(&self, name: &str) -> Option<&CarouselConfig> {
        self.carousels.get(name)
    }

    /// Configured block names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.carousels.keys().map(String::as_str)
    }

    /// Add the preset for every built-in block the settings do not name.
    pub fn fill_missing_presets(&mut self) {
        for key in CarouselKey::BUILT_IN {
            if let Some(name) = key.preset_name() {
                self.carousels
                    .entry(name.to_string())
                    .or_insert_with(|| CarouselConfig::preset_for(&key));
            }
        }
    }

    /// Force autoplay on every carousel to `interval`, or off with `None`.
    pub fn override_autoplay(&mut self, interval: Option<Duration>) {
        let autoplay_ms = interval.map(|d| d.as_millis() as u64);
        for config in self.carousels.values_mut() {
            config.autoplay_ms = autoplay_ms;
        }
    }

    /// Read and parse `path`, picking the format from its extension.
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path).with_context(|| {
            format!("failed to read carousel settings from {}", path.display())
        })?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::parse_json(&contents).with_context(|| {
                format!("invalid carousel settings {}", path.display())
            }),
            Some("toml") | Some("tml") => {
                toml::from_str(&contents).map_err(|err| {
                    anyhow!(
                        "invalid carousel settings {}: {}",
                        path.display(),
                        err
                    )
                })
            }
            _ => Self::parse_from_str(&contents, &path.display().to_string()),
        }
    }

    /// Parse settings text, trying TOML first and JSON second.
    pub fn parse_from_str(
        contents: &str,
        origin: &str,
    ) -> anyhow::Result<Self> {
        // Try TOML first, then JSON for convenience.
        toml::from_str(contents).or_else(|toml_err| {
            serde_json::from_str(contents).map_err(|json_err| {
                anyhow!(
                    "failed to parse carousel settings {}: toml error: {}; json error: {}",
                    origin,
                    toml_err,
                    json_err
                )
            })
        })
    }

    /// Parse settings from JSON text.
    pub fn parse_json(raw: &str) -> anyhow::Result<Self> {
        serde_json::from_str(raw)
            .map_err(|err| anyhow!("invalid carousel settings json: {err}"))
    }

    /// First settings file present under `root`.
    pub fn find_default_file(root: &Path) -> Option<PathBuf> {
        const CANDIDATES: &[&str] = &[
            "carousels.toml",
            "carousels.json",
            "config/carousels.toml",
            "config/carousels.json",
        ];

        CANDIDATES
            .iter()
            .map(|candidate| root.join(candidate))
            .find(|path| path.exists())
    }
}
