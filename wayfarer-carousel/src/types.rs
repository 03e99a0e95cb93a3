//! Shared types for the carousel engine

use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

use crate::animator::Easing;
use crate::error::{CarouselError, Result};

/// Unique key for identifying carousels on a page.
/// Using a strongly-typed key avoids brittle string matching and enables
/// scoped state per carousel instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CarouselKey {
    /// Full-width destination hero slider.
    DestinationHero,
    /// "Popular now" card marquee.
    PopularNow,
    /// Cards with alternating vertical offsets.
    UpDownCards,
    /// Cards of mixed widths.
    NonUniformCards,
    /// Cards that grow when centred.
    EnlargingCards,
    /// Feature slider with captions.
    FeatureCarousel,
    /// A block instance placed by an editor, keyed by its block id.
    Block(Uuid),
    /// Ad-hoc carousel named by the callsite.
    Custom(&'static str),
}

impl CarouselKey {
    /// The six carousel variants that ship with the site.
    pub const BUILT_IN: [CarouselKey; 6] = [
        CarouselKey::DestinationHero,
        CarouselKey::PopularNow,
        CarouselKey::UpDownCards,
        CarouselKey::NonUniformCards,
        CarouselKey::EnlargingCards,
        CarouselKey::FeatureCarousel,
    ];

    /// Name used for a built-in variant in config files.
    pub fn preset_name(&self) -> Option<&'static str> {
        match self {
            CarouselKey::DestinationHero => Some("destination_hero"),
            CarouselKey::PopularNow => Some("popular_now"),
            CarouselKey::UpDownCards => Some("up_down_cards"),
            CarouselKey::NonUniformCards => Some("non_uniform_cards"),
            CarouselKey::EnlargingCards => Some("enlarging_cards"),
            CarouselKey::FeatureCarousel => Some("feature_carousel"),
            CarouselKey::Block(_) | CarouselKey::Custom(_) => None,
        }
    }

    /// Inverse of [`CarouselKey::preset_name`].
    pub fn from_preset_name(name: &str) -> Option<Self> {
        Self::BUILT_IN
            .into_iter()
            .find(|key| key.preset_name() == Some(name))
    }
}

/// Step direction for `advance`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
/// Navigation direction.
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Towards higher indices.
    #[default]
    Forward,
    /// Towards lower indices.
    Backward,
}

impl Direction {
    /// Signed slide step: `+1` forward, `-1` backward.
    pub const fn step(self) -> isize {
        match self {
            Direction::Forward => 1,
            Direction::Backward => -1,
        }
    }

    /// The opposite direction.
    pub const fn reversed(self) -> Self {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
        }
    }
}

/// How a display index is turned into something the host can apply.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
/// How a carousel's position reaches the screen.
#[serde(rename_all = "snake_case")]
pub enum AddressingMode {
    /// One slide is centred in a viewport of varying width; the offset is a
    /// transform applied to the track.
    #[default]
    CenteredTransform,
    /// The host's own scroll container drives position; the offset is a
    /// `scrollLeft` value.
    NativeScroll,
}

/// Which display slot `jump_to` targets when a logical slide is reachable
/// through more than one copy in the padded list.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
/// Target selection for `jump_to`.
#[serde(rename_all = "snake_case")]
pub enum JumpPolicy {
    /// Nearest copy to the current display index. Ties go forward.
    #[default]
    Shortest,
    /// Nearest copy at or ahead of the current display index, falling back to
    /// the slot in the logical region when no copy lies ahead.
    Forward,
}

/// Static configuration for a carousel instance. These can be derived from
/// block presets or provided ad-hoc by callsites.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarouselConfig {
    /// Number of slides visible at once. Sizes the clone buffer.
    pub window_size: f32,
    /// Width of one slide plus its gap, in pixels.
    pub item_stride: f32,
    /// Autoplay interval. `None` disables autoplay.
    pub autoplay_ms: Option<u64>,
    /// Length of one slide transition. Both the CSS transition and every
    /// engine-side wait derive from this value.
    pub transition_ms: u64,
    /// Transform or native scroll.
    pub mode: AddressingMode,
    /// Which copy `jump_to` travels to.
    pub jump_policy: JumpPolicy,
    /// Direction of automatic advances.
    pub autoplay_direction: Direction,
    /// Native-scroll mode: quiet period after the last scroll event before
    /// the position counts as settled.
    pub settle_debounce_ms: u64,
    /// Transition curve.
    pub easing: Easing,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            window_size: 1.0,
            item_stride: 320.0,
            autoplay_ms: None,
            transition_ms: 500,
            mode: AddressingMode::CenteredTransform,
            jump_policy: JumpPolicy::Shortest,
            autoplay_direction: Direction::Forward,
            settle_debounce_ms: 150,
            easing: Easing::EaseInOut,
        }
    }
}

impl CarouselConfig {
    /// Full-bleed destination hero: one centred slide, slow autoplay.
    pub const fn destination_hero_defaults() -> Self {
        Self {
            window_size: 1.0,
            item_stride: 1120.0,
            autoplay_ms: Some(6_000),
            transition_ms: 700,
            mode: AddressingMode::CenteredTransform,
            jump_policy: JumpPolicy::Shortest,
            autoplay_direction: Direction::Forward,
            settle_debounce_ms: 150,
            easing: Easing::EaseInOut,
        }
    }

    /// Popular-now marquee: many narrow cards drifting continuously.
    pub const fn popular_now_defaults() -> Self {
        Self {
            window_size: 5.0,
            item_stride: 296.0,
            autoplay_ms: Some(3_000),
            transition_ms: 900,
            mode: AddressingMode::CenteredTransform,
            jump_policy: JumpPolicy::Forward,
            autoplay_direction: Direction::Forward,
            settle_debounce_ms: 150,
            easing: Easing::Linear,
        }
    }

    /// Up/down staggered cards scrolled by the browser.
    pub const fn up_down_cards_defaults() -> Self {
        Self {
            window_size: 4.0,
            item_stride: 340.0,
            autoplay_ms: Some(4_000),
            transition_ms: 500,
            mode: AddressingMode::NativeScroll,
            jump_policy: JumpPolicy::Shortest,
            autoplay_direction: Direction::Forward,
            settle_debounce_ms: 150,
            easing: Easing::EaseOut,
        }
    }

    /// Non-uniform card widths; stride is the widest card plus gap.
    pub const fn non_uniform_cards_defaults() -> Self {
        Self {
            window_size: 3.5,
            item_stride: 420.0,
            autoplay_ms: None,
            transition_ms: 500,
            mode: AddressingMode::NativeScroll,
            jump_policy: JumpPolicy::Shortest,
            autoplay_direction: Direction::Forward,
            settle_debounce_ms: 150,
            easing: Easing::EaseOut,
        }
    }

    /// Enlarging cards: the centred card grows, neighbours peek in.
    pub const fn enlarging_cards_defaults() -> Self {
        Self {
            window_size: 3.0,
            item_stride: 380.0,
            autoplay_ms: Some(5_000),
            transition_ms: 600,
            mode: AddressingMode::CenteredTransform,
            jump_policy: JumpPolicy::Shortest,
            autoplay_direction: Direction::Forward,
            settle_debounce_ms: 150,
            easing: Easing::EaseInOut,
        }
    }

    /// Feature carousel with dot indicators and no autoplay.
    pub const fn feature_carousel_defaults() -> Self {
        Self {
            window_size: 1.0,
            item_stride: 960.0,
            autoplay_ms: None,
            transition_ms: 500,
            mode: AddressingMode::CenteredTransform,
            jump_policy: JumpPolicy::Forward,
            autoplay_direction: Direction::Forward,
            settle_debounce_ms: 150,
            easing: Easing::EaseInOut,
        }
    }

    /// Preset for a well-known block key. Keys without a preset get the
    /// generic defaults.
    pub fn preset_for(key: &CarouselKey) -> Self {
        match key {
            CarouselKey::DestinationHero => Self::destination_hero_defaults(),
            CarouselKey::PopularNow => Self::popular_now_defaults(),
            CarouselKey::UpDownCards => Self::up_down_cards_defaults(),
            CarouselKey::NonUniformCards => Self::non_uniform_cards_defaults(),
            CarouselKey::EnlargingCards => Self::enlarging_cards_defaults(),
            CarouselKey::FeatureCarousel => Self::feature_carousel_defaults(),
            CarouselKey::Block(_) | CarouselKey::Custom(_) => Self::default(),
        }
    }

    /// Window size with non-positive and non-finite values clamped to 1.
    pub fn effective_window_size(&self) -> f32 {
        sanitize_window_size(self.window_size)
    }

    /// Autoplay interval, `None` when disabled or zero.
    pub fn autoplay_interval(&self) -> Option<Duration> {
        self.autoplay_ms
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
    }

    /// Authoritative transition duration.
    pub fn transition_duration(&self) -> Duration {
        Duration::from_millis(self.transition_ms)
    }

    /// Native-scroll quiet period.
    pub fn settle_debounce(&self) -> Duration {
        Duration::from_millis(self.settle_debounce_ms)
    }

    /// Reject values the engine cannot clamp into something meaningful.
    pub fn validate(&self) -> Result<()> {
        if !self.item_stride.is_finite() || self.item_stride <= 0.0 {
            return Err(CarouselError::InvalidConfig(format!(
                "item_stride must be a positive number, got {}",
                self.item_stride
            )));
        }
        if self.transition_ms == 0 && self.autoplay_interval().is_some() {
            return Err(CarouselError::InvalidConfig(
                "transition_ms must be non-zero when autoplay is enabled"
                    .into(),
            ));
        }
        Ok(())
    }
}

pub(crate) fn sanitize_window_size(window_size: f32) -> f32 {
    if window_size.is_finite() && window_size > 0.0 {
        window_size
    } else {
        1.0
    }
}

/// Externally visible state of one carousel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CarouselSnapshot {
    /// Index into the padded list.
    pub display_index: usize,
    /// `None` when the carousel has no slides.
    pub logical_index: Option<usize>,
    /// `false` between a teleport and the next frame.
    pub transition_enabled: bool,
    /// Hover pause.
    pub is_paused: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preset_names_round_trip_through_keys() {
        for key in CarouselKey::BUILT_IN {
            let name = key.preset_name().unwrap();
            assert_eq!(CarouselKey::from_preset_name(name), Some(key));
        }
        assert_eq!(CarouselKey::from_preset_name("hero"), None);
        assert_eq!(CarouselKey::Custom("hero").preset_name(), None);
    }

    #[test]
    fn window_size_is_clamped() {
        assert_eq!(sanitize_window_size(0.0), 1.0);
        assert_eq!(sanitize_window_size(-3.0), 1.0);
        assert_eq!(sanitize_window_size(f32::NAN), 1.0);
        assert_eq!(sanitize_window_size(2.5), 2.5);
    }

    #[test]
    fn zero_autoplay_means_disabled() {
        let config = CarouselConfig {
            autoplay_ms: Some(0),
            ..CarouselConfig::default()
        };
        assert!(config.autoplay_interval().is_none());
    }

    #[test]
    fn validate_rejects_bad_stride_and_instant_autoplay() {
        let bad_stride = CarouselConfig {
            item_stride: 0.0,
            ..CarouselConfig::default()
        };
        assert!(bad_stride.validate().is_err());

        let instant = CarouselConfig {
            transition_ms: 0,
            autoplay_ms: Some(1_000),
            ..CarouselConfig::default()
        };
        assert!(instant.validate().is_err());

        for key in [
            CarouselKey::DestinationHero,
            CarouselKey::PopularNow,
            CarouselKey::UpDownCards,
            CarouselKey::NonUniformCards,
            CarouselKey::EnlargingCards,
            CarouselKey::FeatureCarousel,
        ] {
            assert!(
                CarouselConfig::preset_for(&key).validate().is_ok(),
                "preset for {key:?} should validate"
            );
        }
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: CarouselConfig = serde_json::from_str(
            r#"{ "window_size": 3, "mode": "native_scroll" }"#,
        )
        .expect("valid config json");
        assert_eq!(config.window_size, 3.0);
        assert_eq!(config.mode, AddressingMode::NativeScroll);
        assert_eq!(config.transition_ms, 500);
        assert_eq!(config.jump_policy, JumpPolicy::Shortest);
    }
}
